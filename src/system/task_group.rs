/* This file is part of HostRank (https://hostrank.net)
 *
 * Copyright (C) 2023-2026 HostRank developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::{Arc, Mutex};

use smol::channel;

use crate::{Error, Result};

pub type TaskGroupPtr = Arc<TaskGroup>;

/// Stop-signal receiver handed out to workers. Pending `recv()` calls
/// resolve (with an error) the moment the group begins stopping.
pub type StopSignal = channel::Receiver<()>;

/// Tracks a set of concurrent worker tasks and coordinates their shutdown.
///
/// Every worker registers with [`TaskGroup::try_add`] before doing any work
/// and holds the returned [`TaskGuard`] for as long as it runs, racing its
/// work against `stop_signal()`. Stopping the group broadcasts the stop
/// signal and then blocks until every guard has been dropped.
pub struct TaskGroup {
    stop_send: channel::Sender<()>,
    stop_recv: channel::Receiver<()>,
    /// Prototype sender cloned into every guard. Taken (dropped) on stop,
    /// which both refuses new registrations and arms the drain receiver.
    live_send: Mutex<Option<channel::Sender<()>>>,
    drain_recv: channel::Receiver<()>,
}

/// Registration handle for one running worker. Dropping it deregisters
/// the worker.
pub struct TaskGuard {
    _live: channel::Sender<()>,
}

impl TaskGroup {
    pub fn new() -> TaskGroupPtr {
        let (stop_send, stop_recv) = channel::unbounded();
        let (live_send, drain_recv) = channel::unbounded();
        Arc::new(Self { stop_send, stop_recv, live_send: Mutex::new(Some(live_send)), drain_recv })
    }

    /// Register a new worker. Fails with [`Error::ServiceStopped`] once the
    /// group is stopping, in which case the caller must return without
    /// performing its task.
    pub fn try_add(&self) -> Result<TaskGuard> {
        match &*self.live_send.lock().unwrap() {
            Some(live) => Ok(TaskGuard { _live: live.clone() }),
            None => Err(Error::ServiceStopped),
        }
    }

    /// Obtain a stop-signal receiver for use in `select!` arms.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop_recv.clone()
    }

    /// Whether the group has begun stopping.
    pub fn is_stopping(&self) -> bool {
        self.live_send.lock().unwrap().is_none()
    }

    /// Broadcast the stop signal and wait until all registered workers have
    /// deregistered. Safe to call more than once; later calls return as soon
    /// as the group is drained.
    pub async fn stop(&self) {
        self.stop_send.close();
        drop(self.live_send.lock().unwrap().take());
        // No worker ever sends on the live channel, so this resolves only
        // when the last sender (guard) is gone.
        let _ = self.drain_recv.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol::Executor;

    #[test]
    fn add_and_drain() {
        let executor = Arc::new(Executor::new());
        let executor_ = executor.clone();
        smol::block_on(executor.run(async move {
            let tg = TaskGroup::new();

            let guard = tg.try_add().unwrap();
            let stop = tg.stop_signal();
            executor_
                .spawn(async move {
                    let _guard = guard;
                    // Hold registration until the stop signal fires.
                    let _ = stop.recv().await;
                })
                .detach();

            tg.stop().await;
            assert!(tg.is_stopping());
        }));
    }

    #[test]
    fn add_after_stop_fails() {
        smol::block_on(async {
            let tg = TaskGroup::new();
            tg.stop().await;
            assert!(tg.try_add().is_err());
        });
    }

    #[test]
    fn double_stop() {
        smol::block_on(async {
            let tg = TaskGroup::new();
            let guard = tg.try_add().unwrap();
            drop(guard);
            tg.stop().await;
            // A second stop must return immediately.
            tg.stop().await;
        });
    }

    #[test]
    fn stop_signal_wakes_workers() {
        let executor = Arc::new(Executor::new());
        let executor_ = executor.clone();
        smol::block_on(executor.run(async move {
            let tg = TaskGroup::new();
            let (done_send, done_recv) = channel::unbounded();

            for _ in 0..3 {
                let guard = tg.try_add().unwrap();
                let stop = tg.stop_signal();
                let done = done_send.clone();
                executor_
                    .spawn(async move {
                        let _guard = guard;
                        let _ = stop.recv().await;
                        let _ = done.send(()).await;
                    })
                    .detach();
            }

            tg.stop().await;
            for _ in 0..3 {
                done_recv.recv().await.unwrap();
            }
        }));
    }
}
