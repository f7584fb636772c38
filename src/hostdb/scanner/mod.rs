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

//! The scheduling loop governing host scans and benchmarks.
//!
//! A single dispatcher task owns both queues, the in-flight registry, the
//! worker counters and the latency tracker. Workers never touch that state:
//! each one receives its host entry by value, does its protocol work, and
//! reports back over the completion channel. The dispatcher performs all
//! bookkeeping when the report arrives and immediately refills any freed
//! capacity.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use futures::{pin_mut, FutureExt};
use log::{debug, error, info};
use smol::{channel, Executor, Timer};

/// How long to wait before the next scan of a host.
pub mod interval;

/// Adaptive scan timeout derived from early successful scans.
pub mod latency;

/// Decayed per-host success/failure counters.
pub mod interactions;

/// One full scan of one host.
mod scan;

/// One throughput benchmark of one host.
mod benchmark;

pub use interval::{scan_interval, SCAN_INTERVAL};
pub use latency::{LatencyTracker, MIN_SCANS};

use interactions::InteractionTracker;

use super::{HostEntry, HostStorePtr, PublicKey, SettingsPtr, SyncerPtr};
use crate::{
    rhp::RhpClientPtr,
    system::{TaskGroupPtr, TaskGuard},
    util::sleep,
};

/// Upper bound on concurrently running scan workers.
pub const MAX_SCAN_THREADS: usize = 100;

/// Dispatcher tick, also the sync-wait polling interval, in seconds.
const SCAN_CHECK_INTERVAL: u64 = 15;

pub type ScannerPtr = Arc<Scanner>;

/// Completion report sent by a worker on every exit path.
enum WorkerEvent {
    ScanDone {
        key: PublicKey,
        /// Latency of the successful settings exchange, fed to the latency
        /// tracker. `None` for failed or abandoned scans.
        sample: Option<Duration>,
    },
    BenchmarkDone {
        key: PublicKey,
    },
}

/// Scheduling state. Owned by the dispatcher task, never shared.
struct DispatchState {
    scan_queue: VecDeque<HostEntry>,
    benchmark_queue: VecDeque<HostEntry>,
    /// Hosts currently queued or being worked on. Value: benchmark or scan.
    in_flight: HashMap<PublicKey, bool>,
    scan_workers: usize,
    benchmarking: bool,
    latencies: LatencyTracker,
}

impl DispatchState {
    fn new() -> Self {
        Self {
            scan_queue: VecDeque::new(),
            benchmark_queue: VecDeque::new(),
            in_flight: HashMap::new(),
            scan_workers: 0,
            benchmarking: false,
            latencies: LatencyTracker::new(),
        }
    }
}

/// Drives the scanning of the host set.
pub struct Scanner {
    store: HostStorePtr,
    syncer: SyncerPtr,
    client: RhpClientPtr,
    settings: SettingsPtr,
    tg: TaskGroupPtr,
    interactions: InteractionTracker,
    event_send: channel::Sender<WorkerEvent>,
    event_recv: channel::Receiver<WorkerEvent>,
}

impl Scanner {
    pub fn new(
        store: HostStorePtr,
        syncer: SyncerPtr,
        client: RhpClientPtr,
        settings: SettingsPtr,
        tg: TaskGroupPtr,
    ) -> ScannerPtr {
        let (event_send, event_recv) = channel::unbounded();
        let interactions =
            InteractionTracker::new(Duration::from_secs(settings.interaction_half_life_seconds));
        Arc::new(Self { store, syncer, client, settings, tg, interactions, event_send, event_recv })
    }

    /// Spawn the dispatcher task.
    pub fn start(self: Arc<Self>, executor: Arc<Executor<'_>>) {
        let guard = match self.tg.try_add() {
            Ok(guard) => guard,
            Err(e) => {
                error!(target: "hostdb::scanner::start()", "Couldn't start scanner: {}", e);
                return
            }
        };
        let executor_ = executor.clone();
        executor.spawn(self.run(executor_, guard)).detach();
    }

    /// Signal shutdown and wait until the dispatcher and all workers have
    /// drained.
    pub async fn stop(&self) {
        self.tg.stop().await;
    }

    /// The dispatcher loop.
    async fn run(self: Arc<Self>, executor: Arc<Executor<'_>>, _guard: TaskGuard) {
        debug!(target: "hostdb::scanner::run()", "START");
        let stop = self.tg.stop_signal();

        // Scanning makes no sense against a stale view of the chain.
        loop {
            if self.syncer.synced().await {
                break
            }
            let stopped = stop.recv().fuse();
            let tick = sleep(SCAN_CHECK_INTERVAL).fuse();
            pin_mut!(stopped, tick);
            futures::select! {
                _ = stopped => return,
                _ = tick => {}
            }
        }
        info!(target: "hostdb::scanner::run()", "[SCANNER] Chain is synced, starting host scans");

        let mut state = DispatchState::new();
        loop {
            self.pull_batch(&mut state).await;
            self.clone().drain(&mut state, &executor);

            let tick = Timer::after(Duration::from_secs(SCAN_CHECK_INTERVAL)).fuse();
            pin_mut!(tick);
            loop {
                let event = self.event_recv.recv().fuse();
                let stopped = stop.recv().fuse();
                pin_mut!(event, stopped);
                futures::select! {
                    ev = event => {
                        let Ok(ev) = ev else { return };
                        self.complete(&mut state, ev);
                        self.clone().drain(&mut state, &executor);
                    }
                    _ = stopped => return,
                    _ = tick => break,
                }
            }
        }
    }

    /// Ask the store for the next batch of candidates and queue the ones
    /// that are not already in flight.
    async fn pull_batch(&self, state: &mut DispatchState) {
        let batch = match self.store.hosts_for_scan().await {
            Ok(batch) => batch,
            Err(e) => {
                error!(target: "hostdb::scanner::pull_batch()", "Couldn't fetch hosts: {}", e);
                return
            }
        };
        for host in batch {
            self.enqueue(state, host);
        }
    }

    /// Queue one host for a scan or a benchmark. Hosts already queued or
    /// being worked on are left alone, as are blocked hosts and hosts that
    /// are due for neither.
    fn enqueue(&self, state: &mut DispatchState, host: HostEntry) {
        if state.in_flight.contains_key(&host.public_key) {
            return
        }
        if host.blocked {
            return
        }

        let fresh = match host.last_scan() {
            Some(scan) => scan.timestamp.elapsed() < scan_interval(&host),
            None => false,
        };

        if fresh {
            if !self.benchmark_due(&host) {
                return
            }
            state.in_flight.insert(host.public_key, true);
            state.benchmark_queue.push_back(host);
        } else {
            state.in_flight.insert(host.public_key, false);
            state.scan_queue.push_back(host);
        }
    }

    /// Whether enough time has passed since the host's last benchmark. The
    /// store republishes fresh hosts every batch, so without this gate every
    /// tick would benchmark them again.
    fn benchmark_due(&self, host: &HostEntry) -> bool {
        let last = &host.last_benchmark;
        last.timestamp.is_unset() ||
            last.timestamp.elapsed() >=
                Duration::from_secs(self.settings.benchmark_interval_seconds)
    }

    /// Launch workers for queued hosts, up to the scan cap and the single
    /// benchmark slot. Stops early when the lifecycle group refuses new
    /// registrations, leaving queues and counters untouched for the
    /// remaining entries.
    fn drain(self: Arc<Self>, state: &mut DispatchState, executor: &Arc<Executor<'_>>) {
        while !state.scan_queue.is_empty() && state.scan_workers < MAX_SCAN_THREADS {
            let Ok(guard) = self.tg.try_add() else { return };
            let host = state.scan_queue.pop_front().unwrap();
            state.scan_workers += 1;
            let timeout = state.latencies.timeout();
            executor.spawn(self.clone().scan_host(host, timeout, guard)).detach();
        }

        if !state.benchmarking && !state.benchmark_queue.is_empty() {
            let Ok(guard) = self.tg.try_add() else { return };
            let host = state.benchmark_queue.pop_front().unwrap();
            state.benchmarking = true;
            executor.spawn(self.clone().benchmark_host(host, guard)).detach();
        }
    }

    /// Bookkeeping for a finished worker.
    fn complete(&self, state: &mut DispatchState, event: WorkerEvent) {
        match event {
            WorkerEvent::ScanDone { key, sample } => {
                if let Some(latency) = sample {
                    state.latencies.record(latency);
                }
                state.in_flight.remove(&key);
                state.scan_workers = state.scan_workers.saturating_sub(1);
            }
            WorkerEvent::BenchmarkDone { key } => {
                state.in_flight.remove(&key);
                state.benchmarking = false;
            }
        }
    }
}
