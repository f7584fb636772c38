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

use std::{sync::Arc, time::Duration};

use futures::{pin_mut, FutureExt};
use log::{debug, error};
use smol::Timer;

use super::{Scanner, WorkerEvent};
use crate::{
    hostdb::{HostBenchmark, HostEntry, PublicKey},
    system::TaskGuard,
    util::Timestamp,
    Error,
};

impl Scanner {
    /// Benchmark a single host's throughput. Runs for hosts whose latest
    /// scan is fresh enough to trust; the dispatcher admits one benchmark
    /// at a time and frees the slot when the completion event arrives,
    /// which this worker sends on every exit path.
    pub(super) async fn benchmark_host(self: Arc<Self>, mut host: HostEntry, _guard: TaskGuard) {
        let timeout = Duration::from_secs(self.settings.benchmark_timeout_seconds);
        let start = Timestamp::current_time();
        let stop = self.tg.stop_signal();

        let result = {
            let attempt = self
                .client
                .benchmark(&host.net_address, &host.public_key, &host.settings)
                .fuse();
            let deadline = Timer::after(timeout).fuse();
            let stopped = stop.recv().fuse();
            pin_mut!(attempt, deadline, stopped);

            futures::select! {
                result = attempt => Some(result),
                _ = deadline => Some(Err(Error::BenchmarkTimeout)),
                _ = stopped => None,
            }
        };

        let Some(result) = result else {
            // Shutting down; leave no record.
            self.benchmark_done(host.public_key).await;
            return
        };

        let benchmark = match result {
            Ok(metrics) => {
                self.interactions.increment_success(&mut host.interactions);
                HostBenchmark {
                    timestamp: start,
                    success: true,
                    error: String::new(),
                    upload_speed: metrics.upload_speed,
                    download_speed: metrics.download_speed,
                    ttfb: metrics.ttfb,
                }
            }
            Err(e) => {
                self.interactions.increment_failure(&mut host.interactions);
                debug!(
                    target: "hostdb::scanner::benchmark_host()",
                    "Benchmark of {} failed: {}",
                    host.net_address, e
                );
                HostBenchmark {
                    timestamp: start,
                    success: false,
                    error: e.to_string(),
                    ..Default::default()
                }
            }
        };
        host.last_benchmark = benchmark.clone();

        if let Err(e) = self.store.update_benchmark(&host, benchmark).await {
            error!(
                target: "hostdb::scanner::benchmark_host()",
                "Couldn't update benchmark of {}: {}",
                host.net_address, e
            );
        }

        self.benchmark_done(host.public_key).await;
    }

    async fn benchmark_done(&self, key: PublicKey) {
        let _ = self.event_send.send(WorkerEvent::BenchmarkDone { key }).await;
    }
}
