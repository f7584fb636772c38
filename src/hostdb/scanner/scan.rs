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

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::{pin_mut, FutureExt};
use log::{debug, error};
use smol::Timer;

use super::{Scanner, WorkerEvent};
use crate::{
    hostdb::{HostEntry, HostScan, PublicKey},
    rhp::{HostPriceTable, HostSettings},
    system::TaskGuard,
    util::{
        ipnets::{equal_ip_nets, lookup_ip_nets},
        Timestamp,
    },
    Error,
};

/// Grace period on top of the adaptive timeout, bounding the whole scan
/// including the price table exchange.
const SCAN_GRACE: Duration = Duration::from_secs(4 * 60);

/// Everything measured during one protocol attempt against a host.
struct ScanAttempt {
    latency: Duration,
    success: bool,
    settings: Option<HostSettings>,
    price_table: Option<HostPriceTable>,
    error: Option<Error>,
}

impl Scanner {
    /// Scan a single host: refresh its IP footprint, fetch its settings and
    /// price table, and record the outcome. Every exit path reports back to
    /// the dispatcher; a scan cut short by shutdown leaves no trace.
    pub(super) async fn scan_host(
        self: Arc<Self>,
        mut host: HostEntry,
        timeout: Duration,
        _guard: TaskGuard,
    ) {
        match lookup_ip_nets(&host.net_address).await {
            Ok(nets) => {
                if !equal_ip_nets(&nets, &host.ip_nets) {
                    host.ip_nets = nets;
                    host.last_ip_change = Timestamp::current_time();
                }
            }
            Err(e) => {
                error!(
                    target: "hostdb::scanner::scan_host()",
                    "Failed to look up IP nets of {}: {}",
                    host.net_address, e
                );
            }
        }

        // Bring the decayed counters forward before the outcome lands.
        self.interactions.advance(&mut host.interactions);

        let start = Timestamp::current_time();
        let started = Instant::now();
        let stop = self.tg.stop_signal();

        let outcome = {
            let attempt = self.attempt_host(&host, timeout).fuse();
            let deadline = Timer::after(timeout + SCAN_GRACE).fuse();
            let stopped = stop.recv().fuse();
            pin_mut!(attempt, deadline, stopped);

            futures::select! {
                outcome = attempt => Some(outcome),
                _ = deadline => Some(ScanAttempt {
                    latency: started.elapsed(),
                    success: false,
                    settings: None,
                    price_table: None,
                    error: Some(Error::ScanTimeout),
                }),
                _ = stopped => None,
            }
        };

        let Some(outcome) = outcome else {
            // Shutting down; drop the attempt without a record.
            self.scan_done(host.public_key, None).await;
            return
        };

        match &outcome.error {
            None => self.interactions.increment_success(&mut host.interactions),
            Some(e) => {
                self.interactions.increment_failure(&mut host.interactions);
                debug!(
                    target: "hostdb::scanner::scan_host()",
                    "Scan of {} failed: {}",
                    host.net_address, e
                );
            }
        }

        let scan = HostScan {
            timestamp: start,
            success: outcome.success,
            latency: outcome.latency,
            error: outcome.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            settings: outcome.settings.unwrap_or_default(),
            price_table: outcome.price_table.unwrap_or_default(),
        };
        host.record_scan(scan.clone());

        if let Err(e) = self.store.update_scan_history(&host, scan).await {
            error!(
                target: "hostdb::scanner::scan_host()",
                "Couldn't update scan history of {}: {}",
                host.net_address, e
            );
        }

        self.scan_done(host.public_key, outcome.success.then_some(outcome.latency)).await;
    }

    async fn scan_done(&self, key: PublicKey, sample: Option<Duration>) {
        let _ = self.event_send.send(WorkerEvent::ScanDone { key, sample }).await;
    }

    /// Run the two-phase protocol exchange. The settings RPC is bounded by
    /// the adaptive timeout and timed regardless of its outcome; the scan
    /// counts as successful once settings arrive, even if the price table
    /// exchange then fails.
    async fn attempt_host(&self, host: &HostEntry, timeout: Duration) -> ScanAttempt {
        let started = Instant::now();

        let settings_rpc = self.client.settings(&host.net_address, &host.public_key).fuse();
        let deadline = Timer::after(timeout).fuse();
        pin_mut!(settings_rpc, deadline);

        let settings = futures::select! {
            settings = settings_rpc => settings,
            _ = deadline => Err(Error::ScanTimeout),
        };
        let latency = started.elapsed();

        let settings = match settings {
            Ok(settings) => settings,
            Err(e) => {
                return ScanAttempt {
                    latency,
                    success: false,
                    settings: None,
                    price_table: None,
                    error: Some(e),
                }
            }
        };

        match self.client.price_table(&settings.siamux_addr(), &host.public_key).await {
            Ok(price_table) => ScanAttempt {
                latency,
                success: true,
                settings: Some(settings),
                price_table: Some(price_table),
                error: None,
            },
            Err(e) => ScanAttempt {
                latency,
                success: true,
                settings: Some(settings),
                price_table: None,
                error: Some(e),
            },
        }
    }
}
