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

use std::{fmt, time::Duration};

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::{
    rhp::{HostPriceTable, HostSettings},
    util::Timestamp,
};

/// Opaque host identity. Unique within the database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ed25519:")?;
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// One host entry in the database. Aggregates the host's announced
/// settings and measured metrics with its public key.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEntry {
    pub id: u64,
    pub public_key: PublicKey,
    pub first_seen: Timestamp,
    pub known_since: u64,
    pub net_address: String,
    pub blocked: bool,
    pub scan_history: Vec<HostScan>,
    pub last_benchmark: HostBenchmark,
    pub interactions: HostInteractions,
    pub last_seen: Timestamp,
    pub ip_nets: Vec<IpNet>,
    pub last_ip_change: Timestamp,
    pub settings: HostSettings,
    pub price_table: HostPriceTable,
}

impl HostEntry {
    pub fn new(public_key: PublicKey, net_address: &str) -> Self {
        Self { public_key, net_address: net_address.to_string(), ..Default::default() }
    }

    /// The most recent scan record, if any.
    pub fn last_scan(&self) -> Option<&HostScan> {
        self.scan_history.last()
    }

    /// Append a scan outcome to the history. Successful scans advance
    /// `last_seen` (never backwards) and refresh the settings and price
    /// table snapshots.
    pub fn record_scan(&mut self, scan: HostScan) {
        if scan.success {
            if self.first_seen.is_unset() {
                self.first_seen = scan.timestamp;
            }
            if scan.timestamp > self.last_seen {
                self.last_seen = scan.timestamp;
            }
            self.settings = scan.settings.clone();
            self.price_table = scan.price_table.clone();
        }
        self.scan_history.push(scan);
    }
}

/// All information measured during a host scan. Immutable once written.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostScan {
    pub timestamp: Timestamp,
    pub success: bool,
    pub latency: Duration,
    pub error: String,
    pub settings: HostSettings,
    pub price_table: HostPriceTable,
}

/// The information measured during a host benchmark.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostBenchmark {
    pub timestamp: Timestamp,
    pub success: bool,
    pub error: String,
    pub upload_speed: f64,
    pub download_speed: f64,
    pub ttfb: Duration,
}

/// Decayed success/failure aggregates feeding the downstream scorer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInteractions {
    pub historic_successes: f64,
    pub historic_failures: f64,
    pub recent_successes: f64,
    pub recent_failures: f64,
    #[serde(skip)]
    pub last_update: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_at(timestamp: u64, success: bool) -> HostScan {
        HostScan {
            timestamp: Timestamp(timestamp),
            success,
            latency: Duration::from_millis(50),
            error: if success { String::new() } else { "connection failed: refused".into() },
            settings: HostSettings { net_address: "h:9982".into(), ..Default::default() },
            price_table: HostPriceTable::default(),
        }
    }

    #[test]
    fn record_scan_appends_in_order() {
        let mut host = HostEntry::new(PublicKey([1; 32]), "h:9982");
        host.record_scan(scan_at(100, true));
        host.record_scan(scan_at(200, false));
        host.record_scan(scan_at(300, true));

        assert_eq!(host.scan_history.len(), 3);
        assert!(host
            .scan_history
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        assert_eq!(host.last_scan().unwrap().timestamp, Timestamp(300));
    }

    #[test]
    fn last_seen_tracks_successes_only() {
        let mut host = HostEntry::new(PublicKey([2; 32]), "h:9982");
        host.record_scan(scan_at(100, true));
        assert_eq!(host.last_seen, Timestamp(100));
        assert_eq!(host.first_seen, Timestamp(100));

        host.record_scan(scan_at(200, false));
        assert_eq!(host.last_seen, Timestamp(100));

        host.record_scan(scan_at(300, true));
        assert_eq!(host.last_seen, Timestamp(300));
        assert_eq!(host.first_seen, Timestamp(100));
    }

    #[test]
    fn last_seen_never_regresses() {
        let mut host = HostEntry::new(PublicKey([3; 32]), "h:9982");
        host.last_seen = Timestamp(500);
        host.record_scan(scan_at(400, true));
        assert_eq!(host.last_seen, Timestamp(500));
    }

    #[test]
    fn success_refreshes_snapshots() {
        let mut host = HostEntry::new(PublicKey([4; 32]), "h:9982");
        host.record_scan(scan_at(100, true));
        assert_eq!(host.settings.net_address, "h:9982");

        // A failed scan must not clobber the snapshots.
        let mut failed = scan_at(200, false);
        failed.settings = HostSettings::default();
        host.record_scan(failed);
        assert_eq!(host.settings.net_address, "h:9982");
    }

    #[test]
    fn public_key_display() {
        let key = PublicKey([0xab; 32]);
        let repr = key.to_string();
        assert!(repr.starts_with("ed25519:abab"));
        assert_eq!(repr.len(), "ed25519:".len() + 64);
    }
}
