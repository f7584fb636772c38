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

//! Renter-host protocol surface.
//!
//! The wire protocol itself lives behind [`RhpClient`]: implementations
//! establish a transport session per call and tear it down on every path,
//! the scanner only sees the RPC results. Both protocol generations are
//! covered: the v2 settings exchange and the v3 price table query over the
//! host's SiaMux endpoint.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{hostdb::PublicKey, Result};

pub type RhpClientPtr = Arc<dyn RhpClient>;

/// External settings a host announces during the v2 handshake.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSettings {
    pub accepting_contracts: bool,
    pub net_address: String,
    pub version: String,
    pub max_duration: u64,
    pub sector_size: u64,
    pub remaining_storage: u64,
    pub total_storage: u64,
    pub storage_price: u128,
    pub collateral: u128,
    pub upload_bandwidth_price: u128,
    pub download_bandwidth_price: u128,
    pub siamux_port: String,
}

impl HostSettings {
    /// The SiaMux endpoint advertised by the host: the announced hostname
    /// with the dedicated SiaMux port.
    pub fn siamux_addr(&self) -> String {
        match self.net_address.rsplit_once(':') {
            Some((host, _)) => format!("{}:{}", host, self.siamux_port),
            None => format!("{}:{}", self.net_address, self.siamux_port),
        }
    }
}

/// Pricing snapshot obtained over the v3 protocol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPriceTable {
    pub validity: Duration,
    pub update_price_table_cost: u128,
    pub init_base_cost: u128,
    pub read_base_cost: u128,
    pub write_base_cost: u128,
    pub upload_bandwidth_cost: u128,
    pub download_bandwidth_cost: u128,
    pub contract_price: u128,
}

/// Raw measurements of one throughput benchmark run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BenchmarkMetrics {
    /// Upload throughput in bytes per second
    pub upload_speed: f64,
    /// Download throughput in bytes per second
    pub download_speed: f64,
    /// Time to first byte of the download
    pub ttfb: Duration,
}

/// Client side of the renter-host protocol, as used by the scanner.
#[async_trait]
pub trait RhpClient: Send + Sync {
    /// Dial the host's v2 endpoint and run the settings RPC.
    async fn settings(&self, addr: &str, key: &PublicKey) -> Result<HostSettings>;

    /// Dial the host's SiaMux endpoint and run the v3 price table RPC.
    /// The table is queried without supplying a payment method, which hosts
    /// answer free of charge.
    async fn price_table(&self, siamux_addr: &str, key: &PublicKey) -> Result<HostPriceTable>;

    /// Upload and download a small amount of data, measuring throughput and
    /// time to first byte. Uses the host's last known settings.
    async fn benchmark(
        &self,
        addr: &str,
        key: &PublicKey,
        settings: &HostSettings,
    ) -> Result<BenchmarkMetrics>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siamux_addr_replaces_port() {
        let settings = HostSettings {
            net_address: "host.example.com:9982".into(),
            siamux_port: "9983".into(),
            ..Default::default()
        };
        assert_eq!(settings.siamux_addr(), "host.example.com:9983");
    }

    #[test]
    fn siamux_addr_without_port() {
        let settings = HostSettings {
            net_address: "host.example.com".into(),
            siamux_port: "9983".into(),
            ..Default::default()
        };
        assert_eq!(settings.siamux_addr(), "host.example.com:9983");
    }
}
