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

use std::sync::Arc;

use async_trait::async_trait;

use super::{HostBenchmark, HostEntry, HostScan};
use crate::Result;

pub type HostStorePtr = Arc<dyn HostStore>;

/// Persistence layer for host entries. Implementations handle their own
/// synchronization; the scanner never holds any lock across these calls.
#[async_trait]
pub trait HostStore: Send + Sync {
    /// The next batch of candidates due for a scan or benchmark. The store
    /// is free to reorder, dedupe and paginate, and the batch may contain
    /// hosts that are still fresh; the dispatcher filters those.
    async fn hosts_for_scan(&self) -> Result<Vec<HostEntry>>;

    /// Page through the known hosts.
    async fn hosts(&self, offset: usize, limit: usize) -> Result<Vec<HostEntry>>;

    /// Persist an updated entry together with the scan appended to its
    /// history.
    async fn update_scan_history(&self, host: &HostEntry, scan: HostScan) -> Result<()>;

    /// Persist an updated entry together with its replaced benchmark.
    async fn update_benchmark(&self, host: &HostEntry, benchmark: HostBenchmark) -> Result<()>;

    /// Flush and release the underlying storage.
    async fn close(&self) -> Result<()>;
}
