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
use log::error;
use smol::Executor;
use url::Url;

/// Host entries and the records attached to them.
pub mod entry;

/// Tunable hostdb settings.
pub mod settings;

/// The narrow persistence interface the scanner drives.
pub mod store;

/// The scanning subsystem. A self-pacing dispatcher pulls batches of due
/// hosts from the store, fans scans out over a bounded worker pool and runs
/// throughput benchmarks one at a time. Workers report back on a completion
/// channel; all scheduling state is confined to the dispatcher task.
pub mod scanner;

pub use entry::{HostBenchmark, HostEntry, HostInteractions, HostScan, PublicKey};
pub use settings::{HostDbSettings, SettingsPtr};
pub use store::{HostStore, HostStorePtr};

use crate::{rhp::RhpClientPtr, system::TaskGroup, Result};
use scanner::{Scanner, ScannerPtr};

pub type SyncerPtr = Arc<dyn Syncer>;

/// View of the chain syncer the scanner needs: whether scanning may start,
/// and the current peer set for the online check.
#[async_trait]
pub trait Syncer: Send + Sync {
    async fn synced(&self) -> bool;
    async fn peers(&self) -> Vec<Url>;
}

pub type HostDbPtr = Arc<HostDb>;

/// The database of storage hosts.
pub struct HostDb {
    store: HostStorePtr,
    syncer: SyncerPtr,
    scanner: ScannerPtr,
}

impl HostDb {
    pub fn new(
        store: HostStorePtr,
        syncer: SyncerPtr,
        client: RhpClientPtr,
        settings: SettingsPtr,
    ) -> HostDbPtr {
        let tg = TaskGroup::new();
        let scanner = Scanner::new(store.clone(), syncer.clone(), client, settings, tg);
        Arc::new(Self { store, syncer, scanner })
    }

    /// Start the scanning task.
    pub fn start(&self, executor: Arc<Executor<'_>>) {
        self.scanner.clone().start(executor);
    }

    /// Page through the known hosts.
    pub async fn hosts(&self, offset: usize, limit: usize) -> Result<Vec<HostEntry>> {
        self.store.hosts(offset, limit).await
    }

    /// Whether the database has a live view of the network.
    pub async fn online(&self) -> bool {
        !self.syncer.peers().await.is_empty()
    }

    /// Shut down: stop the scanner, wait for in-flight workers to drain,
    /// then close the store. Calling this twice is equivalent to once.
    pub async fn close(&self) {
        self.scanner.stop().await;
        if let Err(e) = self.store.close().await {
            error!(target: "hostdb::close()", "Failed closing host store: {}", e);
        }
    }
}
