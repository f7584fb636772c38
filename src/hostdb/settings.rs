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

use serde::Deserialize;

/// Atomic pointer to hostdb settings.
pub type SettingsPtr = Arc<HostDbSettings>;

/// Tunable hostdb settings. The scheduling constants (scan cap, tick,
/// interval ladder) are fixed by design and intentionally not here.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HostDbSettings {
    /// Minimum time between two benchmarks of the same host, in seconds
    pub benchmark_interval_seconds: u64,

    /// Upper bound on a single benchmark run, in seconds
    pub benchmark_timeout_seconds: u64,

    /// Half-life of the historic interaction counters, in seconds
    pub interaction_half_life_seconds: u64,
}

impl Default for HostDbSettings {
    fn default() -> Self {
        Self {
            benchmark_interval_seconds: 7200,
            benchmark_timeout_seconds: 300,
            interaction_half_life_seconds: 30 * 24 * 3600,
        }
    }
}
