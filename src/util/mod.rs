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

use std::time::{Duration, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use smol::Timer;

/// IP-network footprint helpers
pub mod ipnets;

/// Sleep for any number of seconds.
pub async fn sleep(seconds: u64) {
    Timer::after(Duration::from_secs(seconds)).await;
}

/// Sleep for any number of milliseconds.
pub async fn msleep(millis: u64) {
    Timer::after(Duration::from_millis(millis)).await;
}

/// Wall-clock timestamp with second granularity. The zero value means
/// "never" and is used for hosts that have not yet been seen or probed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Generate a `Timestamp` of the current time.
    pub fn current_time() -> Self {
        Self(UNIX_EPOCH.elapsed().unwrap().as_secs())
    }

    /// Time passed since this `Timestamp`.
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(Self::current_time().0.saturating_sub(self.0))
    }

    /// Whether this is the zero timestamp.
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_elapsed() {
        let now = Timestamp::current_time();
        assert!(!now.is_unset());
        assert!(now.elapsed() < Duration::from_secs(2));

        let hour_ago = Timestamp(now.0 - 3600);
        let age = hour_ago.elapsed();
        assert!(age >= Duration::from_secs(3600) && age < Duration::from_secs(3602));

        // The clock going backwards must not underflow.
        let future = Timestamp(now.0 + 1000);
        assert_eq!(future.elapsed(), Duration::ZERO);
    }

    #[test]
    fn timestamp_unset() {
        assert!(Timestamp::default().is_unset());
        assert!(Timestamp(0).is_unset());
        assert!(!Timestamp(1).is_unset());
    }
}
