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

use std::time::Duration;

use crate::hostdb::HostEntry;

/// Base interval between scans of a host that was seen online recently.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(30 * 60);

const DAY: Duration = Duration::from_secs(24 * 3600);

/// How long to wait between scans of a host, depending on how long ago it
/// was last seen online. Hosts that have been offline for longer are probed
/// less and less frequently, down to once a day.
pub fn scan_interval(host: &HostEntry) -> Duration {
    if host.last_seen.is_unset() {
        return SCAN_INTERVAL // 30 minutes
    }
    let offline = host.last_seen.elapsed();
    if offline > 28 * DAY {
        return SCAN_INTERVAL * 48 // 24 hours
    }
    if offline > 14 * DAY {
        return SCAN_INTERVAL * 24 // 12 hours
    }
    if offline > 7 * DAY {
        return SCAN_INTERVAL * 12 // 6 hours
    }
    if offline > 3 * DAY {
        return SCAN_INTERVAL * 8 // 4 hours
    }
    if offline > 2 * DAY {
        return SCAN_INTERVAL * 4 // 2 hours
    }
    if offline > DAY {
        return SCAN_INTERVAL * 2 // 1 hour
    }
    SCAN_INTERVAL // 30 minutes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hostdb::PublicKey, util::Timestamp};

    fn host_seen(ago: Duration) -> HostEntry {
        let mut host = HostEntry::new(PublicKey([7; 32]), "h:9982");
        host.last_seen = Timestamp(Timestamp::current_time().0 - ago.as_secs());
        host
    }

    #[test]
    fn never_seen_gets_base_interval() {
        let host = HostEntry::new(PublicKey([7; 32]), "h:9982");
        assert_eq!(scan_interval(&host), SCAN_INTERVAL);
    }

    #[test]
    fn interval_ladder() {
        let hours = |n: u64| Duration::from_secs(n * 3600);
        let cases = [
            (hours(1), SCAN_INTERVAL),
            (hours(23), SCAN_INTERVAL),
            (hours(25), hours(1)),
            (hours(2 * 24 + 1), hours(2)),
            (hours(4 * 24), hours(4)),
            (hours(8 * 24), hours(6)),
            (hours(20 * 24), hours(12)),
            (hours(30 * 24), hours(24)),
        ];
        for (ago, expected) in cases {
            assert_eq!(scan_interval(&host_seen(ago)), expected, "offline for {:?}", ago);
        }
    }

    #[test]
    fn interval_is_monotone_in_offline_time() {
        let mut last = Duration::ZERO;
        for days in 0..40 {
            let interval = scan_interval(&host_seen(Duration::from_secs(days * 24 * 3600)));
            assert!(interval >= last, "interval shrank at day {}", days);
            last = interval;
        }
    }
}
