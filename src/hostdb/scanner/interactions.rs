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

use crate::{hostdb::HostInteractions, util::Timestamp};

/// Counter updates are batched into hourly epochs.
const EPOCH_SECONDS: u64 = 3600;

/// Recent interactions folded into the historic counters may not contribute
/// more than this share of the historic totals.
const RECENT_WEIGHT_LIMIT: f64 = 0.01;

/// Historic totals below this threshold are exempt from decay, so young
/// hosts build up a track record before it starts fading.
const DECAY_FLOOR: f64 = 500.0;

/// Maintains the per-host decayed interaction counters.
///
/// On every update the counters are first brought forward to the current
/// epoch: the recent window is folded into the historic aggregates (capped
/// by [`RECENT_WEIGHT_LIMIT`]) and the historic aggregates decay with the
/// configured half-life. The increment then lands in the fresh recent
/// window. All operations are pure arithmetic and never block.
#[derive(Clone, Debug)]
pub struct InteractionTracker {
    half_life: Duration,
}

impl InteractionTracker {
    pub fn new(half_life: Duration) -> Self {
        Self { half_life }
    }

    /// Bring the counters forward to the current epoch without recording
    /// an interaction.
    pub fn advance(&self, x: &mut HostInteractions) {
        self.advance_to(x, Timestamp::current_time().0 / EPOCH_SECONDS);
    }

    /// Record a successful interaction.
    pub fn increment_success(&self, x: &mut HostInteractions) {
        self.advance(x);
        x.recent_successes += 1.0;
    }

    /// Record a failed interaction.
    pub fn increment_failure(&self, x: &mut HostInteractions) {
        self.advance(x);
        x.recent_failures += 1.0;
    }

    fn advance_to(&self, x: &mut HostInteractions, epoch: u64) {
        if x.last_update == 0 {
            x.last_update = epoch;
            return
        }
        if epoch <= x.last_update {
            return
        }

        let elapsed = ((epoch - x.last_update) * EPOCH_SECONDS) as f64;
        let decay = 0.5f64.powf(elapsed / self.half_life.as_secs_f64());

        let mut historic_s = x.historic_successes;
        let mut historic_f = x.historic_failures;
        if historic_s + historic_f > DECAY_FLOOR {
            historic_s *= decay;
            historic_f *= decay;
        }

        let mut recent_s = x.recent_successes;
        let mut recent_f = x.recent_failures;
        let cap = RECENT_WEIGHT_LIMIT * (historic_s + historic_f).max(DECAY_FLOOR);
        if recent_s + recent_f > cap {
            let adjustment = cap / (recent_s + recent_f);
            recent_s *= adjustment;
            recent_f *= adjustment;
        }

        x.historic_successes = historic_s + recent_s;
        x.historic_failures = historic_f + recent_f;
        x.recent_successes = 0.0;
        x.recent_failures = 0.0;
        x.last_update = epoch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> InteractionTracker {
        InteractionTracker::new(Duration::from_secs(30 * 24 * 3600))
    }

    #[test]
    fn increments_land_in_recent_window() {
        let tracker = tracker();
        let mut x = HostInteractions::default();

        tracker.increment_success(&mut x);
        tracker.increment_success(&mut x);
        tracker.increment_failure(&mut x);

        assert_eq!(x.recent_successes, 2.0);
        assert_eq!(x.recent_failures, 1.0);
        assert_eq!(x.historic_successes, 0.0);
        assert_eq!(x.historic_failures, 0.0);
    }

    #[test]
    fn recent_folds_into_historic() {
        let tracker = tracker();
        let mut x = HostInteractions::default();
        tracker.advance_to(&mut x, 100);
        x.recent_successes = 3.0;
        x.recent_failures = 1.0;

        tracker.advance_to(&mut x, 101);

        assert_eq!(x.recent_successes, 0.0);
        assert_eq!(x.recent_failures, 0.0);
        assert_eq!(x.historic_successes, 3.0);
        assert_eq!(x.historic_failures, 1.0);
    }

    #[test]
    fn historic_decays_but_never_forgets() {
        let tracker = tracker();
        let mut x = HostInteractions::default();
        tracker.advance_to(&mut x, 100);
        x.historic_successes = 1000.0;
        x.historic_failures = 200.0;

        // One half-life later.
        tracker.advance_to(&mut x, 100 + 30 * 24);

        assert!((x.historic_successes - 500.0).abs() < 1.0);
        assert!((x.historic_failures - 100.0).abs() < 1.0);

        // Years later the record has faded further but is still positive.
        tracker.advance_to(&mut x, 100 + 30 * 24 * 10);
        assert!(x.historic_successes > 0.0);
        assert!(x.historic_successes < 500.0);
    }

    #[test]
    fn small_totals_skip_decay() {
        let tracker = tracker();
        let mut x = HostInteractions::default();
        tracker.advance_to(&mut x, 100);
        x.historic_successes = 10.0;

        tracker.advance_to(&mut x, 100 + 30 * 24);
        assert_eq!(x.historic_successes, 10.0);
    }

    #[test]
    fn recent_burst_is_capped_when_folded() {
        let tracker = tracker();
        let mut x = HostInteractions::default();
        tracker.advance_to(&mut x, 100);
        x.recent_failures = 1000.0;

        tracker.advance_to(&mut x, 101);

        // A burst may only move the historic totals by the weight limit.
        assert!(x.historic_failures <= RECENT_WEIGHT_LIMIT * DECAY_FLOOR + f64::EPSILON);
        assert_eq!(x.recent_failures, 0.0);
    }

    #[test]
    fn counters_stay_non_negative() {
        let tracker = tracker();
        let mut x = HostInteractions::default();
        tracker.advance_to(&mut x, 100);
        x.historic_successes = 600.0;
        x.recent_failures = 2.0;

        for epoch in 101..200 {
            tracker.advance_to(&mut x, epoch);
            assert!(x.historic_successes >= 0.0);
            assert!(x.historic_failures >= 0.0);
            assert!(x.recent_successes >= 0.0);
            assert!(x.recent_failures >= 0.0);
        }
    }

    #[test]
    fn stale_epochs_are_ignored() {
        let tracker = tracker();
        let mut x = HostInteractions::default();
        tracker.advance_to(&mut x, 100);
        x.recent_successes = 1.0;

        tracker.advance_to(&mut x, 99);
        assert_eq!(x.recent_successes, 1.0);
        assert_eq!(x.last_update, 100);
    }
}
