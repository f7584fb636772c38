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

/// Number of successful scans sampled before the adaptive timeout engages.
pub const MIN_SCANS: usize = 25;

/// Timeout used while the sample buffer is still filling. Also the upper
/// bound once the adaptive timeout is active.
const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Latencies of the first successful scans, driving the adaptive per-scan
/// timeout. A young installation tolerates slow hosts; once [`MIN_SCANS`]
/// samples are in, the median is locked and pathological outliers are
/// rejected quickly.
#[derive(Clone, Debug)]
pub enum LatencyTracker {
    /// Still sampling successful scans.
    Collecting(Vec<Duration>),
    /// Sample buffer filled; only the locked median is kept.
    Frozen(Duration),
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::Collecting(Vec::with_capacity(MIN_SCANS))
    }

    /// Feed one successful scan latency. Ignored once frozen. On the
    /// [`MIN_SCANS`]th sample the buffer is sorted and collapses into its
    /// median.
    pub fn record(&mut self, sample: Duration) {
        if let Self::Collecting(samples) = self {
            samples.push(sample);
            if samples.len() == MIN_SCANS {
                samples.sort_unstable();
                *self = Self::Frozen(samples[MIN_SCANS / 2]);
            }
        }
    }

    /// The timeout to apply to the next scan.
    pub fn timeout(&self) -> Duration {
        match self {
            Self::Collecting(_) => DEFAULT_SCAN_TIMEOUT,
            Self::Frozen(median) => (*median * 5).min(DEFAULT_SCAN_TIMEOUT),
        }
    }

    /// Whether the tracker still accepts samples.
    pub fn is_collecting(&self) -> bool {
        matches!(self, Self::Collecting(_))
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_while_collecting() {
        let mut tracker = LatencyTracker::new();
        assert_eq!(tracker.timeout(), DEFAULT_SCAN_TIMEOUT);

        for i in 0..MIN_SCANS - 1 {
            tracker.record(Duration::from_millis(10 * (i as u64 + 1)));
            assert!(tracker.is_collecting());
            assert_eq!(tracker.timeout(), DEFAULT_SCAN_TIMEOUT);
        }
    }

    #[test]
    fn freezes_on_median_of_full_buffer() {
        let mut tracker = LatencyTracker::new();
        // 10ms, 20ms, ..., 250ms; the median is 130ms.
        for i in 1..=MIN_SCANS as u64 {
            tracker.record(Duration::from_millis(10 * i));
        }
        assert!(!tracker.is_collecting());
        assert_eq!(tracker.timeout(), Duration::from_millis(650));
    }

    #[test]
    fn frozen_ignores_further_samples() {
        let mut tracker = LatencyTracker::new();
        for _ in 0..MIN_SCANS {
            tracker.record(Duration::from_millis(100));
        }
        let timeout = tracker.timeout();
        tracker.record(Duration::from_secs(60));
        assert_eq!(tracker.timeout(), timeout);
    }

    #[test]
    fn median_is_order_independent() {
        let mut tracker = LatencyTracker::new();
        for i in (1..=MIN_SCANS as u64).rev() {
            tracker.record(Duration::from_millis(10 * i));
        }
        assert_eq!(tracker.timeout(), Duration::from_millis(650));
    }

    #[test]
    fn adaptive_timeout_is_capped() {
        let mut tracker = LatencyTracker::new();
        for _ in 0..MIN_SCANS {
            tracker.record(Duration::from_secs(90));
        }
        assert_eq!(tracker.timeout(), DEFAULT_SCAN_TIMEOUT);
    }

    #[test]
    fn buffer_never_exceeds_capacity() {
        let mut tracker = LatencyTracker::new();
        for i in 0..2 * MIN_SCANS as u64 {
            if let LatencyTracker::Collecting(samples) = &tracker {
                assert!(samples.len() < MIN_SCANS);
            }
            tracker.record(Duration::from_millis(i));
        }
    }
}
