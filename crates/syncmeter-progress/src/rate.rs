//! Smoothed rate estimator for a single metric
//!
//! A [`RateCounter`] tracks `total` and `completed` units of work and,
//! once per second, folds the progress made since the previous tick into
//! an exponentially smoothed units-per-second rate.
//!
//! ## Smoothing
//!
//! If progress P/s is made and then stops, after N ticks the rate has
//! decayed to `P * 0.9^N` (about 4% of P after 30 s). A fixed factor of
//! 0.9 would also make the first estimates useless, so the effective
//! factor starts at 0 and ramps up to 0.9:
//!
//! ```text
//!   alpha = 0.9 * (1 - ramp)          ramp: 1.0 → 0.7 → 0.49 → … (≈0.03 after 10 ticks)
//!   rate  = alpha * rate + (1 - alpha) * (completed - prev_completed)
//! ```

use serde::{Deserialize, Serialize};

/// Steady-state smoothing factor once the ramp has decayed.
const SMOOTHING: f64 = 0.9;

/// Per-tick decay of the startup ramp.
const RAMP_DECAY: f64 = 0.7;

// ============================================================================
// Estimates
// ============================================================================

/// Bandwidth and remaining-time estimate derived from a rate
///
/// An all-zero value is the "unknown or complete" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimates {
    /// Smoothed units per second (bytes/s for byte counters)
    pub bandwidth: f64,
    /// Estimated milliseconds until the remaining work is done
    pub eta_millis: f64,
}

impl Estimates {
    /// Returns the ETA as a `Duration`, rounded to whole milliseconds
    pub fn eta(&self) -> std::time::Duration {
        if !self.eta_millis.is_finite() || self.eta_millis <= 0.0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_millis(self.eta_millis.round() as u64)
    }

    /// Returns true if no rate has been observed
    pub fn is_unknown(&self) -> bool {
        self.bandwidth == 0.0 && self.eta_millis == 0.0
    }
}

// ============================================================================
// RateCounter
// ============================================================================

/// Total/completed counter pair with an exponentially smoothed rate
///
/// All mutation goes through [`set_completed`](RateCounter::set_completed),
/// [`set_total`](RateCounter::set_total) and
/// [`add_to_total`](RateCounter::add_to_total), which keep
/// `completed <= total` at all times.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCounter {
    total: u64,
    completed: u64,
    prev_completed: u64,
    rate_per_sec: f64,
    smoothing_ramp: f64,
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateCounter {
    /// Creates an empty counter
    pub fn new() -> Self {
        Self {
            total: 0,
            completed: 0,
            prev_completed: 0,
            rate_per_sec: 0.0,
            smoothing_ramp: 1.0,
        }
    }

    /// Creates an empty counter expecting `total` units of work
    pub fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Self::new()
        }
    }

    // --- Getters ---

    /// Expected total units of work
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Units completed so far
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Value of `completed` at the previous tick
    pub fn prev_completed(&self) -> u64 {
        self.prev_completed
    }

    /// Smoothed units per second
    pub fn rate_per_sec(&self) -> f64 {
        self.rate_per_sec
    }

    /// Units still to do
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.completed)
    }

    // --- Mutation ---

    /// Sets the completed amount, clamped to `total`
    ///
    /// A downward correction also pulls `prev_completed` down so the next
    /// tick never sees a negative delta.
    pub fn set_completed(&mut self, completed: u64) {
        self.completed = completed.min(self.total);
        self.prev_completed = self.prev_completed.min(self.completed);
    }

    /// Grows the expected total by `amount`
    pub fn add_to_total(&mut self, amount: u64) {
        self.total = self.total.saturating_add(amount);
    }

    /// Replaces the expected total, re-clamping `completed`
    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        self.set_completed(self.completed);
    }

    /// Folds the progress since the previous tick into the smoothed rate
    ///
    /// Expected to be called once per wall-clock second.
    pub fn tick(&mut self) {
        let alpha = SMOOTHING * (1.0 - self.smoothing_ramp);
        let delta = (self.completed - self.prev_completed) as f64;
        self.rate_per_sec = alpha * self.rate_per_sec + (1.0 - alpha) * delta;
        self.prev_completed = self.completed;
        self.smoothing_ramp *= RAMP_DECAY;
    }

    /// Current bandwidth and ETA
    pub fn estimates(&self) -> Estimates {
        let eta_millis = if self.rate_per_sec != 0.0 {
            self.remaining() as f64 / self.rate_per_sec * 1000.0
        } else {
            0.0
        };
        Estimates {
            bandwidth: self.rate_per_sec,
            eta_millis,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_rate_for_test(&mut self, rate_per_sec: f64) {
        self.rate_per_sec = rate_per_sec;
    }
}
