//! # Fibonacci backoff
//!
//! Progressive backoff for failing reconciliations. Grows more slowly than
//! exponential backoff, which suits sources that recover on their own (an
//! endpoint coming back, a ConfigMap being created).
//!
//! Default sequence with 30s min and 600s max: 30, 30, 60, 90, 150, 240,
//! 390, 600 (capped).

use std::time::Duration;

/// Fibonacci backoff calculator, capped at a maximum
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_secs: u64,
    prev_secs: u64,
    current_secs: u64,
    max_secs: u64,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs,
            max_secs,
        }
    }

    /// Return the current backoff and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = Duration::from_secs(self.current_secs);
        let next = self.prev_secs + self.current_secs;
        self.prev_secs = self.current_secs;
        self.current_secs = next.min(self.max_secs);
        result
    }

    /// Restart the sequence after a successful reconciliation
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs;
    }
}
