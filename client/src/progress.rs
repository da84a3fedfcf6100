//! Fixed-interval local progress clock
//!
//! Counts wall-clock time and reports how many progress steps are due. It is
//! independent of both the frame rate and the jump animator.

use std::time::Duration;

#[derive(Debug)]
pub struct ProgressTicker {
    interval: Duration,
    elapsed: Duration,
    next_seq: u64,
    running: bool,
}

impl ProgressTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            next_seq: 1,
            running: true,
        }
    }

    /// Adds `dt` and returns the number of whole intervals that elapsed.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running || self.interval.is_zero() {
            return 0;
        }

        self.elapsed += dt;
        let mut due = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            due += 1;
        }
        due
    }

    /// Ordering token for the next reported update.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_on_interval_boundaries() {
        let mut ticker = ProgressTicker::new(Duration::from_millis(100));

        assert_eq!(ticker.advance(Duration::from_millis(60)), 0);
        assert_eq!(ticker.advance(Duration::from_millis(60)), 1);
        assert_eq!(ticker.advance(Duration::from_millis(80)), 1);
        assert_eq!(ticker.advance(Duration::from_millis(250)), 2);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut ticker = ProgressTicker::new(Duration::from_millis(100));
        assert_eq!(ticker.next_seq(), 1);
        assert_eq!(ticker.next_seq(), 2);
    }

    #[test]
    fn test_stopped_ticker_reports_nothing() {
        let mut ticker = ProgressTicker::new(Duration::from_millis(100));
        ticker.advance(Duration::from_millis(90));
        ticker.stop();

        assert!(!ticker.is_running());
        assert_eq!(ticker.advance(Duration::from_secs(10)), 0);
    }
}
