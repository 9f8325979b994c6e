//! Presentation pacing
//!
//! Frames are spaced by the delta between consecutive presentation
//! timestamps. There is no wall-clock anchor, so drift accumulates over long
//! streams.

use std::time::Duration;

/// Timestamp ticks per millisecond (timestamps are in microseconds).
pub const TICKS_PER_MILLISECOND: i64 = 1000;

/// Blocks the pump between frames.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeper backed by the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Remembers the timestamp of the last presented frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct PacingClock {
    last_timestamp: Option<i64>,
}

impl PacingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `timestamp` as presented and return how long to wait first.
    ///
    /// The first frame of a session never waits. Later frames wait for the
    /// positive delta to the previous timestamp, truncated to whole
    /// milliseconds. The clock advances even when nothing is waited.
    pub fn advance(&mut self, timestamp: i64) -> Option<Duration> {
        let delay = self
            .last_timestamp
            .map(|last| timestamp.saturating_sub(last))
            .filter(|delta| *delta > 0)
            .map(|delta| Duration::from_millis((delta / TICKS_PER_MILLISECOND) as u64));
        self.last_timestamp = Some(timestamp);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_never_waits() {
        let mut clock = PacingClock::new();
        assert_eq!(clock.advance(500_000), None);
        assert_eq!(clock.advance(520_000), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_zero_first_timestamp_still_paces_next() {
        let mut clock = PacingClock::new();
        assert_eq!(clock.advance(0), None);
        assert_eq!(clock.advance(40_000), Some(Duration::from_millis(40)));
        assert_eq!(clock.advance(80_000), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_delay_truncates_to_milliseconds() {
        let mut clock = PacingClock::new();
        clock.advance(0);
        assert_eq!(clock.advance(33_366), Some(Duration::from_millis(33)));
        // Sub-millisecond delta rounds down to no wait at all.
        assert_eq!(clock.advance(33_999), Some(Duration::ZERO));
    }

    #[test]
    fn test_non_positive_delta_does_not_wait() {
        let mut clock = PacingClock::new();
        clock.advance(100_000);
        assert_eq!(clock.advance(100_000), None);
        assert_eq!(clock.advance(60_000), None);
        // Clock follows the stream even when it goes backwards.
        assert_eq!(clock.advance(70_000), Some(Duration::from_millis(10)));
    }
}
