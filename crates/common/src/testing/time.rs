//! Deterministic clock for executor tests
//!
//! [`MockClock`] implements [`Clock`] without touching real time: sleeps
//! return immediately, advance virtual time and land in a log that tests
//! assert against.
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use backstop_common::testing::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.sleep_blocking(Duration::from_millis(100));
//! clock.sleep_blocking(Duration::from_millis(200));
//!
//! assert_eq!(clock.now().duration_since(start), Duration::from_millis(300));
//! assert_eq!(clock.sleeps(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::time::Clock;

#[derive(Debug)]
struct MockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Deterministic clock for tests
///
/// Clones share the same virtual time and sleep log.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    base_utc: DateTime<Utc>,
    state: Arc<Mutex<MockState>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// A mock clock whose wall time starts at `base_utc`.
    pub fn starting_at(base_utc: DateTime<Utc>) -> Self {
        Self {
            start: Instant::now(),
            base_utc,
            state: Arc::new(Mutex::new(MockState { elapsed: Duration::ZERO, sleeps: Vec::new() })),
        }
    }

    /// Move virtual time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed = state.elapsed.saturating_add(duration);
    }

    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.state.lock().sleeps.len()
    }

    pub fn total_slept(&self) -> Duration {
        self.state.lock().sleeps.iter().copied().fold(Duration::ZERO, Duration::saturating_add)
    }

    fn record_sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.sleeps.push(duration);
        state.elapsed = state.elapsed.saturating_add(duration);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed();
        self.start.checked_add(elapsed).unwrap_or(self.start)
    }

    fn utc_now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.elapsed())
            .ok()
            .and_then(|delta| self.base_utc.checked_add_signed(delta))
            .unwrap_or(self.base_utc)
    }

    async fn sleep(&self, duration: Duration) {
        self.record_sleep(duration);
        tokio::task::yield_now().await;
    }

    fn sleep_blocking(&self, duration: Duration) {
        self.record_sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[tokio::test]
    async fn test_mock_clock_records_async_sleeps() {
        let clock = MockClock::new();
        clock.sleep(Duration::from_millis(100)).await;
        clock.sleep(Duration::from_millis(200)).await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
        assert_eq!(clock.total_slept(), Duration::from_millis(300));
        assert_eq!(clock.elapsed(), Duration::from_millis(300));
    }

    #[test]
    fn test_mock_clock_advance_is_not_a_sleep() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.sleep_count(), 0);
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn test_mock_clock_wall_time_follows_elapsed() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = MockClock::starting_at(base);
        clock.sleep_blocking(Duration::from_secs(90));
        assert_eq!(clock.utc_now(), Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 30).unwrap());
    }

    #[test]
    fn test_mock_clock_clones_share_state() {
        let clock = MockClock::new();
        let shared = clock.clone();
        shared.sleep_blocking(Duration::from_millis(10));
        assert_eq!(clock.sleep_count(), 1);
    }

    #[tokio::test]
    async fn test_arc_clock_delegates() {
        let mock = Arc::new(MockClock::new());
        let clock: Arc<dyn Clock> = mock.clone();
        clock.sleep(Duration::from_millis(7)).await;
        assert_eq!(mock.sleeps(), vec![Duration::from_millis(7)]);
    }
}
