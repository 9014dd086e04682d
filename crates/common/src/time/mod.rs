//! Time abstraction for the retry executor
//!
//! The executor never reads the system clock or sleeps directly; it goes
//! through a [`Clock`]. Production code uses [`SystemClock`]. Tests use the
//! `MockClock` from `testing` (behind the `test-utils` feature), which
//! advances virtual time instantly and records every requested sleep.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use backstop_common::time::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let start = clock.now();
//! clock.sleep_blocking(Duration::from_millis(1));
//!
//! assert!(clock.now().duration_since(start) >= Duration::from_millis(1));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of time and sleep for the retry executor
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic instant, for measuring durations
    fn now(&self) -> Instant;

    /// Wall clock time, stamped on attempt records
    fn utc_now(&self) -> DateTime<Utc>;

    /// Suspend the current task without holding a thread
    async fn sleep(&self, duration: Duration);

    /// Block the calling thread
    fn sleep_blocking(&self, duration: Duration);
}

/// Real system clock backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn sleep_blocking(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[async_trait]
impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        (**self).utc_now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }

    fn sleep_blocking(&self, duration: Duration) {
        (**self).sleep_blocking(duration)
    }
}
