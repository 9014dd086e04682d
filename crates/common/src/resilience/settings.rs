//! Retry settings value object
//!
//! One flat budget: up to `retry_count` invocations, separated by a cool-off
//! period that is multiplied by `cool_off_factor` after every wait.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};
use crate::utils::serde::duration_millis;

const DEFAULT_RETRY_COUNT: u32 = 3;
const DEFAULT_COOL_OFF: Duration = Duration::from_millis(100);
const DEFAULT_COOL_OFF_FACTOR: f64 = 1.0;
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Immutable retry configuration, safe to share between concurrent calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of invocations of the guarded operation
    retry_count: u32,
    /// Wait before the first retry
    #[serde(rename = "cool_off_ms", with = "duration_millis")]
    cool_off_period: Duration,
    /// Multiplier applied to the wait after each retry
    cool_off_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            cool_off_period: DEFAULT_COOL_OFF,
            cool_off_factor: DEFAULT_COOL_OFF_FACTOR,
        }
    }
}

impl RetrySettings {
    /// Validated settings.
    ///
    /// A `retry_count` of zero is accepted: the executor then never invokes
    /// the operation and reports exhaustion straight away.
    pub fn new(retry_count: u32, cool_off_period: Duration, cool_off_factor: f64) -> CommonResult<Self> {
        let settings = Self { retry_count, cool_off_period, cool_off_factor };
        settings.validate()?;
        Ok(settings)
    }

    /// Constant backoff (factor 1.0).
    pub fn constant(retry_count: u32, cool_off_period: Duration) -> Self {
        Self { retry_count, cool_off_period, cool_off_factor: 1.0 }
    }

    pub fn builder() -> RetrySettingsBuilder {
        RetrySettingsBuilder::new()
    }

    /// Check the factor is a finite, strictly positive number.
    ///
    /// Deserialized settings bypass [`RetrySettings::new`]; call this after
    /// loading them.
    pub fn validate(&self) -> CommonResult<()> {
        if !self.cool_off_factor.is_finite() || self.cool_off_factor <= 0.0 {
            return Err(CommonError::config_field(
                "cool_off_factor",
                format!("must be a finite number greater than 0, got {}", self.cool_off_factor),
            ));
        }
        Ok(())
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn cool_off_period(&self) -> Duration {
        self.cool_off_period
    }

    pub fn cool_off_factor(&self) -> f64 {
        self.cool_off_factor
    }

    /// The cool-off that follows `current`.
    ///
    /// Not clamped: a factor below 1.0 shrinks toward zero, and growth past
    /// `Duration::MAX` saturates.
    pub fn next_cool_off(&self, current: Duration) -> Duration {
        let nanos = (current.as_nanos() as f64 * self.cool_off_factor).round();
        let secs = (nanos / NANOS_PER_SEC).floor();
        if secs >= u64::MAX as f64 {
            return Duration::MAX;
        }
        Duration::new(secs as u64, (nanos - secs * NANOS_PER_SEC) as u32)
    }

    /// Wait before retry number `retry` (1-based): `cool_off * factor^(retry - 1)`.
    ///
    /// Retry `n` is attempt `n + 1`, so retry 1 is the wait between the
    /// first and second attempts. Nothing is slept before the first attempt.
    /// With 100ms and factor 2.0 the first three retries wait 100ms, 200ms
    /// and 400ms: `100ms * 2^2` is the third retry, the wait before the
    /// fourth attempt. `retry = 0` is treated as the first retry.
    pub fn cool_off_for_retry(&self, retry: u32) -> Duration {
        (1..retry.max(1)).fold(self.cool_off_period, |delay, _| self.next_cool_off(delay))
    }

    /// Every wait a fully failing sequence goes through, in order.
    pub fn cool_off_schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        let retries = self.retry_count.saturating_sub(1);
        (1..=retries).map(move |retry| self.cool_off_for_retry(retry))
    }
}

/// Builder for `RetrySettings` with fluent API
#[derive(Debug, Default)]
pub struct RetrySettingsBuilder {
    settings: RetrySettings,
}

impl RetrySettingsBuilder {
    pub fn new() -> Self {
        Self { settings: RetrySettings::default() }
    }

    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.settings.retry_count = retry_count;
        self
    }

    pub fn cool_off(mut self, cool_off_period: Duration) -> Self {
        self.settings.cool_off_period = cool_off_period;
        self
    }

    pub fn cool_off_millis(self, millis: u64) -> Self {
        self.cool_off(Duration::from_millis(millis))
    }

    pub fn factor(mut self, cool_off_factor: f64) -> Self {
        self.settings.cool_off_factor = cool_off_factor;
        self
    }

    pub fn build(self) -> CommonResult<RetrySettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RetrySettings::default();
        assert_eq!(settings.retry_count(), 3);
        assert_eq!(settings.cool_off_period(), Duration::from_millis(100));
        assert_eq!(settings.cool_off_factor(), 1.0);
        assert!(settings.validate().is_ok());
    }

    /// Validates factor validation.
    ///
    /// Assertions:
    /// - Ensures zero, negative, NaN and infinite factors are rejected.
    /// - Confirms the error names the `cool_off_factor` field.
    #[test]
    fn test_invalid_factor_rejected() {
        for factor in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let err = RetrySettings::new(3, Duration::from_millis(10), factor).unwrap_err();
            assert!(
                matches!(err, CommonError::Config { field: Some(ref f), .. } if f == "cool_off_factor"),
                "factor {factor} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_retry_count_accepted() {
        let settings = RetrySettings::new(0, Duration::ZERO, 1.0).unwrap();
        assert_eq!(settings.retry_count(), 0);
        assert_eq!(settings.cool_off_schedule().count(), 0);
    }

    /// Validates growth is multiplicative and cumulative.
    ///
    /// Assertions:
    /// - Confirms the third retry waits 400ms for 100ms and factor 2.0.
    /// - Confirms retry 0 reads as the first retry.
    #[test]
    fn test_cool_off_growth_is_multiplicative() {
        let settings = RetrySettings::new(4, Duration::from_millis(100), 2.0).unwrap();
        assert_eq!(settings.cool_off_for_retry(0), Duration::from_millis(100));
        assert_eq!(settings.cool_off_for_retry(1), Duration::from_millis(100));
        assert_eq!(settings.cool_off_for_retry(2), Duration::from_millis(200));
        assert_eq!(settings.cool_off_for_retry(3), Duration::from_millis(400));
        let schedule: Vec<_> = settings.cool_off_schedule().collect();
        assert_eq!(
            schedule,
            vec![Duration::from_millis(100), Duration::from_millis(200), Duration::from_millis(400)]
        );
    }

    #[test]
    fn test_factor_below_one_shrinks() {
        let settings = RetrySettings::new(3, Duration::from_millis(100), 0.5).unwrap();
        assert_eq!(settings.cool_off_for_retry(2), Duration::from_millis(50));
        assert_eq!(settings.cool_off_for_retry(3), Duration::from_millis(25));
    }

    #[test]
    fn test_zero_cool_off_stays_zero() {
        let settings = RetrySettings::constant(5, Duration::ZERO);
        assert!(settings.cool_off_schedule().all(|delay| delay.is_zero()));
    }

    #[test]
    fn test_growth_saturates() {
        let settings = RetrySettings::new(2, Duration::from_secs(u64::MAX / 2), 1e12).unwrap();
        assert_eq!(settings.next_cool_off(settings.cool_off_period()), Duration::MAX);
    }

    #[test]
    fn test_builder() {
        let settings = RetrySettings::builder().retry_count(5).cool_off_millis(20).factor(1.5).build().unwrap();
        assert_eq!(settings, RetrySettings::new(5, Duration::from_millis(20), 1.5).unwrap());
        assert!(RetrySettings::builder().factor(0.0).build().is_err());
    }

    #[test]
    fn test_serde_uses_millis() {
        let settings = RetrySettings::new(4, Duration::from_millis(250), 2.0).unwrap();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json, serde_json::json!({"retry_count": 4, "cool_off_ms": 250, "cool_off_factor": 2.0}));

        let partial: RetrySettings = serde_json::from_str(r#"{"retry_count": 7}"#).unwrap();
        assert_eq!(partial.retry_count(), 7);
        assert_eq!(partial.cool_off_period(), Duration::from_millis(100));
    }
}
