//! Retry executor for guarded operations
//!
//! The executor invokes a caller-supplied operation until it succeeds, fails
//! with a failure [`classify`](crate::failure::classify) says not to retry,
//! or uses up its attempt budget. Every failure is folded into the taxonomy
//! via `Into<Failure>` and kept, oldest first, in the [`ProviderFailure`]
//! the executor returns when it gives up.
//!
//! Waits happen only between attempts: `cool_off`, then `cool_off * factor`,
//! then `cool_off * factor^2`, and so on. Nothing is slept before the first
//! attempt or after the last one.
//!
//! ```rust,ignore
//! let executor = RetryExecutor::new(RetrySettings::new(3, Duration::from_millis(100), 2.0)?);
//! let orders = executor
//!     .execute(|| format!("load_orders(customer={id})"), || repository.load_orders(id))
//!     .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::settings::RetrySettings;
use crate::failure::{AttemptRecord, Failure, FailureReason, ProviderFailure, RetryPolicy};
use crate::time::{Clock, SystemClock};

/// Where a retry sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    Attempting,
    Retrying,
    Success,
    Aborted,
    Exhausted,
    Cancelled,
}

impl From<FailureReason> for RetryState {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::Aborted => Self::Aborted,
            FailureReason::Exhausted => Self::Exhausted,
            FailureReason::Cancelled => Self::Cancelled,
        }
    }
}

/// Result of a retry sequence plus what it took to get there.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, ProviderFailure>,
    /// Number of times the operation was invoked
    pub attempts: u32,
    /// Every cool-off actually waited, in order
    pub delays: Vec<Duration>,
    pub total_delay: Duration,
    pub final_state: RetryState,
}

impl<T> RetryOutcome<T> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> Result<T, ProviderFailure> {
        self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Number of waits between attempts.
    pub fn retries(&self) -> usize {
        self.delays.len()
    }
}

/// What the loop does after a failed attempt.
enum Step {
    Retry(Duration),
    Stop(FailureReason),
}

/// Per-call bookkeeping shared by the async and blocking loops.
///
/// Owned by exactly one call and never shared.
struct RetryRun<'a, D> {
    settings: &'a RetrySettings,
    descriptor: Option<D>,
    attempt: u32,
    cool_off: Duration,
    records: Vec<AttemptRecord>,
    delays: Vec<Duration>,
    state: RetryState,
}

impl<'a, D> RetryRun<'a, D>
where
    D: FnOnce() -> String,
{
    fn new(settings: &'a RetrySettings, descriptor: D) -> Self {
        Self {
            settings,
            descriptor: Some(descriptor),
            attempt: 0,
            cool_off: settings.cool_off_period(),
            records: Vec::new(),
            delays: Vec::new(),
            state: RetryState::Idle,
        }
    }

    fn has_budget(&self) -> bool {
        self.attempt < self.settings.retry_count()
    }

    fn begin(&mut self) {
        self.attempt += 1;
        self.state = RetryState::Attempting;
        debug!(
            attempt = self.attempt,
            max_attempts = self.settings.retry_count(),
            "Invoking guarded operation"
        );
    }

    fn on_failure(&mut self, failure: Failure, at: DateTime<Utc>) -> Step {
        let kind = failure.kind();
        let policy = failure.retry_policy();
        let message = failure.to_string();
        self.records.push(AttemptRecord::new(self.attempt, failure, at));

        match policy {
            RetryPolicy::Abort => {
                self.state = RetryState::Aborted;
                error!(
                    attempt = self.attempt,
                    kind = kind.as_str(),
                    recoverability = kind.recoverability().as_str(),
                    error = %message,
                    "Guarded operation failed with a non-retryable failure, aborting"
                );
                Step::Stop(FailureReason::Aborted)
            }
            RetryPolicy::Retry if !self.has_budget() => {
                self.state = RetryState::Exhausted;
                error!(
                    attempts = self.attempt,
                    kind = kind.as_str(),
                    total_delay_ms = self.total_delay().as_millis() as u64,
                    error = %message,
                    "All retry attempts failed"
                );
                Step::Stop(FailureReason::Exhausted)
            }
            RetryPolicy::Retry => {
                let delay = self.cool_off;
                self.cool_off = self.settings.next_cool_off(delay);
                self.state = RetryState::Retrying;
                warn!(
                    attempt = self.attempt,
                    max_attempts = self.settings.retry_count(),
                    delay_ms = delay.as_millis() as u64,
                    kind = kind.as_str(),
                    recoverability = kind.recoverability().as_str(),
                    error = %message,
                    "Retry attempt failed, backing off"
                );
                Step::Retry(delay)
            }
        }
    }

    fn slept(&mut self, delay: Duration) {
        self.delays.push(delay);
    }

    fn total_delay(&self) -> Duration {
        self.delays.iter().copied().fold(Duration::ZERO, Duration::saturating_add)
    }

    fn succeed<T>(mut self, value: T) -> RetryOutcome<T> {
        self.state = RetryState::Success;
        if self.attempt > 1 {
            info!(
                attempts = self.attempt,
                total_delay_ms = self.total_delay().as_millis() as u64,
                "Guarded operation succeeded after retries"
            );
        }
        self.finish(Ok(value))
    }

    fn fail<T>(mut self, reason: FailureReason) -> RetryOutcome<T> {
        self.state = reason.into();
        if reason == FailureReason::Cancelled {
            warn!(attempts = self.attempt, "Retry sequence cancelled");
        } else if self.attempt == 0 {
            error!(max_attempts = self.settings.retry_count(), "Retry budget is empty");
        }
        let descriptor = self.descriptor.take().map(|describe| describe());
        let records = std::mem::take(&mut self.records);
        let failure =
            ProviderFailure::new(reason, descriptor, records).with_total_delay(self.total_delay());
        self.finish(Err(failure))
    }

    fn finish<T>(self, result: Result<T, ProviderFailure>) -> RetryOutcome<T> {
        let total_delay = self.total_delay();
        RetryOutcome {
            result,
            attempts: self.attempt,
            delays: self.delays,
            total_delay,
            final_state: self.state,
        }
    }
}

/// Drives a guarded operation through the retry loop
#[derive(Debug, Clone)]
pub struct RetryExecutor<C = SystemClock> {
    settings: RetrySettings,
    clock: C,
}

impl RetryExecutor<SystemClock> {
    pub fn new(settings: RetrySettings) -> Self {
        Self { settings, clock: SystemClock }
    }
}

impl<C: Clock> RetryExecutor<C> {
    pub fn with_clock(settings: RetrySettings, clock: C) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run `operation` until it succeeds or the executor gives up.
    ///
    /// `descriptor` names the call for diagnostics. It is evaluated at most
    /// once, and only when a [`ProviderFailure`] is built.
    #[instrument(name = "retry.execute", skip_all, fields(max_attempts = self.settings.retry_count()))]
    pub async fn execute<D, F, Fut, T, E>(
        &self,
        descriptor: D,
        operation: F,
    ) -> Result<T, ProviderFailure>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        self.run(descriptor, operation, None).await.into_result()
    }

    /// Like [`execute`](Self::execute) but also report attempts and delays.
    pub async fn execute_with_outcome<D, F, Fut, T, E>(
        &self,
        descriptor: D,
        operation: F,
    ) -> RetryOutcome<T>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        self.run(descriptor, operation, None).await
    }

    /// Like [`execute`](Self::execute), stopping early when `token` fires.
    ///
    /// The token is checked before every attempt and raced against every
    /// cool-off. An attempt already in flight is never interrupted.
    #[instrument(name = "retry.execute", skip_all, fields(max_attempts = self.settings.retry_count()))]
    pub async fn execute_with_cancellation<D, F, Fut, T, E>(
        &self,
        token: &CancellationToken,
        descriptor: D,
        operation: F,
    ) -> Result<T, ProviderFailure>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        self.run(descriptor, operation, Some(token)).await.into_result()
    }

    async fn run<D, F, Fut, T, E>(
        &self,
        descriptor: D,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> RetryOutcome<T>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        let mut run = RetryRun::new(&self.settings, descriptor);

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return run.fail(FailureReason::Cancelled);
            }
            if !run.has_budget() {
                return run.fail(FailureReason::Exhausted);
            }

            run.begin();
            let error = match operation().await {
                Ok(value) => return run.succeed(value),
                Err(error) => error,
            };

            match run.on_failure(error.into(), self.clock.utc_now()) {
                Step::Stop(reason) => return run.fail(reason),
                Step::Retry(delay) => {
                    if let Some(token) = cancel {
                        tokio::select! {
                            biased;
                            _ = token.cancelled() => return run.fail(FailureReason::Cancelled),
                            _ = self.clock.sleep(delay) => {}
                        }
                    } else {
                        self.clock.sleep(delay).await;
                    }
                    run.slept(delay);
                }
            }
        }
    }

    /// Synchronous twin of [`execute`](Self::execute).
    ///
    /// Runs `operation` on the calling thread and blocks through every
    /// cool-off. Returns only once the sequence has finished.
    #[instrument(name = "retry.execute_blocking", skip_all, fields(max_attempts = self.settings.retry_count()))]
    pub fn execute_blocking<D, F, T, E>(&self, descriptor: D, operation: F) -> Result<T, ProviderFailure>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Result<T, E>,
        E: Into<Failure>,
    {
        self.execute_blocking_with_outcome(descriptor, operation).into_result()
    }

    pub fn execute_blocking_with_outcome<D, F, T, E>(
        &self,
        descriptor: D,
        mut operation: F,
    ) -> RetryOutcome<T>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Result<T, E>,
        E: Into<Failure>,
    {
        let mut run = RetryRun::new(&self.settings, descriptor);

        while run.has_budget() {
            run.begin();
            let error = match operation() {
                Ok(value) => return run.succeed(value),
                Err(error) => error,
            };

            match run.on_failure(error.into(), self.clock.utc_now()) {
                Step::Stop(reason) => return run.fail(reason),
                Step::Retry(delay) => {
                    self.clock.sleep_blocking(delay);
                    run.slept(delay);
                }
            }
        }

        run.fail(FailureReason::Exhausted)
    }
}

/// Run `operation` once under `settings` on the system clock.
pub async fn execute<D, F, Fut, T, E>(
    settings: &RetrySettings,
    descriptor: D,
    operation: F,
) -> Result<T, ProviderFailure>
where
    D: FnOnce() -> String,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Failure>,
{
    RetryExecutor::new(settings.clone()).execute(descriptor, operation).await
}

#[cfg(test)]
mod tests {
    //! Unit tests for the retry loop
    //!
    //! All tests run on `MockClock`, so recorded sleeps are exact and no
    //! test waits in real time.

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::failure::{FailureKind, UniqueKeyViolation};
    use crate::testing::MockClock;

    fn mock_executor(
        retry_count: u32,
        cool_off_ms: u64,
        factor: f64,
    ) -> (RetryExecutor<MockClock>, MockClock) {
        let clock = MockClock::new();
        let settings =
            RetrySettings::new(retry_count, Duration::from_millis(cool_off_ms), factor).unwrap();
        (RetryExecutor::with_clock(settings, clock.clone()), clock)
    }

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_millis(*v)).collect()
    }

    /// Validates a permanently retryable failure uses the whole budget.
    ///
    /// Assertions:
    /// - Confirms the operation ran exactly `retry_count` times.
    /// - Confirms every failure was collected with its ordinal.
    /// - Confirms the reason is `Exhausted`.
    #[tokio::test]
    async fn test_retryable_failure_exhausts_budget() {
        for retry_count in 1..=5u32 {
            let (executor, _clock) = mock_executor(retry_count, 10, 1.0);
            let calls = Arc::new(AtomicU32::new(0));
            let counter = calls.clone();

            let err = executor
                .execute(
                    || "always_deadlocks".to_string(),
                    || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        async { Err::<(), _>(Failure::deadlocked("victim")) }
                    },
                )
                .await
                .unwrap_err();

            assert_eq!(calls.load(Ordering::SeqCst), retry_count);
            assert_eq!(err.reason(), FailureReason::Exhausted);
            assert_eq!(err.attempts().len() as u32, retry_count);
            let ordinals: Vec<u32> = err.attempts().iter().map(|r| r.attempt).collect();
            assert_eq!(ordinals, (1..=retry_count).collect::<Vec<_>>());
            assert_eq!(err.to_string(), "Retry count exceeded. always_deadlocks");
        }
    }

    /// Validates non-retryable kinds abort on the first attempt.
    #[tokio::test]
    async fn test_non_retryable_failure_aborts_immediately() {
        let failures: [fn() -> Failure; 8] = [
            || Failure::duplicate_key(UniqueKeyViolation::new("T", "C", "v"), "dup"),
            || Failure::data_updated("Order", "1"),
            || Failure::no_data("empty"),
            || Failure::authorization("denied"),
            || Failure::invalid_data("bad"),
            || Failure::truncated_data("long"),
            || Failure::transaction_aborted("rolled back"),
            || Failure::unclassified_msg("who knows"),
        ];

        for make in failures {
            let (executor, clock) = mock_executor(5, 10, 2.0);
            let calls = Arc::new(AtomicU32::new(0));
            let counter = calls.clone();

            let err = executor
                .execute(
                    || "op".to_string(),
                    || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        async move { Err::<(), _>(make()) }
                    },
                )
                .await
                .unwrap_err();

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(err.reason(), FailureReason::Aborted);
            assert_eq!(err.attempts().len(), 1);
            assert_eq!(clock.sleep_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_foreign_key_violation_is_not_retried() {
        let (executor, clock) = mock_executor(3, 10, 1.0);
        let outcome = executor
            .execute_with_outcome(
                || "insert_line".to_string(),
                || async { Err::<(), _>(Failure::foreign_key(Default::default(), "fk")) },
            )
            .await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.final_state, RetryState::Aborted);
        assert_eq!(clock.sleep_count(), 0);
    }

    /// Validates backoff grows multiplicatively between attempts only.
    ///
    /// Assertions:
    /// - Confirms four attempts produce exactly three sleeps.
    /// - Confirms the sleeps are 100ms, 200ms and 400ms.
    #[tokio::test]
    async fn test_backoff_is_multiplicative_and_cumulative() {
        let (executor, clock) = mock_executor(4, 100, 2.0);
        let outcome = executor
            .execute_with_outcome(|| "op".to_string(), || async { Err::<(), _>(Failure::timeout("slow")) })
            .await;

        assert_eq!(outcome.attempts, 4);
        assert_eq!(clock.sleeps(), ms(&[100, 200, 400]));
        assert_eq!(outcome.delays, ms(&[100, 200, 400]));
        assert_eq!(outcome.total_delay, Duration::from_millis(700));
        assert_eq!(outcome.final_state, RetryState::Exhausted);
        assert_eq!(
            outcome.delays[2],
            executor.settings().cool_off_for_retry(3),
            "third retry waits cool_off * factor^2"
        );
    }

    #[tokio::test]
    async fn test_factor_below_one_shrinks_backoff() {
        let (executor, clock) = mock_executor(4, 80, 0.5);
        let _ = executor
            .execute(|| "op".to_string(), || async { Err::<(), _>(Failure::timeout("slow")) })
            .await;
        assert_eq!(clock.sleeps(), ms(&[80, 40, 20]));
    }

    #[tokio::test]
    async fn test_zero_cool_off_has_no_growth() {
        let (executor, clock) = mock_executor(4, 0, 1.0);
        let _ = executor
            .execute(|| "op".to_string(), || async { Err::<(), _>(Failure::deadlocked("x")) })
            .await;
        assert_eq!(clock.sleeps(), vec![Duration::ZERO; 3]);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }

    /// Validates success on the second of three attempts.
    ///
    /// Assertions:
    /// - Confirms the value is returned.
    /// - Confirms exactly one cool-off was waited.
    #[tokio::test]
    async fn test_success_on_second_attempt() {
        let (executor, clock) = mock_executor(3, 50, 2.0);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let outcome = executor
            .execute_with_outcome(
                || "op".to_string(),
                || {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if attempt == 1 {
                            Err(Failure::timeout("slow"))
                        } else {
                            Ok(attempt * 10)
                        }
                    }
                },
            )
            .await;

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.retries(), 1);
        assert_eq!(outcome.final_state, RetryState::Success);
        assert_eq!(clock.sleeps(), ms(&[50]));
        assert_eq!(outcome.into_result().unwrap(), 20);
    }

    /// Validates the descriptor is only rendered on the failure path.
    #[tokio::test]
    async fn test_descriptor_not_evaluated_on_success() {
        let (executor, _clock) = mock_executor(3, 0, 1.0);
        let rendered = Arc::new(AtomicU32::new(0));
        let counter = rendered.clone();

        let value = executor
            .execute(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "expensive".to_string()
                },
                || async { Ok::<_, Failure>("done") },
            )
            .await
            .unwrap();

        assert_eq!(value, "done");
        assert_eq!(rendered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_budget_never_invokes_operation() {
        let (executor, _clock) = mock_executor(0, 10, 1.0);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = executor
            .execute(
                || "never".to_string(),
                || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, Failure>(()) }
                },
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(err.reason(), FailureReason::Exhausted);
        assert!(err.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_failures_keep_order() {
        let (executor, _clock) = mock_executor(3, 1, 1.0);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = executor
            .execute(
                || "mixed".to_string(),
                || {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        Err::<(), _>(match attempt {
                            0 => Failure::timeout("first"),
                            1 => Failure::deadlocked("second"),
                            _ => Failure::no_data("third"),
                        })
                    }
                },
            )
            .await
            .unwrap_err();

        let kinds: Vec<FailureKind> = err.failures().map(Failure::kind).collect();
        assert_eq!(kinds, vec![FailureKind::Timeout, FailureKind::Deadlocked, FailureKind::NoData]);
        assert_eq!(err.reason(), FailureReason::Aborted);
        assert!(err.is_user_recoverable());
    }

    /// Validates cancellation before the next attempt.
    ///
    /// Assertions:
    /// - Confirms the operation is not invoked again once cancelled.
    /// - Confirms the reason is `Cancelled` and earlier failures are kept.
    #[tokio::test]
    async fn test_cancellation_stops_before_next_attempt() {
        let (executor, _clock) = mock_executor(10, 5, 1.0);
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let trigger = token.clone();

        let err = executor
            .execute_with_cancellation(
                &token,
                || "cancellable".to_string(),
                || {
                    if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                        trigger.cancel();
                    }
                    async { Err::<(), _>(Failure::timeout("slow")) }
                },
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(err.reason(), FailureReason::Cancelled);
        assert_eq!(err.attempts().len(), 2);
        assert_eq!(err.to_string(), "Operation cancelled. cancellable");
    }

    #[tokio::test]
    async fn test_cancelled_token_prevents_first_attempt() {
        let (executor, _clock) = mock_executor(3, 5, 1.0);
        let token = CancellationToken::new();
        token.cancel();

        let err = executor
            .execute_with_cancellation(&token, || "op".to_string(), || async { Ok::<_, Failure>(1) })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), FailureReason::Cancelled);
        assert!(err.attempts().is_empty());
    }

    /// Validates the blocking twin follows the same rules.
    #[test]
    fn test_blocking_execution() {
        let (executor, clock) = mock_executor(3, 100, 2.0);
        let mut calls = 0;

        let value = executor
            .execute_blocking(
                || "blocking".to_string(),
                || {
                    calls += 1;
                    if calls < 3 {
                        Err(Failure::deadlocked("victim"))
                    } else {
                        Ok("row")
                    }
                },
            )
            .unwrap();

        assert_eq!(value, "row");
        assert_eq!(calls, 3);
        assert_eq!(clock.sleeps(), ms(&[100, 200]));
    }

    #[test]
    fn test_blocking_exhaustion() {
        let (executor, clock) = mock_executor(2, 10, 3.0);
        let outcome = executor.execute_blocking_with_outcome(
            || "blocking".to_string(),
            || Err::<(), _>(Failure::timeout("slow")),
        );
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.final_state, RetryState::Exhausted);
        assert_eq!(clock.sleeps(), ms(&[10]));
        assert_eq!(outcome.into_result().unwrap_err().total_delay(), Duration::from_millis(10));
    }

    /// Validates errors convert through `Into<Failure>`.
    #[tokio::test]
    async fn test_common_error_converts() {
        let (executor, _clock) = mock_executor(2, 1, 1.0);
        let err = executor
            .execute(
                || "op".to_string(),
                || async { Err::<(), _>(crate::error::CommonError::timeout("q", Duration::from_secs(1))) },
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), FailureReason::Exhausted);
        assert!(err.contains_kind(FailureKind::Timeout));
    }

    #[tokio::test]
    async fn test_attempt_timestamps_follow_clock() {
        let (executor, _clock) = mock_executor(3, 1_000, 1.0);
        let err = executor
            .execute(|| "op".to_string(), || async { Err::<(), _>(Failure::timeout("slow")) })
            .await
            .unwrap_err();
        let stamps: Vec<_> = err.attempts().iter().map(|r| r.at).collect();
        assert_eq!((stamps[1] - stamps[0]).num_milliseconds(), 1_000);
        assert_eq!((stamps[2] - stamps[1]).num_milliseconds(), 1_000);
    }
}
