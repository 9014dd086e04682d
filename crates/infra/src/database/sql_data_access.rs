//! SQL data-access handler
//!
//! Runs a provider call under the retry executor. Errors come back from the
//! provider as codes plus text; the handler classifies them with its
//! [`ProviderErrorCodes`] table before the executor decides whether to
//! retry, so deadlocks and timeouts are retried while constraint failures
//! and unknown codes abort on the spot.

use std::future::Future;

use backstop_common::{
    classify_provider_error, Clock, ProviderError, ProviderErrorCodes, ProviderFailure,
    RetryExecutor, RetryOutcome, RetrySettings, SystemClock,
};
use tracing::debug;

use crate::config::DataAccessConfig;
use crate::error::InfraResult;

pub struct SqlDataAccessHandler<C = SystemClock> {
    executor: RetryExecutor<C>,
    codes: ProviderErrorCodes,
}

impl SqlDataAccessHandler<SystemClock> {
    /// Build a handler from loaded configuration.
    ///
    /// # Errors
    /// Returns `InfraError` if the configuration does not validate.
    pub fn new(config: &DataAccessConfig) -> InfraResult<Self> {
        config.validate()?;
        let codes = config.error_codes()?;
        debug!(
            vendor = %codes.vendor,
            retry_count = config.retry.retry_count(),
            "Data-access handler configured"
        );
        Ok(Self { executor: RetryExecutor::new(config.retry.clone()), codes })
    }
}

impl<C: Clock> SqlDataAccessHandler<C> {
    pub fn with_clock(settings: RetrySettings, codes: ProviderErrorCodes, clock: C) -> Self {
        Self { executor: RetryExecutor::with_clock(settings, clock), codes }
    }

    pub fn codes(&self) -> &ProviderErrorCodes {
        &self.codes
    }

    pub fn executor(&self) -> &RetryExecutor<C> {
        &self.executor
    }

    /// Run a provider call until it succeeds or the executor gives up.
    ///
    /// `descriptor` is rendered only if the call ultimately fails.
    pub async fn execute<D, F, Fut, T, E>(
        &self,
        descriptor: D,
        operation: F,
    ) -> Result<T, ProviderFailure>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ProviderError,
    {
        self.execute_with_outcome(descriptor, operation).await.into_result()
    }

    pub async fn execute_with_outcome<D, F, Fut, T, E>(
        &self,
        descriptor: D,
        mut operation: F,
    ) -> RetryOutcome<T>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ProviderError,
    {
        let codes = &self.codes;
        self.executor
            .execute_with_outcome(descriptor, || {
                let call = operation();
                async move { call.await.map_err(|err| classify_provider_error(codes, err)) }
            })
            .await
    }

    /// Blocking twin of [`execute`](Self::execute).
    pub fn execute_blocking<D, F, T, E>(
        &self,
        descriptor: D,
        mut operation: F,
    ) -> Result<T, ProviderFailure>
    where
        D: FnOnce() -> String,
        F: FnMut() -> Result<T, E>,
        E: ProviderError,
    {
        self.executor.execute_blocking(descriptor, || {
            operation().map_err(|err| classify_provider_error(&self.codes, err))
        })
    }
}
