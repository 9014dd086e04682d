//! Scripted guarded operations

use std::collections::VecDeque;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::failure::Failure;

/// Replays a fixed sequence of results, one per invocation.
///
/// Clones share the script and the call counter, so a clone can be moved
/// into the operation closure while the test keeps the original for
/// assertions. Once the script runs out every further call fails with an
/// unclassified failure.
#[derive(Debug)]
pub struct ScriptedOperation<T> {
    script: Arc<Mutex<VecDeque<Result<T, Failure>>>>,
    calls: Arc<AtomicU32>,
}

impl<T> Clone for ScriptedOperation<T> {
    fn clone(&self) -> Self {
        Self { script: Arc::clone(&self.script), calls: Arc::clone(&self.calls) }
    }
}

impl<T> ScriptedOperation<T> {
    pub fn new(script: impl IntoIterator<Item = Result<T, Failure>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fail with each of `failures` in turn, then succeed with `value`.
    pub fn failing_then(failures: Vec<Failure>, value: T) -> Self {
        Self::new(failures.into_iter().map(Err).chain(std::iter::once(Ok(value))))
    }

    /// Fail `times` times with whatever `make` builds.
    pub fn always_failing(times: usize, make: impl Fn() -> Failure) -> Self {
        Self::new((0..times).map(|_| Err(make())))
    }

    /// Run one step of the script.
    pub fn call(&self) -> Result<T, Failure> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(Failure::unclassified_msg(format!("script exhausted at call {attempt}")))
        })
    }

    /// Async flavour of [`call`](Self::call), for the async executor.
    pub fn call_async(&self) -> Ready<Result<T, Failure>> {
        ready(self.call())
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Script entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}
