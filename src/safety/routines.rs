//! Wrapping routines and the success/failure combinators.
//!
//! Synchronous and suspending families are kept apart: `wrap*` / `on_*` never
//! touch a future, `*_async` never block.

use super::outcome::Outcome;
use super::reporter::{DefaultExceptionReporter, ExceptionReporter};
use crate::error::{ErrorKind, ErrorResult};
use std::any::type_name;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub const NULL_DELEGATE: ErrorResult =
    ErrorResult::from_static(ErrorKind::InvalidArgument, "Passed-in function delegate is null");

const SUCCESS_WITHOUT_VALUE: ErrorResult =
    ErrorResult::from_static(ErrorKind::Unknown, "Operation reported success without producing a value");

fn failed<T>(details: ErrorResult) -> Outcome<T> {
    if details.is_success() {
        return Outcome::Failure(SUCCESS_WITHOUT_VALUE);
    }
    Outcome::Failure(details)
}

// ---------- wrap ----------

pub fn wrap<T, E, F>(f: F) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<anyhow::Error>,
{
    wrap_with(f, &DefaultExceptionReporter)
}

pub fn wrap_with<T, E, F>(f: F, reporter: &dyn ExceptionReporter) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<anyhow::Error>,
{
    match f() {
        Ok(value) => Outcome::Success(value),
        Err(e) => failed(reporter.report(e.into(), Some(type_name::<T>()))),
    }
}

/// Like [`wrap`], for a delegate that may be absent.
pub fn try_wrap<T, E, F>(f: Option<F>) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<anyhow::Error>,
{
    match f {
        Some(f) => wrap(f),
        None => Outcome::Failure(NULL_DELEGATE),
    }
}

/// Wrap an operation that produces no value.
pub fn wrap_action<E, F>(f: F) -> ErrorResult
where
    F: FnOnce() -> Result<(), E>,
    E: Into<anyhow::Error>,
{
    match f() {
        Ok(()) => ErrorResult::SUCCESS,
        Err(e) => DefaultExceptionReporter.report(e.into(), None),
    }
}

// ---------- wrap_async ----------

pub async fn wrap_async<T, E, Fut>(future: Fut) -> Outcome<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    wrap_async_with(future, &DefaultExceptionReporter).await
}

pub async fn wrap_async_with<T, E, Fut>(future: Fut, reporter: &dyn ExceptionReporter) -> Outcome<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    match future.await {
        Ok(value) => Outcome::Success(value),
        Err(e) => failed(reporter.report(e.into(), Some(type_name::<T>()))),
    }
}

pub async fn try_wrap_async<T, E, F, Fut>(f: Option<F>) -> Outcome<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    match f {
        Some(f) => wrap_async(f()).await,
        None => Outcome::Failure(NULL_DELEGATE),
    }
}

pub async fn wrap_action_async<E, Fut>(future: Fut) -> ErrorResult
where
    Fut: Future<Output = Result<(), E>>,
    E: Into<anyhow::Error>,
{
    match future.await {
        Ok(()) => ErrorResult::SUCCESS,
        Err(e) => DefaultExceptionReporter.report(e.into(), None),
    }
}

/// Await `future` unless `token` fires first, in which case the result is the
/// `Cancel` sentinel and the future is dropped.
pub async fn wrap_cancellable<T, E, Fut>(future: Fut, token: &CancellationToken) -> Outcome<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Outcome::Failure(ErrorResult::CANCEL),
        outcome = wrap_async(future) => outcome,
    }
}

// ---------- on_success / on_failure ----------

pub fn on_success<T, U, E, F>(wrapped: Option<Outcome<T>>, f: Option<F>) -> Outcome<U>
where
    F: FnOnce(T) -> Result<U, E>,
    E: Into<anyhow::Error>,
{
    let (Some(wrapped), Some(f)) = (wrapped, f) else {
        return Outcome::Failure(NULL_DELEGATE);
    };
    match wrapped {
        Outcome::Success(value) => wrap(|| f(value)),
        Outcome::Failure(details) => Outcome::Failure(details),
    }
}

pub fn on_success_result<T, F>(wrapped: Option<Outcome<T>>, f: Option<F>) -> ErrorResult
where
    F: FnOnce(T) -> ErrorResult,
{
    let (Some(wrapped), Some(f)) = (wrapped, f) else {
        return NULL_DELEGATE;
    };
    match wrapped {
        Outcome::Success(value) => f(value),
        Outcome::Failure(details) => details,
    }
}

pub fn on_failure<T, E, F>(wrapped: Option<Outcome<T>>, f: Option<F>) -> Outcome<T>
where
    F: FnOnce(ErrorResult) -> Result<T, E>,
    E: Into<anyhow::Error>,
{
    let (Some(wrapped), Some(f)) = (wrapped, f) else {
        return Outcome::Failure(NULL_DELEGATE);
    };
    match wrapped {
        Outcome::Success(value) => Outcome::Success(value),
        Outcome::Failure(details) => wrap(|| f(details)),
    }
}

pub fn on_failure_result<T, F>(wrapped: Option<Outcome<T>>, f: Option<F>) -> ErrorResult
where
    F: FnOnce(ErrorResult) -> ErrorResult,
{
    let (Some(wrapped), Some(f)) = (wrapped, f) else {
        return NULL_DELEGATE;
    };
    match wrapped {
        Outcome::Success(_) => ErrorResult::SUCCESS,
        Outcome::Failure(details) => f(details),
    }
}

// ---------- async combinators ----------

pub async fn on_success_async<T, U, E, W, F, Fut>(wrapped: W, f: F) -> Outcome<U>
where
    W: Future<Output = Outcome<T>>,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<U, E>>,
    E: Into<anyhow::Error>,
{
    match wrapped.await {
        Outcome::Success(value) => wrap_async(f(value)).await,
        Outcome::Failure(details) => Outcome::Failure(details),
    }
}

pub async fn on_success_result_async<T, W, F, Fut>(wrapped: W, f: F) -> ErrorResult
where
    W: Future<Output = Outcome<T>>,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = ErrorResult>,
{
    match wrapped.await {
        Outcome::Success(value) => f(value).await,
        Outcome::Failure(details) => details,
    }
}

pub async fn on_failure_async<T, E, W, F, Fut>(wrapped: W, f: F) -> Outcome<T>
where
    W: Future<Output = Outcome<T>>,
    F: FnOnce(ErrorResult) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<anyhow::Error>,
{
    match wrapped.await {
        Outcome::Success(value) => Outcome::Success(value),
        Outcome::Failure(details) => wrap_async(f(details)).await,
    }
}

pub async fn on_failure_result_async<T, W, F, Fut>(wrapped: W, f: F) -> ErrorResult
where
    W: Future<Output = Outcome<T>>,
    F: FnOnce(ErrorResult) -> Fut,
    Fut: Future<Output = ErrorResult>,
{
    match wrapped.await {
        Outcome::Success(_) => ErrorResult::SUCCESS,
        Outcome::Failure(details) => f(details).await,
    }
}
