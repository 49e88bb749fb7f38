//! `Outcome<T>`: the fallible value every wrapped operation returns.

use super::routines;
use crate::error::{ErrorKind, ErrorResult};

static SUCCESS_DETAILS: ErrorResult = ErrorResult::SUCCESS;

/// Either a value, or the classified reason there is none.
///
/// A `Success` always holds a usable `T`; a `Failure` never does, so there is
/// no way to read a value without checking the tag first.
#[derive(Debug, Clone)]
#[must_use]
pub enum Outcome<T> {
    Success(T),
    Failure(ErrorResult),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(details: ErrorResult) -> Self {
        debug_assert!(details.is_failure(), "a failure outcome needs a failure kind");
        Outcome::Failure(details)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The success marker or the failure details.
    pub fn details(&self) -> &ErrorResult {
        match self {
            Outcome::Success(_) => &SUCCESS_DETAILS,
            Outcome::Failure(details) => details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.details().kind()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, ErrorResult> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(details) => Err(details),
        }
    }

    /// Drop the value, keep only the status.
    pub fn into_error_result(self) -> ErrorResult {
        match self {
            Outcome::Success(_) => ErrorResult::SUCCESS,
            Outcome::Failure(details) => details,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(details) => Outcome::Failure(details),
        }
    }

    /// Run `f` on the value when this is a success. A failure short-circuits
    /// with its original details; an error returned by `f` is classified.
    pub fn on_success<U, E, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Result<U, E>,
        E: Into<anyhow::Error>,
    {
        routines::on_success(Some(self), Some(f))
    }

    pub fn on_success_result<F>(self, f: F) -> ErrorResult
    where
        F: FnOnce(T) -> ErrorResult,
    {
        routines::on_success_result(Some(self), Some(f))
    }

    /// Recover from a failure. A success passes through without calling `f`.
    pub fn on_failure<E, F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(ErrorResult) -> Result<T, E>,
        E: Into<anyhow::Error>,
    {
        routines::on_failure(Some(self), Some(f))
    }

    pub fn on_failure_result<F>(self, f: F) -> ErrorResult
    where
        F: FnOnce(ErrorResult) -> ErrorResult,
    {
        routines::on_failure_result(Some(self), Some(f))
    }
}

impl<T> From<Result<T, ErrorResult>> for Outcome<T> {
    fn from(result: Result<T, ErrorResult>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(details) => Outcome::Failure(details),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, ErrorResult> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}
