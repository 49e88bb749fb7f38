// FILE: src/safety/mod.rs
//! The fallible-operation protocol.
//!
//! Every filesystem and clipboard call in the crate goes through these
//! routines, so failures come back as data (`Outcome` / `ErrorResult`).

pub mod outcome;
pub mod reporter;
pub mod routines;

pub use outcome::Outcome;
pub use reporter::{report_error, DefaultExceptionReporter, ExceptionReporter};
pub use routines::{
    on_failure, on_failure_async, on_failure_result, on_failure_result_async, on_success,
    on_success_async, on_success_result, on_success_result_async, try_wrap, try_wrap_async, wrap,
    wrap_action, wrap_action_async, wrap_async, wrap_async_with, wrap_cancellable, wrap_with,
    NULL_DELEGATE,
};
