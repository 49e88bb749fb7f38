//! Failure classification.
//!
//! A reporter turns a caught native error into an `ErrorResult`. The default
//! reporter walks the whole error chain and the first recognized cause decides
//! the kind; anything unrecognized becomes `Unknown`.

use crate::error::{CanvasError, ErrorKind, ErrorResult};
use std::io;

pub trait ExceptionReporter: Send + Sync {
    /// `expected` is the type name the failed operation was meant to produce, if any.
    fn report(&self, error: anyhow::Error, expected: Option<&'static str>) -> ErrorResult;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExceptionReporter;

impl DefaultExceptionReporter {
    pub fn classify(error: &anyhow::Error) -> ErrorKind {
        for cause in error.chain() {
            if let Some(result) = cause.downcast_ref::<ErrorResult>() {
                return result.kind();
            }
            if let Some(canvas) = cause.downcast_ref::<CanvasError>() {
                if let Some(kind) = classify_canvas(canvas) {
                    return kind;
                }
                continue;
            }
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                if let Some(kind) = classify_io(io_err.kind()) {
                    return kind;
                }
                continue;
            }
            if cause.downcast_ref::<serde_json::Error>().is_some() {
                return ErrorKind::InvalidArgument;
            }
            if let Some(join) = cause.downcast_ref::<tokio::task::JoinError>() {
                if join.is_cancelled() {
                    return ErrorKind::Cancel;
                }
            }
        }
        ErrorKind::Unknown
    }
}

impl ExceptionReporter for DefaultExceptionReporter {
    fn report(&self, error: anyhow::Error, expected: Option<&'static str>) -> ErrorResult {
        // Already classified further down, pass it through untouched.
        let error = match error.downcast::<ErrorResult>() {
            Ok(result) => return result,
            Err(error) => error,
        };

        let kind = Self::classify(&error);
        if kind == ErrorKind::Cancel {
            tracing::debug!("[Safety] Operation cancelled: {:#}", error);
            return ErrorResult::CANCEL;
        }

        let message = match expected {
            Some(type_name) => format!("Failed to produce {}: {:#}", short_type_name(type_name), error),
            None => format!("{:#}", error),
        };
        tracing::debug!("[Safety] Classified failure as {}: {}", kind, message);
        ErrorResult::with_cause(kind, error, message)
    }
}

/// Classify with the default reporter. Used by leaf code outside the wrap routines.
pub fn report_error(error: impl Into<anyhow::Error>) -> ErrorResult {
    DefaultExceptionReporter.report(error.into(), None)
}

fn classify_canvas(error: &CanvasError) -> Option<ErrorKind> {
    match error {
        CanvasError::Io(e) => classify_io(e.kind()),
        CanvasError::Json(_) => Some(ErrorKind::InvalidArgument),
        CanvasError::Watch(_) => None,
        CanvasError::Cancelled => Some(ErrorKind::Cancel),
        CanvasError::NotFound(_) => Some(ErrorKind::NotFound),
        CanvasError::ReferencedItemNotFound(_) => Some(ErrorKind::ReferencedItemNotFound),
        CanvasError::AlreadyExists(_) => Some(ErrorKind::AlreadyExists),
        CanvasError::AccessDenied(_) => Some(ErrorKind::AccessUnauthorized),
        CanvasError::InvalidArgument(_) => Some(ErrorKind::InvalidArgument),
        CanvasError::InvalidOperation(_) => Some(ErrorKind::InvalidOperation),
        CanvasError::State(_) => Some(ErrorKind::InvalidOperation),
    }
}

fn classify_io(kind: io::ErrorKind) -> Option<ErrorKind> {
    match kind {
        io::ErrorKind::NotFound => Some(ErrorKind::NotFound),
        io::ErrorKind::PermissionDenied => Some(ErrorKind::AccessUnauthorized),
        io::ErrorKind::AlreadyExists => Some(ErrorKind::AlreadyExists),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => Some(ErrorKind::InvalidArgument),
        io::ErrorKind::Interrupted => Some(ErrorKind::Cancel),
        _ => None,
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    // "alloc::string::String" -> "String", generics left alone
    match full.find('<') {
        Some(_) => full,
        None => full.rsplit("::").next().unwrap_or(full),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    fn io_error(kind: io::ErrorKind) -> anyhow::Error {
        io::Error::new(kind, "boom").into()
    }

    #[test]
    fn test_io_kinds() {
        assert_eq!(DefaultExceptionReporter::classify(&io_error(io::ErrorKind::NotFound)), ErrorKind::NotFound);
        assert_eq!(
            DefaultExceptionReporter::classify(&io_error(io::ErrorKind::PermissionDenied)),
            ErrorKind::AccessUnauthorized
        );
        assert_eq!(
            DefaultExceptionReporter::classify(&io_error(io::ErrorKind::AlreadyExists)),
            ErrorKind::AlreadyExists
        );
        assert_eq!(DefaultExceptionReporter::classify(&io_error(io::ErrorKind::Other)), ErrorKind::Unknown);
    }

    #[test]
    fn test_chain_is_walked() {
        let err = Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "gone"))
            .context("loading marker")
            .unwrap_err();
        assert_eq!(DefaultExceptionReporter::classify(&err), ErrorKind::NotFound);
    }

    #[test]
    fn test_canvas_errors() {
        let err: anyhow::Error = CanvasError::ReferencedItemNotFound("C:\\missing.jpg".into()).into();
        assert_eq!(DefaultExceptionReporter::classify(&err), ErrorKind::ReferencedItemNotFound);

        let err: anyhow::Error = CanvasError::AccessDenied(PathBuf::from("/root")).into();
        assert_eq!(DefaultExceptionReporter::classify(&err), ErrorKind::AccessUnauthorized);
    }

    #[test]
    fn test_json_is_invalid_argument() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert_eq!(report_error(err).kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_unrecognized_is_unknown_with_message() {
        let result = DefaultExceptionReporter.report(anyhow::anyhow!("weird"), Some("alloc::string::String"));
        assert_eq!(result.kind(), ErrorKind::Unknown);
        assert!(result.message().contains("String"));
        assert!(result.message().contains("weird"));
        assert!(result.cause().is_some());
    }

    #[test]
    fn test_cancel_maps_to_sentinel() {
        let result = report_error(CanvasError::Cancelled);
        assert_eq!(result, ErrorResult::CANCEL);
    }

    #[test]
    fn test_error_result_passes_through() {
        let original = ErrorResult::with_cause(ErrorKind::NotFound, anyhow::anyhow!("x"), "kept");
        let reported = report_error(original.clone());
        assert_eq!(reported, original);
        assert!(reported.shares_cause_with(&original));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let first = report_error(io::Error::new(io::ErrorKind::PermissionDenied, "a"));
        let second = report_error(io::Error::new(io::ErrorKind::PermissionDenied, "b"));
        assert_eq!(first.kind(), second.kind());
    }
}
