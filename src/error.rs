//! Error types for clipcanvas
//!
//! Two layers live here:
//! - `CanvasError` is the native failure raised by leaf code (I/O, JSON, watcher).
//! - `ErrorResult` is the classified value every public operation hands back.
//!   It is plain data: callers branch on `kind()`, never on the message.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Item not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Referenced item not found: {0}")]
    ReferencedItemNotFound(String),

    #[error("Item already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Access denied: {}", .0.display())]
    AccessDenied(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, CanvasError>;

/// Closed taxonomy of operation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Success,
    Cancel,
    NotFound,
    /// The marker is readable but the item it points at is gone.
    ReferencedItemNotFound,
    AccessUnauthorized,
    InvalidArgument,
    InvalidOperation,
    AlreadyExists,
    Unknown,
}

impl ErrorKind {
    /// Whether offering the user a retry makes sense for this kind.
    pub fn is_retriable(self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::ReferencedItemNotFound | ErrorKind::AccessUnauthorized
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Success => "Success",
            ErrorKind::Cancel => "Cancel",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ReferencedItemNotFound => "ReferencedItemNotFound",
            ErrorKind::AccessUnauthorized => "AccessUnauthorized",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InvalidOperation => "InvalidOperation",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Classified outcome of an operation: kind, optional cause, diagnostic message.
///
/// Cloning is cheap; the cause is shared. There is no conversion to `bool`:
/// check [`ErrorResult::is_success`].
#[derive(Debug, Clone)]
pub struct ErrorResult {
    kind: ErrorKind,
    cause: Option<Arc<anyhow::Error>>,
    message: Cow<'static, str>,
}

impl ErrorResult {
    pub const SUCCESS: ErrorResult =
        ErrorResult::from_static(ErrorKind::Success, "Operation completed successfully");

    pub const CANCEL: ErrorResult =
        ErrorResult::from_static(ErrorKind::Cancel, "The operation was cancelled");

    pub const fn from_static(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            cause: None,
            message: Cow::Borrowed(message),
        }
    }

    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            cause: None,
            message: message.into(),
        }
    }

    pub fn with_cause(
        kind: ErrorKind,
        cause: impl Into<anyhow::Error>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            cause: Some(Arc::new(cause.into())),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.kind == ErrorKind::Success
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancel
    }

    pub fn is_retriable(&self) -> bool {
        self.kind.is_retriable()
    }

    /// True when both results carry the very same underlying cause.
    pub fn shares_cause_with(&self, other: &ErrorResult) -> bool {
        match (&self.cause, &other.cause) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn into_result(self) -> std::result::Result<(), ErrorResult> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl PartialEq for ErrorResult {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl PartialEq<ErrorKind> for ErrorResult {
    fn eq(&self, other: &ErrorKind) -> bool {
        self.kind == *other
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorResult {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|cause| {
            let inner: &(dyn std::error::Error + Send + Sync + 'static) = cause.as_ref();
            inner as &(dyn std::error::Error + 'static)
        })
    }
}
