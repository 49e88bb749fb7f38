//! clipcanvas: content classification for clipboard and filesystem items.
//!
//! Pieces, bottom-up:
//! - Safety (the Outcome / ErrorResult protocol every fallible call returns)
//! - Storage (result-wrapped filesystem primitives, trash, text sniffing)
//! - Reference (indirection marker files that point at other items)
//! - Classifier (decides how an item or clipboard payload is to be shown)
//! - Watcher (optional: keeps a classification cache fresh)

pub mod classifier;
pub mod config;
pub mod core;
pub mod error;
pub mod reference;
pub mod safety;
pub mod storage;
pub mod watcher;
pub mod workspace;

pub use classifier::{
    ClassificationCache, Classifier, ClassifierSettings, ClassifyInput, ClipboardPayload, ClipboardSnapshot,
    ContentType, WebViewMode,
};
pub use config::Settings;
pub use error::{CanvasError, ErrorKind, ErrorResult, Result};
pub use reference::{ReferenceRecord, ReferenceState, ResolvedReference};
pub use safety::Outcome;
pub use storage::StorageItem;
pub use watcher::CacheWatcher;
pub use workspace::{list_workspace, WorkspaceEntry};
