// FILE: src/classifier/mod.rs
//! Content classification.
//!
//! `Classifier::classify` is total: every input yields a `ContentType`, and
//! failures come back as `ContentType::Invalid` carrying the classified error.
//! The classifier holds no mutable state; caching is the caller's business
//! (see [`ClassificationCache`]).

pub mod cache;
pub mod clipboard;
pub mod content_type;
pub mod registry;

pub use cache::ClassificationCache;
pub use clipboard::{is_url, is_url_file, ClipboardPayload, ClipboardSnapshot};
pub use content_type::{
    ContentType, WebViewMode, CANNOT_DISPLAY_CONTENT, CANNOT_RECEIVE_CLIPBOARD_DATA, FOLDERS_NOT_SUPPORTED,
    MULTIPLE_ITEMS_NOT_SUPPORTED,
};
pub use registry::{ContentFamily, ExtensionRegistry};

use crate::config::INFINITE_CANVAS_EXTENSION;
use crate::error::{ErrorKind, ErrorResult};
use crate::reference::{self, ReferenceState};
use crate::safety::Outcome;
use crate::storage::{self, text_extraction, StorageItem};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Pasted text becomes Markdown instead of plain Text.
    pub prefer_markdown_over_text: bool,
}

#[derive(Clone, Copy)]
pub enum ClassifyInput<'a> {
    Item(&'a StorageItem),
    Clipboard(&'a dyn ClipboardPayload),
}

pub fn is_workspace_folder(path: &Path) -> bool {
    storage::has_suffix(path, INFINITE_CANVAS_EXTENSION)
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    registry: ExtensionRegistry,
    settings: ClassifierSettings,
}

impl Classifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self {
            registry: ExtensionRegistry::default(),
            settings,
        }
    }

    pub fn with_registry(registry: ExtensionRegistry, settings: ClassifierSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> ClassifierSettings {
        self.settings
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Classify `input`. A present `existing` value is returned as is unless it
    /// is an Invalid that asked to be re-checked.
    pub async fn classify(&self, input: ClassifyInput<'_>, existing: Option<&ContentType>) -> ContentType {
        if let Some(existing) = existing {
            if !existing.needs_reinitialization() {
                return existing.clone();
            }
        }

        match input {
            ClassifyInput::Item(item) => self.classify_item(item).await,
            ClassifyInput::Clipboard(payload) => self.classify_clipboard(payload).await,
        }
    }

    /// Look `path` up on disk, then classify it.
    pub async fn classify_path(&self, path: &Path) -> ContentType {
        match StorageItem::from_path(path).await {
            Outcome::Success(item) => self.classify_item(&item).await,
            Outcome::Failure(details) => {
                let retry = details.is_retriable();
                ContentType::invalid(details, retry)
            }
        }
    }

    pub async fn classify_item(&self, item: &StorageItem) -> ContentType {
        let path = match item {
            StorageItem::Folder(path) => {
                if is_workspace_folder(path) {
                    return ContentType::InfiniteCanvas;
                }
                tracing::debug!("[Classifier] {} is a plain folder", path.display());
                return ContentType::invalid(FOLDERS_NOT_SUPPORTED, false);
            }
            StorageItem::File(path) => path,
        };

        let Some(resolved) = reference::resolve(path).await else {
            return self.classify_file(path).await;
        };

        match resolved.state() {
            ReferenceState::Resolved => match resolved.into_target() {
                Some(StorageItem::File(target)) => self.classify_file(&target).await,
                _ => ContentType::invalid(CANNOT_DISPLAY_CONTENT, false),
            },
            ReferenceState::TargetIsFolder => ContentType::invalid(FOLDERS_NOT_SUPPORTED, false),
            ReferenceState::TargetMissing | ReferenceState::Failed => {
                tracing::debug!("[Classifier] {}: {}", path.display(), resolved.last_error());
                ContentType::invalid(resolved.last_error().clone(), true)
            }
            ReferenceState::MarkerMissingTarget | ReferenceState::MarkerCorrupt => {
                tracing::debug!("[Classifier] {}: {}", path.display(), resolved.last_error());
                ContentType::invalid(resolved.last_error().clone(), false)
            }
        }
    }

    async fn classify_file(&self, path: &Path) -> ContentType {
        if let Some(content_type) = storage::extension_of(path).and_then(|ext| self.registry.lookup(&ext)) {
            return content_type;
        }

        if text_extraction::can_load_as_text(path).await {
            ContentType::Text
        } else {
            ContentType::Fallback
        }
    }

    pub async fn classify_clipboard(&self, payload: &dyn ClipboardPayload) -> ContentType {
        if payload.has_bitmap() {
            return ContentType::Image;
        }

        if payload.has_text() {
            let text = match payload.text().await {
                Ok(text) => text,
                Err(e) => return clipboard_failure(Some(e)),
            };
            if is_url_file(&text) {
                // Image-by-URL placeholder
                return ContentType::Image;
            }
            return self.text_variant();
        }

        if payload.has_storage_items() {
            let items = match payload.storage_items().await {
                Ok(items) => items,
                Err(e) => return clipboard_failure(Some(e)),
            };
            return match items.as_slice() {
                [] => clipboard_failure(None),
                [item] => {
                    let content_type = self.classify_item(item).await;
                    if content_type.is_invalid() {
                        clipboard_failure(None)
                    } else {
                        content_type
                    }
                }
                _ => {
                    tracing::debug!("[Classifier] Clipboard holds {} items", items.len());
                    ContentType::invalid(MULTIPLE_ITEMS_NOT_SUPPORTED, false)
                }
            };
        }

        clipboard_failure(None)
    }

    fn text_variant(&self) -> ContentType {
        if self.settings.prefer_markdown_over_text {
            ContentType::Markdown
        } else {
            ContentType::Text
        }
    }
}

fn clipboard_failure(cause: Option<anyhow::Error>) -> ContentType {
    let reason = match cause {
        Some(e) => {
            tracing::debug!("[Classifier] Clipboard read failed: {:#}", e);
            ErrorResult::with_cause(
                ErrorKind::AccessUnauthorized,
                e,
                CANNOT_RECEIVE_CLIPBOARD_DATA.message().to_string(),
            )
        }
        None => CANNOT_RECEIVE_CLIPBOARD_DATA,
    };
    ContentType::invalid(reason, true)
}
