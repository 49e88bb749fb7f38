use crate::config::{INFINITE_CANVAS_EXTENSION, WEBSITE_LINK_FILE_EXTENSION};
use crate::error::{ErrorKind, ErrorResult};
use std::fmt;

pub const FOLDERS_NOT_SUPPORTED: ErrorResult = ErrorResult::from_static(
    ErrorKind::InvalidOperation,
    "Displaying content for folders is not yet supported.",
);

pub const CANNOT_DISPLAY_CONTENT: ErrorResult =
    ErrorResult::from_static(ErrorKind::InvalidOperation, "Couldn't display content for this file");

pub const CANNOT_RECEIVE_CLIPBOARD_DATA: ErrorResult =
    ErrorResult::from_static(ErrorKind::AccessUnauthorized, "Couldn't retrieve clipboard data");

pub const MULTIPLE_ITEMS_NOT_SUPPORTED: ErrorResult =
    ErrorResult::from_static(ErrorKind::InvalidOperation, "Pasting multiple items is not supported");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebViewMode {
    /// A saved website link, loaded from the network.
    ReadAsWebsite,
    /// Local markup shown as a page.
    ReadAsMarkupText,
}

/// How an item's content is to be loaded and saved.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentType {
    Image,
    Text,
    Media,
    WebView(WebViewMode),
    Markdown,
    /// A folder that is itself a nested canvas workspace.
    InfiniteCanvas,
    Invalid {
        reason: ErrorResult,
        /// Re-run classification instead of trusting a cached copy of this value.
        needs_reinitialization: bool,
    },
    /// Opaque or binary content.
    Fallback,
}

impl ContentType {
    pub fn invalid(reason: ErrorResult, needs_reinitialization: bool) -> Self {
        ContentType::Invalid {
            reason,
            needs_reinitialization,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ContentType::Invalid { .. })
    }

    pub fn needs_reinitialization(&self) -> bool {
        matches!(
            self,
            ContentType::Invalid {
                needs_reinitialization: true,
                ..
            }
        )
    }

    pub fn invalid_reason(&self) -> Option<&ErrorResult> {
        match self {
            ContentType::Invalid { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Extension a new item holding this content is saved with.
    pub fn save_extension(&self) -> Option<&'static str> {
        match self {
            ContentType::Image => Some(".png"),
            ContentType::Text => Some(".txt"),
            ContentType::Markdown => Some(".md"),
            ContentType::WebView(WebViewMode::ReadAsWebsite) => Some(WEBSITE_LINK_FILE_EXTENSION),
            ContentType::WebView(WebViewMode::ReadAsMarkupText) => Some(".html"),
            ContentType::InfiniteCanvas => Some(INFINITE_CANVAS_EXTENSION),
            ContentType::Media | ContentType::Invalid { .. } | ContentType::Fallback => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Image => write!(f, "Image"),
            ContentType::Text => write!(f, "Text"),
            ContentType::Media => write!(f, "Media"),
            ContentType::WebView(WebViewMode::ReadAsWebsite) => write!(f, "WebView (website)"),
            ContentType::WebView(WebViewMode::ReadAsMarkupText) => write!(f, "WebView (markup)"),
            ContentType::Markdown => write!(f, "Markdown"),
            ContentType::InfiniteCanvas => write!(f, "InfiniteCanvas"),
            ContentType::Invalid { reason, .. } => write!(f, "Invalid ({})", reason),
            ContentType::Fallback => write!(f, "Fallback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinitialization_flag() {
        assert!(!ContentType::Text.needs_reinitialization());
        assert!(!ContentType::invalid(FOLDERS_NOT_SUPPORTED, false).needs_reinitialization());
        assert!(ContentType::invalid(CANNOT_RECEIVE_CLIPBOARD_DATA, true).needs_reinitialization());
        assert_eq!(
            ContentType::invalid(FOLDERS_NOT_SUPPORTED, false).invalid_reason().map(|r| r.kind()),
            Some(ErrorKind::InvalidOperation)
        );
    }

    #[test]
    fn test_save_extension() {
        assert_eq!(ContentType::Image.save_extension(), Some(".png"));
        assert_eq!(ContentType::WebView(WebViewMode::ReadAsWebsite).save_extension(), Some(".url"));
        assert_eq!(ContentType::WebView(WebViewMode::ReadAsMarkupText).save_extension(), Some(".html"));
        assert_eq!(ContentType::InfiniteCanvas.save_extension(), Some(".infinitecanvas"));
        assert_eq!(ContentType::Fallback.save_extension(), None);
    }
}
