//! What the classifier needs from a clipboard payload.

use crate::storage::StorageItem;
use async_trait::async_trait;

/// The three capabilities the classifier reads from a clipboard payload.
#[async_trait]
pub trait ClipboardPayload: Send + Sync {
    fn has_bitmap(&self) -> bool;

    fn has_text(&self) -> bool;

    async fn text(&self) -> anyhow::Result<String>;

    fn has_storage_items(&self) -> bool;

    async fn storage_items(&self) -> anyhow::Result<Vec<StorageItem>>;
}

/// In-memory payload, captured once.
#[derive(Debug, Clone, Default)]
pub struct ClipboardSnapshot {
    bitmap: Option<Vec<u8>>,
    text: Option<String>,
    items: Option<Vec<StorageItem>>,
}

impl ClipboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bitmap(mut self, bytes: Vec<u8>) -> Self {
        self.bitmap = Some(bytes);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_storage_items(mut self, items: Vec<StorageItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn bitmap(&self) -> Option<&[u8]> {
        self.bitmap.as_deref()
    }
}

#[async_trait]
impl ClipboardPayload for ClipboardSnapshot {
    fn has_bitmap(&self) -> bool {
        self.bitmap.is_some()
    }

    fn has_text(&self) -> bool {
        self.text.is_some()
    }

    async fn text(&self) -> anyhow::Result<String> {
        self.text
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Clipboard holds no text"))
    }

    fn has_storage_items(&self) -> bool {
        self.items.is_some()
    }

    async fn storage_items(&self) -> anyhow::Result<Vec<StorageItem>> {
        self.items
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Clipboard holds no storage items"))
    }
}

const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "file"];

/// An absolute web or file URL with nothing else around it.
pub fn is_url(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return false;
    }
    match url::Url::parse(text) {
        Ok(url) => {
            URL_SCHEMES.contains(&url.scheme()) && (url.scheme() == "file" || url.host_str().is_some())
        }
        Err(_) => false,
    }
}

/// A URL whose last path segment names a file (`.../cat.png`).
pub fn is_url_file(text: &str) -> bool {
    if !is_url(text) {
        return false;
    }
    let Ok(url) = url::Url::parse(text.trim()) else {
        return false;
    };
    url.path_segments()
        .and_then(|segments| segments.last())
        .and_then(|last| last.rfind('.').map(|idx| idx > 0 && idx + 1 < last.len()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com"));
        assert!(is_url("  http://example.com/a?b=c  "));
        assert!(is_url("file:///home/me/pic.png"));
        assert!(!is_url("example.com"));
        assert!(!is_url("see https://example.com"));
        assert!(!is_url("mailto:me@example.com"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_is_url_file() {
        assert!(is_url_file("https://example.com/images/cat.png"));
        assert!(is_url_file("file:///home/me/pic.jpeg"));
        assert!(!is_url_file("https://example.com"));
        assert!(!is_url_file("https://example.com/docs/"));
        assert!(!is_url_file("https://example.com/.hidden"));
        assert!(!is_url_file("not a url.png"));
    }

    #[tokio::test]
    async fn test_snapshot_capabilities() {
        let snapshot = ClipboardSnapshot::new().with_text("hello");
        assert!(snapshot.has_text());
        assert!(!snapshot.has_bitmap());
        assert!(!snapshot.has_storage_items());
        assert_eq!(snapshot.text().await.unwrap(), "hello");
        assert!(snapshot.storage_items().await.is_err());

        let empty = ClipboardSnapshot::new().with_storage_items(Vec::new());
        assert!(empty.has_storage_items());
        assert!(empty.storage_items().await.unwrap().is_empty());
    }
}
