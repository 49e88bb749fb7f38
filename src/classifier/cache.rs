//! Caller-side memory of previous classifications, keyed by item path.

use super::{Classifier, ClassifyInput, ContentType};
use crate::reference::is_reference_file;
use crate::storage::StorageItem;
use dashmap::DashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ClassificationCache {
    entries: DashMap<PathBuf, ContentType>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<ContentType> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, path: PathBuf, content_type: ContentType) {
        self.entries.insert(path, content_type);
    }

    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Drop `path` and everything below it. Returns how many entries went.
    pub fn invalidate_under(&self, path: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(path));
        before.saturating_sub(self.entries.len())
    }

    /// Drop every reference marker entry; their targets may have changed.
    pub fn invalidate_references(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !is_reference_file(key));
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify `item`, reusing the stored value unless it asked to be re-checked.
    pub async fn get_or_classify(&self, classifier: &Classifier, item: &StorageItem) -> ContentType {
        // Clone out first; no map guard may be held across the await.
        let existing = self.get(item.path());
        let content_type = classifier.classify(ClassifyInput::Item(item), existing.as_ref()).await;
        if existing.as_ref() != Some(&content_type) {
            self.insert(item.path().to_path_buf(), content_type.clone());
        }
        content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{CANNOT_RECEIVE_CLIPBOARD_DATA, FOLDERS_NOT_SUPPORTED};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_or_classify_reuses_valid_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("note.txt");
        std::fs::write(&path, "hi").unwrap();
        let item = StorageItem::File(path.clone());

        let cache = ClassificationCache::new();
        let classifier = Classifier::default();
        assert_eq!(cache.get_or_classify(&classifier, &item).await, ContentType::Text);
        assert_eq!(cache.len(), 1);

        // A stored definitive value wins over what the disk says now.
        cache.insert(path.clone(), ContentType::invalid(FOLDERS_NOT_SUPPORTED, false));
        assert!(cache.get_or_classify(&classifier, &item).await.is_invalid());

        // A retriable one is recomputed and replaced.
        cache.insert(path.clone(), ContentType::invalid(CANNOT_RECEIVE_CLIPBOARD_DATA, true));
        assert_eq!(cache.get_or_classify(&classifier, &item).await, ContentType::Text);
        assert_eq!(cache.get(&path), Some(ContentType::Text));
    }

    #[test]
    fn test_invalidation() {
        let cache = ClassificationCache::new();
        cache.insert("/w/a.png".into(), ContentType::Image);
        cache.insert("/w/sub/b.txt".into(), ContentType::Text);
        cache.insert("/w/sub/c.refcanvas".into(), ContentType::Media);
        cache.insert("/other/d.md".into(), ContentType::Markdown);

        assert!(cache.invalidate(Path::new("/w/a.png")));
        assert!(!cache.invalidate(Path::new("/w/a.png")));
        assert_eq!(cache.invalidate_references(), 1);
        assert_eq!(cache.invalidate_under(Path::new("/w")), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
