// FILE: src/workspace.rs
//! Listing the items of an InfiniteCanvas workspace folder.

use crate::classifier::{is_workspace_folder, ClassificationCache, Classifier, ContentType};
use crate::core::Bouncer;
use crate::error::CanvasError;
use crate::safety::{wrap_async, Outcome};
use crate::storage::StorageItem;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceEntry {
    pub item: StorageItem,
    pub content_type: ContentType,
}

/// Direct children of `folder`, noise skipped, sorted by name, each classified.
///
/// With a cache, stored classifications are reused and new ones remembered.
pub async fn list_workspace(
    folder: &Path,
    classifier: &Classifier,
    cache: Option<&ClassificationCache>,
) -> Outcome<Vec<WorkspaceEntry>> {
    if !is_workspace_folder(folder) {
        return Outcome::Failure(crate::safety::report_error(CanvasError::InvalidArgument(format!(
            "{} is not a workspace folder",
            folder.display()
        ))));
    }

    let items = match scan(folder.to_path_buf()).await {
        Outcome::Success(items) => items,
        Outcome::Failure(details) => return Outcome::Failure(details),
    };

    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let content_type = match cache {
            Some(cache) => cache.get_or_classify(classifier, &item).await,
            None => classifier.classify_item(&item).await,
        };
        entries.push(WorkspaceEntry { item, content_type });
    }

    tracing::debug!("[Workspace] {} entries in {}", entries.len(), folder.display());
    Outcome::Success(entries)
}

async fn scan(folder: PathBuf) -> Outcome<Vec<StorageItem>> {
    wrap_async(async move {
        let items = tokio::task::spawn_blocking(move || -> Result<Vec<StorageItem>, CanvasError> {
            if !folder.is_dir() {
                return Err(CanvasError::NotFound(folder));
            }

            let mut items = Vec::new();
            for entry in walkdir::WalkDir::new(&folder)
                .min_depth(1)
                .max_depth(1)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !Bouncer::is_noise(&e.file_name().to_string_lossy()))
            {
                let entry = entry.map_err(|e| CanvasError::Io(e.into()))?;
                let path = entry.path().to_path_buf();
                items.push(if entry.file_type().is_dir() {
                    StorageItem::Folder(path)
                } else {
                    StorageItem::File(path)
                });
            }
            Ok(items)
        })
        .await??;
        Ok::<_, anyhow::Error>(items)
    })
    .await
}
