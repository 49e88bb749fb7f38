// FILE: src/storage/mod.rs
pub mod naming;
pub mod operations;
pub mod text_extraction;
pub mod trash;

// Common exports
pub use operations::{
    copy_file, copy_file_with_block_size, create_file, create_file_at, create_file_with,
    create_folder, delete_item, delete_item_with_trash, read_text, rename_item, write_text, CreationCollision,
    NameCollision,
};
pub use text_extraction::can_load_as_text;

use crate::error::CanvasError;
use crate::safety::{wrap_async, Outcome};
use std::io;
use std::path::{Path, PathBuf};

/// Handle to an item on disk. The kind is decided once, from metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageItem {
    File(PathBuf),
    Folder(PathBuf),
}

impl StorageItem {
    /// Look the path up on disk. Fails `NotFound` when nothing is there.
    pub async fn from_path(path: impl AsRef<Path>) -> Outcome<StorageItem> {
        let path = path.as_ref().to_path_buf();
        wrap_async(async move {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| path_error(e, &path))?;
            Ok::<_, CanvasError>(if metadata.is_dir() {
                StorageItem::Folder(path)
            } else {
                StorageItem::File(path)
            })
        })
        .await
    }

    pub fn path(&self) -> &Path {
        match self {
            StorageItem::File(path) | StorageItem::Folder(path) => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            StorageItem::File(path) | StorageItem::Folder(path) => path,
        }
    }

    pub fn name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-cased extension with its leading dot, e.g. `.png`.
    pub fn extension(&self) -> Option<String> {
        extension_of(self.path())
    }

    pub fn parent(&self) -> Option<&Path> {
        self.path().parent()
    }

    pub fn is_file(&self) -> bool {
        matches!(self, StorageItem::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, StorageItem::Folder(_))
    }

    /// Same kind of item, somewhere else.
    pub fn with_path(&self, path: PathBuf) -> StorageItem {
        match self {
            StorageItem::File(_) => StorageItem::File(path),
            StorageItem::Folder(_) => StorageItem::Folder(path),
        }
    }
}

impl std::fmt::Display for StorageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageItem::File(path) => write!(f, "{} (file)", path.display()),
            StorageItem::Folder(path) => write!(f, "{} (folder)", path.display()),
        }
    }
}

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// True when the last path component ends with `suffix` (case-insensitive).
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(&suffix.to_lowercase()))
        .unwrap_or(false)
}

/// Attach the path to the io errors callers branch on.
pub(crate) fn path_error(e: io::Error, path: &Path) -> CanvasError {
    match e.kind() {
        io::ErrorKind::NotFound => CanvasError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => CanvasError::AccessDenied(path.to_path_buf()),
        io::ErrorKind::AlreadyExists => CanvasError::AlreadyExists(path.to_path_buf()),
        _ => CanvasError::Io(e),
    }
}
