//! Recycle bin support (freedesktop.org trash layout).
//!
//! `<trash>/files/<name>` holds the item, `<trash>/info/<name>.trashinfo`
//! records where it came from.

use crate::storage::naming;
use std::io;
use std::path::{Path, PathBuf};

/// Home trash directory, when the platform has one.
pub fn home_trash_dir() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        dirs::data_dir().map(|dir| dir.join("Trash"))
    } else {
        None
    }
}

const EXDEV: i32 = 18;

/// The item lives on another filesystem than the trash, so it cannot be renamed into it.
pub fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(EXDEV)
}

/// Move `path` into the trash rooted at `trash_root`, returning its new location.
pub async fn move_to_trash_in(path: &Path, trash_root: &Path) -> io::Result<PathBuf> {
    let files_dir = trash_root.join("files");
    let info_dir = trash_root.join("info");
    tokio::fs::create_dir_all(&files_dir).await?;
    tokio::fs::create_dir_all(&info_dir).await?;

    let absolute = unresolved_absolute(path).await?;
    let name = absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Cannot trash a root path"))?;

    let destination = naming::unique_path(&files_dir, &name).await?;
    let trashed_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(name);
    let info_path = info_dir.join(format!("{}.trashinfo", trashed_name));

    tokio::fs::write(&info_path, trash_info(&absolute)).await?;
    if let Err(e) = tokio::fs::rename(&absolute, &destination).await {
        let _ = tokio::fs::remove_file(&info_path).await;
        return Err(e);
    }

    tracing::debug!("[Trash] {} -> {}", absolute.display(), destination.display());
    Ok(destination)
}

/// Absolute form of `path` with the parent resolved and the last component left
/// as is, so a symlink names the link and not its target.
async fn unresolved_absolute(path: &Path) -> io::Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Cannot trash a root path"))?;
    tokio::fs::symlink_metadata(path).await?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(tokio::fs::canonicalize(parent).await?.join(name))
}

fn trash_info(original: &Path) -> String {
    // The Path key is percent-encoded like a file URL path.
    let encoded = url::Url::from_file_path(original)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| original.to_string_lossy().into_owned());
    let deleted_at = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S");
    format!("[Trash Info]\nPath={}\nDeletionDate={}\n", encoded, deleted_at)
}
