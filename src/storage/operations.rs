// FILE: src/storage/operations.rs
//! Result-wrapped filesystem primitives.
//!
//! Nothing here holds shared state: every call opens its own handles and
//! allocates its own buffer, so calls may run concurrently from any task.

use crate::config::COPY_FILE_BUFFER_SIZE;
use crate::error::{CanvasError, ErrorKind, ErrorResult};
use crate::safety::{report_error, wrap_action_async, wrap_async, Outcome};
use crate::storage::{naming, path_error, trash, StorageItem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

const NULL_ITEM: ErrorResult =
    ErrorResult::from_static(ErrorKind::InvalidArgument, "The provided storage item is null.");

/// What `rename_item` does when the new name is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameCollision {
    FailIfExists,
    #[default]
    GenerateUniqueName,
    ReplaceExisting,
}

/// What `create_file_with` does when the name is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreationCollision {
    FailIfExists,
    #[default]
    GenerateUniqueName,
    ReplaceExisting,
    OpenIfExists,
}

impl From<NameCollision> for CreationCollision {
    fn from(policy: NameCollision) -> Self {
        match policy {
            NameCollision::FailIfExists => CreationCollision::FailIfExists,
            NameCollision::GenerateUniqueName => CreationCollision::GenerateUniqueName,
            NameCollision::ReplaceExisting => CreationCollision::ReplaceExisting,
        }
    }
}

// ---------- copy ----------

/// Copy `source` to `destination` in blocks of `COPY_FILE_BUFFER_SIZE` bytes.
///
/// `on_progress` gets the completed percentage after every block. The token is
/// polled after each block; a cancelled copy returns `ErrorResult::CANCEL` and
/// leaves the partially written destination in place for the caller to remove.
pub async fn copy_file<P>(
    source: &Path,
    destination: &Path,
    on_progress: P,
    cancel: &CancellationToken,
) -> ErrorResult
where
    P: FnMut(f64),
{
    copy_file_with_block_size(source, destination, COPY_FILE_BUFFER_SIZE, on_progress, cancel).await
}

pub async fn copy_file_with_block_size<P>(
    source: &Path,
    destination: &Path,
    block_size: usize,
    mut on_progress: P,
    cancel: &CancellationToken,
) -> ErrorResult
where
    P: FnMut(f64),
{
    if block_size == 0 {
        return ErrorResult::new(ErrorKind::InvalidArgument, "Copy block size must be positive");
    }

    let copied = wrap_async(async {
        let mut reader = tokio::fs::File::open(source)
            .await
            .map_err(|e| path_error(e, source))?;
        let total = reader.metadata().await?.len();
        let mut writer = tokio::fs::File::create(destination)
            .await
            .map_err(|e| path_error(e, destination))?;

        if total == 0 {
            on_progress(100.0);
        }

        let mut buffer = vec![0u8; block_size];
        let mut transferred: u64 = 0;
        loop {
            let read = read_block(&mut reader, &mut buffer).await?;
            if read == 0 {
                break;
            }
            writer.write_all(&buffer[..read]).await?;
            transferred += read as u64;

            if total > 0 {
                on_progress((transferred as f64 * 100.0 / total as f64).min(100.0));
            }

            if cancel.is_cancelled() {
                writer.flush().await?;
                tracing::info!(
                    "[FileOps] Copy of {} cancelled after {} of {} bytes",
                    source.display(),
                    transferred,
                    total
                );
                return Ok(false);
            }

            if read < block_size {
                break;
            }
        }

        writer.flush().await?;
        tracing::debug!("[FileOps] Copied {} bytes to {}", transferred, destination.display());
        Ok::<_, CanvasError>(true)
    })
    .await;

    match copied {
        Outcome::Success(true) => ErrorResult::SUCCESS,
        Outcome::Success(false) => ErrorResult::CANCEL,
        Outcome::Failure(details) => details,
    }
}

/// Fill `buffer` unless the reader runs dry first. Returns the bytes read.
async fn read_block<R: AsyncRead + Unpin>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

// ---------- text ----------

/// Read `path` as text. UTF-8 is the default; a byte order mark selects
/// UTF-16 LE or BE and is dropped from the result.
pub async fn read_text(path: &Path) -> Outcome<String> {
    wrap_async(async {
        let bytes = tokio::fs::read(path).await.map_err(|e| path_error(e, path))?;
        decode_text(&bytes)
            .map_err(|reason| CanvasError::InvalidArgument(format!("{} is not readable text: {}", path.display(), reason)))
    })
    .await
}

fn decode_text(bytes: &[u8]) -> Result<String, String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => std::str::from_utf8(rest).map(str::to_owned).map_err(|e| e.to_string()),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => std::str::from_utf8(bytes).map(str::to_owned).map_err(|e| e.to_string()),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("odd number of bytes in UTF-16 text".to_string());
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]])).collect();
    String::from_utf16(&units).map_err(|e| e.to_string())
}

/// Replace the whole contents of `path` with `text`.
pub async fn write_text(path: &Path, text: &str) -> ErrorResult {
    wrap_action_async(async {
        tokio::fs::write(path, text).await.map_err(|e| path_error(e, path))
    })
    .await
}

// ---------- rename ----------

pub async fn rename_item(item: &StorageItem, new_name: &str, collision: NameCollision) -> Outcome<StorageItem> {
    if let Err(e) = naming::validate_name(new_name) {
        return Outcome::Failure(report_error(e));
    }
    let Some(parent) = item.parent().map(Path::to_path_buf) else {
        return Outcome::Failure(ErrorResult::new(
            ErrorKind::InvalidOperation,
            format!("{} has no parent folder", item.path().display()),
        ));
    };

    wrap_async(async {
        tokio::fs::symlink_metadata(item.path())
            .await
            .map_err(|e| path_error(e, item.path()))?;
        if item.name() == new_name {
            return Ok(item.clone());
        }

        let mut target = parent.join(new_name);
        if tokio::fs::try_exists(&target).await? {
            match collision {
                NameCollision::FailIfExists => return Err(CanvasError::AlreadyExists(target)),
                NameCollision::GenerateUniqueName => {
                    target = naming::unique_path(&parent, new_name).await?;
                }
                NameCollision::ReplaceExisting => {
                    remove_path(&target).await?;
                }
            }
        }

        tokio::fs::rename(item.path(), &target)
            .await
            .map_err(|e| path_error(e, item.path()))?;
        tracing::debug!("[FileOps] Renamed {} -> {}", item.path().display(), target.display());
        Ok::<_, CanvasError>(item.with_path(target))
    })
    .await
}

// ---------- delete ----------

/// Delete `item`. A non-permanent delete goes to the home trash when there is one.
pub async fn delete_item(item: Option<&StorageItem>, permanently: bool) -> ErrorResult {
    let trash_root = trash::home_trash_dir();
    delete_item_with_trash(item, permanently, trash_root.as_deref()).await
}

/// `delete_item` against an explicit trash. With no trash, or when the item is
/// on another device than the trash, the item is deleted permanently.
pub async fn delete_item_with_trash(
    item: Option<&StorageItem>,
    permanently: bool,
    trash_root: Option<&Path>,
) -> ErrorResult {
    let Some(item) = item else {
        return NULL_ITEM;
    };

    if !permanently {
        match trash_root {
            Some(trash_root) => match trash::move_to_trash_in(item.path(), trash_root).await {
                Ok(_) => return ErrorResult::SUCCESS,
                Err(e) if trash::is_cross_device(&e) => {
                    tracing::warn!("[FileOps] {} is on another device than the trash, deleting permanently", item);
                }
                Err(e) => return report_error(path_error(e, item.path())),
            },
            None => {
                tracing::debug!("[FileOps] No trash on this platform, deleting {} permanently", item);
            }
        }
    }

    wrap_action_async(remove_path(item.path())).await
}

async fn remove_path(path: &Path) -> Result<(), CanvasError> {
    let metadata = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| path_error(e, path))?;
    let removed = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    removed.map_err(|e| path_error(e, path))
}

// ---------- create ----------

/// Create an empty file in `parent`, picking a unique name if `name` is taken.
pub async fn create_file(parent: &Path, name: &str) -> Outcome<StorageItem> {
    create_file_with(parent, name, CreationCollision::default()).await
}

pub async fn create_file_with(parent: &Path, name: &str, collision: CreationCollision) -> Outcome<StorageItem> {
    if let Err(e) = naming::validate_name(name) {
        return Outcome::Failure(report_error(e));
    }
    let parent = match resolve_parent(parent).await {
        Ok(parent) => parent,
        Err(details) => return Outcome::Failure(details),
    };

    wrap_async(async {
        let target = match collision {
            CreationCollision::GenerateUniqueName => naming::unique_path(&parent, name).await?,
            _ => parent.join(name),
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        match collision {
            CreationCollision::FailIfExists | CreationCollision::GenerateUniqueName => {
                options.create_new(true);
            }
            CreationCollision::ReplaceExisting => {
                options.create(true).truncate(true);
            }
            CreationCollision::OpenIfExists => {
                options.create(true);
            }
        }

        options.open(&target).await.map_err(|e| path_error(e, &target))?;
        tracing::debug!("[FileOps] Created {}", target.display());
        Ok::<_, CanvasError>(StorageItem::File(target))
    })
    .await
}

/// Create the file at an exact path. The parent must exist and the name must be free.
pub async fn create_file_at(path: &Path) -> Outcome<StorageItem> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Outcome::Failure(ErrorResult::new(
            ErrorKind::InvalidArgument,
            format!("{} does not name a file", path.display()),
        ));
    };
    create_file_with(parent, &name.to_string_lossy(), CreationCollision::FailIfExists).await
}

/// Create a folder in `parent`, picking a unique name if `name` is taken.
pub async fn create_folder(parent: &Path, name: &str) -> Outcome<StorageItem> {
    if let Err(e) = naming::validate_name(name) {
        return Outcome::Failure(report_error(e));
    }
    let parent = match resolve_parent(parent).await {
        Ok(parent) => parent,
        Err(details) => return Outcome::Failure(details),
    };

    wrap_async(async {
        let target = naming::unique_path(&parent, name).await?;
        tokio::fs::create_dir(&target).await.map_err(|e| path_error(e, &target))?;
        Ok::<_, CanvasError>(StorageItem::Folder(target))
    })
    .await
}

async fn resolve_parent(parent: &Path) -> Result<std::path::PathBuf, ErrorResult> {
    match StorageItem::from_path(parent).await {
        Outcome::Success(StorageItem::Folder(path)) => Ok(path),
        Outcome::Success(StorageItem::File(path)) => Err(report_error(CanvasError::InvalidArgument(format!(
            "{} is not a folder",
            path.display()
        )))),
        Outcome::Failure(details) => Err(details),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_copy_reports_every_block() {
        let temp = TempDir::new().unwrap();
        let source = write(temp.path(), "src.bin", &vec![7u8; 1000]);
        let destination = temp.path().join("dst.bin");

        let mut seen = Vec::new();
        let status = copy_file_with_block_size(
            &source,
            &destination,
            300,
            |p| seen.push(p),
            &CancellationToken::new(),
        )
        .await;

        assert!(status.is_success());
        assert_eq!(seen, vec![30.0, 60.0, 90.0, 100.0]);
        assert_eq!(std::fs::read(&destination).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn test_copy_empty_file_reports_100() {
        let temp = TempDir::new().unwrap();
        let source = write(temp.path(), "empty", b"");
        let mut seen = Vec::new();
        let status = copy_file(&source, &temp.path().join("out"), |p| seen.push(p), &CancellationToken::new()).await;
        assert!(status.is_success());
        assert_eq!(seen, vec![100.0]);
    }

    #[tokio::test]
    async fn test_copy_cancelled_midway() {
        let temp = TempDir::new().unwrap();
        let source = write(temp.path(), "src.bin", &vec![1u8; 1000]);
        let token = CancellationToken::new();
        let mut seen = Vec::new();

        let status = copy_file_with_block_size(
            &source,
            &temp.path().join("dst.bin"),
            100,
            |p| {
                seen.push(p);
                if p >= 30.0 {
                    token.cancel();
                }
            },
            &token,
        )
        .await;

        assert_eq!(status, ErrorResult::CANCEL);
        assert_eq!(seen, vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn test_copy_missing_source_and_zero_block() {
        let temp = TempDir::new().unwrap();
        let token = CancellationToken::new();
        let status = copy_file(&temp.path().join("nope"), &temp.path().join("out"), |_| {}, &token).await;
        assert_eq!(status.kind(), ErrorKind::NotFound);

        let source = write(temp.path(), "a", b"abc");
        let status = copy_file_with_block_size(&source, &temp.path().join("out"), 0, |_| {}, &token).await;
        assert_eq!(status.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_read_write_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("note.txt");
        assert!(write_text(&path, "first").await.is_success());
        assert!(write_text(&path, "second").await.is_success());
        assert_eq!(read_text(&path).await.into_value().as_deref(), Some("second"));

        let bad = write(temp.path(), "bad.txt", &[0xC3, 0x28]);
        assert_eq!(read_text(&bad).await.kind(), ErrorKind::InvalidArgument);
        assert_eq!(read_text(&temp.path().join("missing")).await.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_text_with_byte_order_marks() {
        let temp = TempDir::new().unwrap();
        let mut le = vec![0xFF, 0xFE];
        le.extend("héllo".encode_utf16().flat_map(u16::to_le_bytes));
        let mut be = vec![0xFE, 0xFF];
        be.extend("héllo".encode_utf16().flat_map(u16::to_be_bytes));
        let mut utf8 = vec![0xEF, 0xBB, 0xBF];
        utf8.extend("héllo".as_bytes());

        for (name, bytes) in [("le.dat", le), ("be.dat", be), ("bom8.dat", utf8)] {
            let path = write(temp.path(), name, &bytes);
            assert_eq!(read_text(&path).await.into_value().as_deref(), Some("héllo"), "{}", name);
        }

        let odd = write(temp.path(), "odd.dat", &[0xFF, 0xFE, 0x41]);
        assert_eq!(read_text(&odd).await.kind(), ErrorKind::InvalidArgument);
        let lone_surrogate = write(temp.path(), "surrogate.dat", &[0xFF, 0xFE, 0x00, 0xD8]);
        assert_eq!(read_text(&lone_surrogate).await.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_rename_collision_policies() {
        let temp = TempDir::new().unwrap();
        let a = StorageItem::File(write(temp.path(), "a.txt", b"a"));
        write(temp.path(), "b.txt", b"b");

        let failed = rename_item(&a, "b.txt", NameCollision::FailIfExists).await;
        assert_eq!(failed.kind(), ErrorKind::AlreadyExists);

        let renamed = rename_item(&a, "b.txt", NameCollision::GenerateUniqueName).await.into_value().unwrap();
        assert_eq!(renamed.path(), temp.path().join("b (2).txt"));

        let replaced = rename_item(&renamed, "b.txt", NameCollision::ReplaceExisting).await.into_value().unwrap();
        assert_eq!(replaced.path(), temp.path().join("b.txt"));
        assert_eq!(std::fs::read_to_string(replaced.path()).unwrap(), "a");

        let invalid = rename_item(&replaced, "x/y", NameCollision::default()).await;
        assert_eq!(invalid.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_rename_to_same_name() {
        let temp = TempDir::new().unwrap();
        let a = StorageItem::File(write(temp.path(), "a.txt", b"a"));
        let kept = rename_item(&a, "a.txt", NameCollision::FailIfExists).await.into_value().unwrap();
        assert_eq!(kept, a);
        assert_eq!(std::fs::read_to_string(a.path()).unwrap(), "a");

        let ghost = StorageItem::File(temp.path().join("ghost.txt"));
        let missing = rename_item(&ghost, "ghost.txt", NameCollision::default()).await;
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        let missing = rename_item(&ghost, "other.txt", NameCollision::default()).await;
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_null_and_permanent() {
        assert_eq!(delete_item(None, true).await, NULL_ITEM);
        assert_eq!(delete_item(None, false).await.kind(), ErrorKind::InvalidArgument);

        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("dir");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "inner.txt", b"x");

        let status = delete_item(Some(&StorageItem::Folder(folder.clone())), true).await;
        assert!(status.is_success());
        assert!(!folder.exists());

        let again = delete_item(Some(&StorageItem::Folder(folder)), true).await;
        assert_eq!(again.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_to_trash() {
        let temp = TempDir::new().unwrap();
        let trash = temp.path().join("Trash");
        let doc = write(temp.path(), "doc.md", b"# doc");

        let status = delete_item_with_trash(Some(&StorageItem::File(doc.clone())), false, Some(&trash)).await;
        assert!(status.is_success());
        assert!(!doc.exists());
        assert_eq!(std::fs::read_to_string(trash.join("files").join("doc.md")).unwrap(), "# doc");
        assert!(trash.join("info").join("doc.md.trashinfo").exists());

        let again = delete_item_with_trash(Some(&StorageItem::File(doc)), false, Some(&trash)).await;
        assert_eq!(again.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_without_trash_is_permanent() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("dir");
        std::fs::create_dir(&folder).unwrap();
        write(&folder, "inner.txt", b"x");

        let status = delete_item_with_trash(Some(&StorageItem::Folder(folder.clone())), false, None).await;
        assert!(status.is_success());
        assert!(!folder.exists());
        assert_eq!(delete_item_with_trash(None, false, None).await, NULL_ITEM);
    }

    #[tokio::test]
    async fn test_permanent_delete_skips_trash() {
        let temp = TempDir::new().unwrap();
        let trash = temp.path().join("Trash");
        let doc = write(temp.path(), "doc.md", b"x");

        let status = delete_item_with_trash(Some(&StorageItem::File(doc.clone())), true, Some(&trash)).await;
        assert!(status.is_success());
        assert!(!doc.exists());
        assert!(!trash.exists());
    }

    #[tokio::test]
    async fn test_create_file_policies() {
        let temp = TempDir::new().unwrap();
        let first = create_file(temp.path(), "new.md").await.into_value().unwrap();
        let second = create_file(temp.path(), "new.md").await.into_value().unwrap();
        assert_eq!(first.path(), temp.path().join("new.md"));
        assert_eq!(second.path(), temp.path().join("new (2).md"));

        let clash = create_file_with(temp.path(), "new.md", CreationCollision::FailIfExists).await;
        assert_eq!(clash.kind(), ErrorKind::AlreadyExists);

        std::fs::write(first.path(), "keep").unwrap();
        let opened = create_file_with(temp.path(), "new.md", CreationCollision::OpenIfExists).await;
        assert!(opened.is_success());
        assert_eq!(std::fs::read_to_string(first.path()).unwrap(), "keep");

        let replaced = create_file_with(temp.path(), "new.md", CreationCollision::ReplaceExisting).await;
        assert!(replaced.is_success());
        assert_eq!(std::fs::read_to_string(first.path()).unwrap(), "");

        let orphan = create_file(&temp.path().join("missing"), "x.txt").await;
        assert_eq!(orphan.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_file_at_and_folder() {
        let temp = TempDir::new().unwrap();
        let item = create_file_at(&temp.path().join("exact.txt")).await.into_value().unwrap();
        assert!(item.is_file());
        assert_eq!(create_file_at(&temp.path().join("exact.txt")).await.kind(), ErrorKind::AlreadyExists);

        let board = create_folder(temp.path(), "Board.infinitecanvas").await.into_value().unwrap();
        assert!(board.is_folder());
        assert!(board.path().is_dir());
    }
}
