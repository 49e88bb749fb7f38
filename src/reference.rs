//! Reference markers: small JSON files that stand in for another item.
//!
//! Resolution never retries. Each attempt ends in exactly one
//! [`ReferenceState`], and transient I/O failures surface as `Failed` for the
//! caller to retry.

use crate::config::REFERENCE_FILE_EXTENSION;
use crate::error::{CanvasError, ErrorKind, ErrorResult};
use crate::safety::{on_success_async, report_error, wrap_action_async, Outcome};
use crate::storage::{self, operations, StorageItem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MARKER_MISSING: &str = "Couldn't resolve item associated with path.";
const MARKER_CORRUPT: &str = "The Reference File data is corrupt.";
const TARGET_MISSING: &str = "The item referenced could not be found.";

/// On-disk contents of a marker. Unknown fields survive a read/write cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ReferenceRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceState {
    /// The marker file itself is gone.
    MarkerMissingTarget,
    MarkerCorrupt,
    /// The record is fine but what it points at is gone.
    TargetMissing,
    TargetIsFolder,
    Resolved,
    /// Any other I/O failure while reading the marker or probing the target.
    Failed,
}

#[derive(Debug, Clone)]
pub struct ResolvedReference {
    marker: PathBuf,
    record: Option<ReferenceRecord>,
    target: Option<StorageItem>,
    last_error: ErrorResult,
    state: ReferenceState,
}

impl ResolvedReference {
    fn failed(marker: &Path, record: Option<ReferenceRecord>, state: ReferenceState, error: ErrorResult) -> Self {
        Self {
            marker: marker.to_path_buf(),
            record,
            target: None,
            last_error: error,
            state,
        }
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    pub fn record(&self) -> Option<&ReferenceRecord> {
        self.record.as_ref()
    }

    /// The referenced item, for `Resolved` and `TargetIsFolder`.
    pub fn target(&self) -> Option<&StorageItem> {
        self.target.as_ref()
    }

    pub fn into_target(self) -> Option<StorageItem> {
        self.target
    }

    pub fn last_error(&self) -> &ErrorResult {
        &self.last_error
    }

    pub fn state(&self) -> ReferenceState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        self.state == ReferenceState::Resolved
    }
}

pub fn is_reference_file(path: &Path) -> bool {
    storage::has_suffix(path, REFERENCE_FILE_EXTENSION)
}

/// Resolve the marker at `marker`. `None` when the path is not a marker at all.
pub async fn resolve(marker: &Path) -> Option<ResolvedReference> {
    if !is_reference_file(marker) {
        return None;
    }

    let text = match operations::read_text(marker).await {
        Outcome::Success(text) => text,
        Outcome::Failure(details) if details.kind() == ErrorKind::NotFound => {
            tracing::debug!("[Reference] Marker {} no longer exists", marker.display());
            let error = ErrorResult::with_cause(
                ErrorKind::NotFound,
                CanvasError::NotFound(marker.to_path_buf()),
                MARKER_MISSING,
            );
            return Some(ResolvedReference::failed(marker, None, ReferenceState::MarkerMissingTarget, error));
        }
        Outcome::Failure(details) if details.kind() == ErrorKind::InvalidArgument => {
            tracing::debug!("[Reference] Marker {} is not text: {}", marker.display(), details);
            let error = ErrorResult::with_cause(ErrorKind::InvalidArgument, details, MARKER_CORRUPT);
            return Some(ResolvedReference::failed(marker, None, ReferenceState::MarkerCorrupt, error));
        }
        Outcome::Failure(details) => {
            return Some(ResolvedReference::failed(marker, None, ReferenceState::Failed, details));
        }
    };

    match serde_json::from_str::<ReferenceRecord>(&text) {
        Ok(record) => Some(resolve_record(marker, record).await),
        Err(e) => {
            tracing::debug!("[Reference] Marker {} does not parse: {}", marker.display(), e);
            let error = ErrorResult::with_cause(ErrorKind::InvalidArgument, e, MARKER_CORRUPT);
            Some(ResolvedReference::failed(marker, None, ReferenceState::MarkerCorrupt, error))
        }
    }
}

/// Resolve an already-parsed record that belongs to `marker`.
pub async fn resolve_record(marker: &Path, record: ReferenceRecord) -> ResolvedReference {
    if record.path.trim().is_empty() {
        let error = ErrorResult::with_cause(
            ErrorKind::InvalidArgument,
            CanvasError::InvalidArgument("empty reference path".into()),
            MARKER_CORRUPT,
        );
        return ResolvedReference::failed(marker, Some(record), ReferenceState::MarkerCorrupt, error);
    }

    match StorageItem::from_path(&record.path).await {
        Outcome::Success(target) => {
            let state = if target.is_folder() {
                ReferenceState::TargetIsFolder
            } else {
                ReferenceState::Resolved
            };
            ResolvedReference {
                marker: marker.to_path_buf(),
                record: Some(record),
                target: Some(target),
                last_error: ErrorResult::SUCCESS,
                state,
            }
        }
        Outcome::Failure(details) if details.kind() == ErrorKind::NotFound => {
            tracing::debug!("[Reference] {} points at missing {}", marker.display(), record.path);
            let error = ErrorResult::with_cause(
                ErrorKind::ReferencedItemNotFound,
                CanvasError::ReferencedItemNotFound(record.path.clone()),
                TARGET_MISSING,
            );
            ResolvedReference::failed(marker, Some(record), ReferenceState::TargetMissing, error)
        }
        Outcome::Failure(details) => ResolvedReference::failed(marker, Some(record), ReferenceState::Failed, details),
    }
}

/// Replace the marker's whole record with `record`, as indented JSON.
pub async fn write_record(marker: &Path, record: &ReferenceRecord) -> ErrorResult {
    let json = match serde_json::to_string_pretty(record) {
        Ok(json) => json,
        Err(e) => return report_error(e),
    };
    wrap_action_async(async {
        tokio::fs::write(marker, json)
            .await
            .map_err(|e| storage::path_error(e, marker))
    })
    .await
}

/// Create `<target name>.refcanvas` in `parent` pointing at `target`.
pub async fn create_reference(parent: &Path, target: &StorageItem) -> Outcome<StorageItem> {
    let name = format!("{}{}", target.name(), REFERENCE_FILE_EXTENSION);
    let absolute = match tokio::fs::canonicalize(target.path()).await {
        Ok(path) => path,
        Err(e) => return Outcome::Failure(report_error(storage::path_error(e, target.path()))),
    };
    let record = ReferenceRecord::new(absolute.to_string_lossy());

    on_success_async(operations::create_file(parent, &name), |marker| async move {
        write_record(marker.path(), &record).await.into_result()?;
        tracing::info!("[Reference] Created {} -> {}", marker.path().display(), record.path);
        Ok::<_, ErrorResult>(marker)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn marker(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_not_a_marker() {
        assert!(resolve(Path::new("/tmp/photo.png")).await.is_none());
    }

    #[tokio::test]
    async fn test_marker_missing() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve(&temp.path().join("gone.refcanvas")).await.unwrap();
        assert_eq!(resolved.state(), ReferenceState::MarkerMissingTarget);
        assert_eq!(resolved.last_error().kind(), ErrorKind::NotFound);
        assert_eq!(resolved.last_error().message(), MARKER_MISSING);
    }

    #[tokio::test]
    async fn test_corrupt_markers() {
        let temp = TempDir::new().unwrap();
        let cases: [&[u8]; 6] = [
            b"not json",
            b"null",
            br#"{"path":""}"#,
            br#"{"other":1}"#,
            &[0xC3, 0x28, 0x7B],
            &[0xFF, 0xFE, 0x00, 0x7B],
        ];
        for (i, contents) in cases.iter().enumerate() {
            let path = marker(temp.path(), &format!("m{}.refcanvas", i), contents);
            let resolved = resolve(&path).await.unwrap();
            assert_eq!(resolved.state(), ReferenceState::MarkerCorrupt, "contents: {:?}", contents);
            assert_eq!(resolved.last_error().kind(), ErrorKind::InvalidArgument);
            assert_eq!(resolved.last_error().message(), MARKER_CORRUPT);
        }
    }

    #[tokio::test]
    async fn test_utf16_marker_resolves() {
        let temp = TempDir::new().unwrap();
        let target = marker(temp.path(), "a.txt", "hi");
        let json = serde_json::json!({ "path": target }).to_string();
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(json.encode_utf16().flat_map(u16::to_le_bytes));

        let path = marker(temp.path(), "a.txt.refcanvas", bytes);
        let resolved = resolve(&path).await.unwrap();
        assert!(resolved.is_resolved());
        assert_eq!(resolved.target(), Some(&StorageItem::File(target)));
    }

    #[tokio::test]
    async fn test_target_missing_is_distinct_from_not_found() {
        let temp = TempDir::new().unwrap();
        let path = marker(temp.path(), "photo.refcanvas", r#"{"path":"C:\\missing.jpg"}"#);
        let resolved = resolve(&path).await.unwrap();
        assert_eq!(resolved.state(), ReferenceState::TargetMissing);
        assert_eq!(resolved.last_error().kind(), ErrorKind::ReferencedItemNotFound);
        assert!(resolved.target().is_none());
        assert_eq!(resolved.record().map(|r| r.path.as_str()), Some("C:\\missing.jpg"));
    }

    #[tokio::test]
    async fn test_folder_target() {
        let temp = TempDir::new().unwrap();
        let contents = serde_json::json!({ "path": temp.path() }).to_string();
        let path = marker(temp.path(), "dir.refcanvas", &contents);
        let resolved = resolve(&path).await.unwrap();
        assert_eq!(resolved.state(), ReferenceState::TargetIsFolder);
        assert!(resolved.target().unwrap().is_folder());
    }

    #[tokio::test]
    async fn test_unknown_fields_are_kept() {
        let temp = TempDir::new().unwrap();
        let target = marker(temp.path(), "a.txt", "hi");
        let contents = serde_json::json!({ "path": target, "pinned": true }).to_string();
        let path = marker(temp.path(), "a.txt.refcanvas", &contents);

        let resolved = resolve(&path).await.unwrap();
        assert!(resolved.is_resolved());
        let record = resolved.record().unwrap().clone();
        assert_eq!(record.extra.get("pinned"), Some(&serde_json::Value::Bool(true)));

        assert!(write_record(&path, &record).await.is_success());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"pinned\": true"));
        assert!(text.contains('\n'));
    }

    #[tokio::test]
    async fn test_create_reference_round_trip() {
        let temp = TempDir::new().unwrap();
        let target = StorageItem::File(marker(temp.path(), "pic.png", "x"));

        let first = create_reference(temp.path(), &target).await.into_value().unwrap();
        let second = create_reference(temp.path(), &target).await.into_value().unwrap();
        assert_eq!(first.name(), "pic.png.refcanvas");
        assert_eq!(second.name(), "pic.png (2).refcanvas");

        let resolved = resolve(first.path()).await.unwrap();
        assert!(resolved.is_resolved());
        assert_eq!(
            resolved.target().map(|t| t.path().to_path_buf()),
            Some(std::fs::canonicalize(target.path()).unwrap())
        );
    }
}
