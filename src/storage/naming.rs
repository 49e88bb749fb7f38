//! Name validation and collision-free name generation.

use crate::error::CanvasError;
use std::io;
use std::path::{Path, PathBuf};

const MAX_UNIQUE_ATTEMPTS: u32 = 10_000;

/// Split `name` into stem and extension (with the dot). Dotfiles have no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// `photo.png`, 3 -> `photo (3).png`
pub fn numbered_name(name: &str, n: u32) -> String {
    let (stem, ext) = split_name(name);
    format!("{} ({}){}", stem, n, ext)
}

/// First of `name`, `name (2)`, `name (3)`, ... that does not exist in `parent`.
pub async fn unique_path(parent: &Path, name: &str) -> io::Result<PathBuf> {
    let candidate = parent.join(name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    for n in 2..=MAX_UNIQUE_ATTEMPTS {
        let candidate = parent.join(numbered_name(name, n));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("No free name left for '{}' in {}", name, parent.display()),
    ))
}

/// A bare item name: non-empty, no separators, not `.` or `..`.
pub fn validate_name(name: &str) -> Result<(), CanvasError> {
    if name.trim().is_empty() {
        return Err(CanvasError::InvalidArgument("Item name is empty".into()));
    }
    if name == "." || name == ".." {
        return Err(CanvasError::InvalidArgument(format!("'{}' is not a valid item name", name)));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(CanvasError::InvalidArgument(format!(
            "Item name '{}' must not contain path separators",
            name
        )));
    }
    Ok(())
}
