//! Configuration: on-disk conventions and user-tunable settings.
//!
//! The constants name the file conventions the classifier and the reference
//! layer agree on. `Settings` is the small JSON file the binary reads at
//! startup; library code never reads it on its own.

use crate::classifier::ClassifierSettings;
use crate::error::{ErrorKind, ErrorResult};
use crate::safety::Outcome;
use crate::storage::operations::{self, NameCollision};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Suffix of an indirection marker file.
pub const REFERENCE_FILE_EXTENSION: &str = ".refcanvas";

/// Suffix of a folder that is a nested canvas workspace.
pub const INFINITE_CANVAS_EXTENSION: &str = ".infinitecanvas";

/// Extension of a saved website link.
pub const WEBSITE_LINK_FILE_EXTENSION: &str = ".url";

pub const COPY_FILE_BUFFER_SIZE: usize = 81920;

/// How much of a file the text sniffer looks at.
pub const TEXT_SNIFF_WINDOW: usize = 64 * 1024;

pub const APP_DIR_NAME: &str = "clipcanvas";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub prefer_markdown_over_text: bool,
    pub copy_block_size: usize,
    pub rename_collision: NameCollision,
    pub delete_permanently: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefer_markdown_over_text: false,
            copy_block_size: COPY_FILE_BUFFER_SIZE,
            rename_collision: NameCollision::default(),
            delete_permanently: false,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Load from the default location. A missing or unreadable file yields defaults.
    pub async fn load() -> Settings {
        let Some(path) = Self::default_path() else {
            tracing::debug!("[Config] No config directory on this platform, using defaults");
            return Settings::default();
        };

        match Self::load_from(&path).await {
            Outcome::Success(settings) => {
                tracing::debug!("[Config] Loaded settings from {}", path.display());
                settings
            }
            Outcome::Failure(e) if e.kind() == ErrorKind::NotFound => Settings::default(),
            Outcome::Failure(e) => {
                tracing::warn!("[Config] Ignoring unreadable settings at {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    pub async fn load_from(path: &Path) -> Outcome<Settings> {
        operations::read_text(path)
            .await
            .on_success(|text| serde_json::from_str::<Settings>(&text))
            .map(Settings::sanitized)
    }

    pub async fn save_to(&self, path: &Path) -> ErrorResult {
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return crate::safety::report_error(e);
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => operations::write_text(path, &json).await,
            Err(e) => crate::safety::report_error(e),
        }
    }

    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            prefer_markdown_over_text: self.prefer_markdown_over_text,
        }
    }

    fn sanitized(mut self) -> Self {
        if self.copy_block_size == 0 {
            self.copy_block_size = COPY_FILE_BUFFER_SIZE;
        }
        self
    }
}
