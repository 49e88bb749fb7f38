// FILE: src/core/bouncer.rs
//! The Bouncer: keeps system noise out of workspace listings and cache updates.
//!
//! Noise is:
//! 1. Hidden files (start with .)
//! 2. Backup files (end with ~)
//! 3. Known OS metadata files (Thumbs.db, desktop.ini)
//! 4. Editor swap files and unfinished downloads

const IGNORED_EXACT: &[&str] = &[
    "thumbs.db",
    "ehthumbs.db",
    "desktop.ini",
    "icon\r",
    "$recycle.bin",
    "system volume information",
];

const IGNORED_EXTENSIONS: &[&str] = &["swp", "swo", "tmp", "bak", "ds_store", "partial", "crdownload", "part"];

pub struct Bouncer;

impl Bouncer {
    /// True when `name` (a bare file name) is something no canvas should show.
    pub fn is_noise(name: &str) -> bool {
        let name_lower = name.to_lowercase();

        if name.starts_with('.') || name.ends_with('~') {
            return true;
        }

        if IGNORED_EXACT.contains(&name_lower.as_str()) {
            return true;
        }

        // Office lock files: ~$report.docx
        if name.starts_with("~$") {
            return true;
        }

        if let Some(idx) = name_lower.rfind('.') {
            if idx + 1 < name_lower.len() && IGNORED_EXTENSIONS.contains(&&name_lower[idx + 1..]) {
                return true;
            }
        }

        false
    }

    /// Same check on the last component of a path. Paths without one are not noise.
    pub fn is_noise_path(path: &std::path::Path) -> bool {
        path.file_name()
            .map(|name| Self::is_noise(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_noise() {
        assert!(Bouncer::is_noise(".DS_Store"));
        assert!(Bouncer::is_noise("notes.txt~"));
        assert!(Bouncer::is_noise("Thumbs.db"));
        assert!(Bouncer::is_noise("movie.mp4.crdownload"));
        assert!(Bouncer::is_noise(".notes.md.swp"));
        assert!(Bouncer::is_noise("~$report.docx"));
    }

    #[test]
    fn test_content_is_not_noise() {
        assert!(!Bouncer::is_noise("photo.png"));
        assert!(!Bouncer::is_noise("Board.infinitecanvas"));
        assert!(!Bouncer::is_noise("photo.png.refcanvas"));
        assert!(!Bouncer::is_noise("README"));
        assert!(!Bouncer::is_noise_path(Path::new("/")));
        assert!(Bouncer::is_noise_path(Path::new("/w/.hidden")));
    }
}
