//! Text Sniffing Module
//!
//! Decides whether a file with an unregistered extension can be shown as text.
//! Only the first `TEXT_SNIFF_WINDOW` bytes are looked at.

use crate::config::TEXT_SNIFF_WINDOW;
use std::path::Path;
use tokio::io::AsyncReadExt;

const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// True when the start of the file decodes as text. Unreadable files are not text.
pub async fn can_load_as_text(path: &Path) -> bool {
    match read_sample(path).await {
        Ok((sample, truncated)) => looks_like_text(&sample, truncated),
        Err(e) => {
            tracing::debug!("[TextSniff] Could not read {}: {}", path.display(), e);
            false
        }
    }
}

async fn read_sample(path: &Path) -> std::io::Result<(Vec<u8>, bool)> {
    let file = tokio::fs::File::open(path).await?;
    // One byte past the window tells us whether the sample was cut short.
    let mut sample = Vec::with_capacity(TEXT_SNIFF_WINDOW + 1);
    file.take(TEXT_SNIFF_WINDOW as u64 + 1).read_to_end(&mut sample).await?;

    let truncated = sample.len() > TEXT_SNIFF_WINDOW;
    sample.truncate(TEXT_SNIFF_WINDOW);
    Ok((sample, truncated))
}

/// `truncated` means more bytes follow, so a multi-byte sequence cut at the end is fine.
pub fn looks_like_text(sample: &[u8], truncated: bool) -> bool {
    if sample.starts_with(&UTF16_LE_BOM) || sample.starts_with(&UTF16_BE_BOM) {
        return true;
    }

    if sample.contains(&0) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // error_len() == None: the input ended mid-sequence
        Err(e) => truncated && e.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_and_binary() {
        assert!(looks_like_text(b"hello world\n", false));
        assert!(looks_like_text("héllo".as_bytes(), false));
        assert!(looks_like_text(b"", false));
        assert!(!looks_like_text(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR", false));
        assert!(!looks_like_text(&[0xC3, 0x28], false));
    }

    #[test]
    fn test_cut_multibyte_only_ok_when_truncated() {
        let cut = &"é".as_bytes()[..1];
        assert!(looks_like_text(cut, true));
        assert!(!looks_like_text(cut, false));
    }

    #[test]
    fn test_utf16_bom() {
        assert!(looks_like_text(&[0xFF, 0xFE, b'h', 0, b'i', 0], false));
    }

    #[tokio::test]
    async fn test_can_load_as_text_from_disk() {
        let temp = TempDir::new().unwrap();
        let text = temp.path().join("notes.cfg");
        let blob = temp.path().join("data.bin");
        std::fs::write(&text, "key = value\n".repeat(10_000)).unwrap();
        std::fs::write(&blob, [0u8, 1, 2, 3, 255]).unwrap();

        assert!(can_load_as_text(&text).await);
        assert!(!can_load_as_text(&blob).await);
        assert!(!can_load_as_text(&temp.path().join("missing")).await);
    }
}
