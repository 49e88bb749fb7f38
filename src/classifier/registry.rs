//! Extension sets contributed by each content family.

use super::content_type::{ContentType, WebViewMode};
use crate::config::WEBSITE_LINK_FILE_EXTENSION;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFamily {
    Image,
    Text,
    Media,
    WebView,
    Markdown,
}

impl ContentFamily {
    /// Lookup order. Sets may overlap; the earlier family wins.
    pub const PRIORITY: [ContentFamily; 5] = [
        ContentFamily::Image,
        ContentFamily::Text,
        ContentFamily::Media,
        ContentFamily::WebView,
        ContentFamily::Markdown,
    ];
}

const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".bmp", ".gif", ".tiff", ".tif", ".ico", ".svg", ".webp",
];
const TEXT_EXTENSIONS: &[&str] = &[".txt"];
const MEDIA_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".ogg", ".mp3", ".m4a", ".wav", ".wma", ".aac", ".flac", ".mkv", ".mov", ".avi",
];
const WEBVIEW_EXTENSIONS: &[&str] = &[".html", ".htm", WEBSITE_LINK_FILE_EXTENSION];
const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".markdown"];

#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    families: HashMap<ContentFamily, HashSet<String>>,
}

impl ExtensionRegistry {
    pub fn empty() -> Self {
        Self {
            families: HashMap::new(),
        }
    }

    /// Add `extensions` (with or without the leading dot, any case) to `family`.
    pub fn register<I, S>(&mut self, family: ContentFamily, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.families.entry(family).or_default();
        set.extend(extensions.into_iter().map(|ext| normalize(ext.as_ref())));
    }

    pub fn with<I, S>(mut self, family: ContentFamily, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.register(family, extensions);
        self
    }

    pub fn contains(&self, family: ContentFamily, extension: &str) -> bool {
        self.families
            .get(&family)
            .map(|set| set.contains(&normalize(extension)))
            .unwrap_or(false)
    }

    /// Variant for `extension`, checked in `ContentFamily::PRIORITY` order.
    pub fn lookup(&self, extension: &str) -> Option<ContentType> {
        let extension = normalize(extension);
        let family = ContentFamily::PRIORITY.into_iter().find(|family| {
            self.families
                .get(family)
                .map(|set| set.contains(&extension))
                .unwrap_or(false)
        })?;

        Some(match family {
            ContentFamily::Image => ContentType::Image,
            ContentFamily::Text => ContentType::Text,
            ContentFamily::Media => ContentType::Media,
            ContentFamily::WebView if extension == WEBSITE_LINK_FILE_EXTENSION => {
                ContentType::WebView(WebViewMode::ReadAsWebsite)
            }
            ContentFamily::WebView => ContentType::WebView(WebViewMode::ReadAsMarkupText),
            ContentFamily::Markdown => ContentType::Markdown,
        })
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::empty()
            .with(ContentFamily::Image, IMAGE_EXTENSIONS)
            .with(ContentFamily::Text, TEXT_EXTENSIONS)
            .with(ContentFamily::Media, MEDIA_EXTENSIONS)
            .with(ContentFamily::WebView, WEBVIEW_EXTENSIONS)
            .with(ContentFamily::Markdown, MARKDOWN_EXTENSIONS)
    }
}

fn normalize(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
