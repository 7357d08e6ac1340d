//! Page images and the page numbers encoded in their file names.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::StorageError;

static RE_PAGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"page-(\d+)").unwrap());

/// Placeholder used when a path carries no `page-<N>` marker.
pub const UNIDENTIFIED_PAGE: &str = "unidentified";

/// Extracts the page number from a rendered page path such as
/// `scan-data/page-12.webp`.
pub fn extract_page_number(path: &str) -> &str {
    RE_PAGE_NUMBER
        .captures(path)
        .and_then(|caps| caps.get(1).map(|m| m.as_str()))
        .unwrap_or(UNIDENTIFIED_PAGE)
}

/// An encoded page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// MIME type, e.g. `image/webp`.
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Content of one page handed to the LLM: an image, extracted text, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub page_number: String,
    pub image: Option<PageImage>,
    pub text: Option<String>,
}

impl PageContent {
    /// Creates text-only page content.
    pub fn from_text(page_number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            page_number: page_number.into(),
            image: None,
            text: Some(text.into()),
        }
    }

    /// Reads a rendered page image from disk.
    pub async fn load_image(path: &Path) -> Result<Self, StorageError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;
        let media_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "image/webp".to_string());

        Ok(Self {
            page_number: extract_page_number(&path.to_string_lossy()).to_string(),
            image: Some(PageImage { media_type, data }),
            text: None,
        })
    }
}
