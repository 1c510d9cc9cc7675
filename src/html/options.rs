//! Rendering options.

use serde::{Deserialize, Serialize};

/// Options controlling the rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOptions {
    /// Page title; falls back to document metadata, then a fixed default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Link the display/body web fonts from a font CDN. System fonts are
    /// always declared first so the page reads fine offline.
    pub remote_fonts: bool,
    /// Generate a table of contents when the document has headings.
    pub table_of_contents: bool,
    /// Clamp heading levels deeper than this to it (1..=6).
    pub max_heading_level: u8,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: None,
            remote_fonts: true,
            table_of_contents: true,
            max_heading_level: 6,
        }
    }
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_remote_fonts(mut self, remote_fonts: bool) -> Self {
        self.remote_fonts = remote_fonts;
        self
    }

    pub fn with_table_of_contents(mut self, toc: bool) -> Self {
        self.table_of_contents = toc;
        self
    }

    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }
}
