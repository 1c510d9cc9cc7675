//! Paragraph and inline node models.

use serde::Serialize;

/// Text alignment within a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Heading level (h1-h6 or none).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum HeadingLevel {
    #[default]
    None,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Create a heading level from a number (1-6).
    pub fn from_number(n: u8) -> Self {
        match n {
            1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            6 => HeadingLevel::H6,
            _ => HeadingLevel::None,
        }
    }

    /// Get the numeric level (0 for none, 1-6 for headings).
    pub fn level(&self) -> u8 {
        match self {
            HeadingLevel::None => 0,
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }

    pub fn is_heading(&self) -> bool {
        !matches!(self, HeadingLevel::None)
    }

    fn is_none(&self) -> bool {
        matches!(self, HeadingLevel::None)
    }
}

/// The kind of list a paragraph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Unordered (bulleted) list
    Bullet,
    /// Ordered (numbered) list
    Numbered,
}

/// List membership for a paragraph.
///
/// The source format marks each item independently; grouping consecutive
/// items into one container is a rendering-time operation.
#[derive(Debug, Clone, Serialize)]
pub struct ListInfo {
    pub kind: ListKind,
    /// Numbering definition ID; items sharing it belong to the same list.
    pub num_id: String,
    /// Nesting level (0 = top level)
    pub level: u8,
    /// Item number, for numbered lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// Character formatting flags and attributes.
///
/// Booleans combine by explicit override when styles compose, never by
/// toggling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,

    /// Font size in half-points (e.g., 24 = 12pt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    /// Text color (hex, e.g., "1A7A4A")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the style carries any emphasis flag.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.underline || self.strikethrough
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TextRun {
    pub text: String,

    #[serde(default, skip_serializing_if = "is_default_style")]
    pub style: TextStyle,
}

fn is_default_style(style: &TextStyle) -> bool {
    *style == TextStyle::default()
}

impl TextRun {
    /// Create a plain text run with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A hyperlink wrapping one or more runs.
///
/// `target` is `None` when the relationship could not be resolved; the
/// renderer then emits the text un-linked.
#[derive(Debug, Clone, Serialize)]
pub struct Hyperlink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub runs: Vec<TextRun>,
}

impl Hyperlink {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// An inline image reference within a paragraph.
#[derive(Debug, Clone, Serialize)]
pub struct InlineImage {
    /// Relationship ID keying into the document's extracted resources
    pub resource_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// An inline node within a paragraph.
///
/// Closed union with exhaustive matching in the renderer; adding a node
/// kind later is a compile-time-checked decision.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Run(TextRun),
    Link(Hyperlink),
    Image(InlineImage),
    Break,
}

/// A paragraph: an ordered sequence of inline nodes plus block formatting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Paragraph {
    #[serde(default)]
    pub inlines: Vec<Inline>,

    #[serde(default, skip_serializing_if = "HeadingLevel::is_none")]
    pub heading: HeadingLevel,

    #[serde(default, skip_serializing_if = "is_default_alignment")]
    pub alignment: TextAlignment,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<ListInfo>,

    /// Declared style ID, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,

    /// Block quote role from the resolved style
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub quote: bool,

    /// Background shading fill (hex), from `w:shd`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<String>,
}

fn is_default_alignment(a: &TextAlignment) -> bool {
    *a == TextAlignment::Left
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with the given plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Run(TextRun::plain(text))],
            ..Default::default()
        }
    }

    /// Create a heading paragraph.
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::Run(TextRun::plain(text))],
            heading: level,
            ..Default::default()
        }
    }

    /// Get the plain text content of all runs and links.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Run(run) => text.push_str(&run.text),
                Inline::Link(link) => text.push_str(&link.plain_text()),
                Inline::Break => text.push('\n'),
                Inline::Image(_) => {}
            }
        }
        text
    }

    /// A paragraph with no text and no images is empty.
    pub fn is_empty(&self) -> bool {
        self.inlines.iter().all(|inline| match inline {
            Inline::Run(run) => run.is_empty(),
            Inline::Link(link) => link.runs.iter().all(|r| r.is_empty()),
            Inline::Image(_) => false,
            Inline::Break => true,
        })
    }

    pub fn is_heading(&self) -> bool {
        self.heading.is_heading()
    }

    pub fn is_list_item(&self) -> bool {
        self.list.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level() {
        assert_eq!(HeadingLevel::from_number(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_number(6), HeadingLevel::H6);
        assert_eq!(HeadingLevel::from_number(0), HeadingLevel::None);
        assert_eq!(HeadingLevel::from_number(7), HeadingLevel::None);

        assert_eq!(HeadingLevel::H3.level(), 3);
        assert!(HeadingLevel::H1.is_heading());
        assert!(!HeadingLevel::None.is_heading());
    }

    #[test]
    fn test_paragraph_plain_text() {
        let para = Paragraph {
            inlines: vec![
                Inline::Run(TextRun::plain("Hello, ")),
                Inline::Link(Hyperlink {
                    target: Some("https://example.com".to_string()),
                    runs: vec![TextRun::plain("World")],
                }),
                Inline::Run(TextRun::plain("!")),
            ],
            ..Default::default()
        };
        assert_eq!(para.plain_text(), "Hello, World!");
        assert!(!para.is_empty());
    }

    #[test]
    fn test_paragraph_with_only_image_is_not_empty() {
        let para = Paragraph {
            inlines: vec![Inline::Image(InlineImage {
                resource_id: "rId1".to_string(),
                alt_text: None,
            })],
            ..Default::default()
        };
        assert!(!para.is_empty());

        let empty = Paragraph::new();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_style_formatting() {
        let style = TextStyle {
            bold: true,
            ..Default::default()
        };
        assert!(style.has_formatting());
        assert!(!TextStyle::default().has_formatting());
    }

    #[test]
    fn test_serialization_skips_defaults() {
        let para = Paragraph::with_text("Test");
        let json = serde_json::to_string(&para).unwrap();
        assert!(!json.contains("heading"));
        assert!(!json.contains("alignment"));
    }
}
