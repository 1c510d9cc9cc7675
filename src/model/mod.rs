//! In-memory document model.
//!
//! All parsing produces an owned, fully resolved tree before rendering
//! begins; later parts may reference earlier ones and vice versa, so
//! nothing here is lazy or streaming.

mod document;
mod paragraph;
mod resource;
mod table;

pub use document::{Block, Document, Metadata};
pub use paragraph::{
    HeadingLevel, Hyperlink, Inline, InlineImage, ListInfo, ListKind, Paragraph, TextAlignment,
    TextRun, TextStyle,
};
pub use resource::{mime_from_path, Resource};
pub use table::{Cell, Row, Table};
