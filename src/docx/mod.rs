//! DOCX package parsing: styles, numbering, and the document body walk.

mod numbering;
mod parser;
mod styles;

pub use numbering::NumberingMap;
pub use parser::{DocxParser, DOCUMENT_PART};
pub use styles::{RunOverrides, StyleCatalog, StyleRole};
