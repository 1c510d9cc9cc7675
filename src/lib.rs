//! docpage converts DOCX documents into self-contained, mobile-friendly
//! HTML pages.
//!
//! The pipeline opens the DOCX package, parses styles, numbering, and the
//! document body into an owned document model, pulls referenced images out
//! of the package, and renders a single HTML file with the stylesheet and
//! every image embedded. Problems confined to one element (a broken style
//! chain, a missing image, an unknown relationship) degrade that element
//! and surface as [`Warning`]s; only an unopenable package or an unreadable
//! document body fails the conversion.
//!
//! # Example
//!
//! ```no_run
//! use docpage::{convert_file, PageOptions};
//!
//! # fn main() -> docpage::Result<()> {
//! let conversion = convert_file("report.docx")?;
//! for warning in &conversion.warnings {
//!     eprintln!("{}", warning);
//! }
//! std::fs::write("report.html", &conversion.html)?;
//!
//! // Or with options:
//! let bytes = std::fs::read("report.docx")?;
//! let options = PageOptions::new().with_title("Q3 Report").with_remote_fonts(false);
//! let conversion = docpage::convert_bytes_with_options(&bytes, &options)?;
//! # Ok(())
//! # }
//! ```

pub mod docx;
pub mod error;
pub mod html;
pub mod model;
pub mod package;
pub mod warning;

pub use error::{Error, Result};
pub use html::PageOptions;
pub use model::{Block, Document, Metadata, Paragraph, Table};
pub use warning::{Warning, WarningKind};

use docx::DocxParser;
use std::path::Path;

/// The result of a conversion: the page plus everything that degraded
/// along the way.
#[derive(Debug)]
pub struct Conversion {
    /// The complete standalone HTML page.
    pub html: String,
    /// Recoverable problems, in pipeline order.
    pub warnings: Vec<Warning>,
}

/// Parse DOCX bytes into the document model without rendering.
pub fn parse_bytes(data: &[u8]) -> Result<(Document, Vec<Warning>)> {
    DocxParser::from_bytes(data.to_vec())?.parse()
}

/// Convert DOCX bytes to an HTML page with default options.
pub fn convert_bytes(data: &[u8]) -> Result<Conversion> {
    convert_bytes_with_options(data, &PageOptions::default())
}

/// Convert DOCX bytes to an HTML page.
pub fn convert_bytes_with_options(data: &[u8], options: &PageOptions) -> Result<Conversion> {
    let (doc, warnings) = parse_bytes(data)?;
    let html = html::render_page(&doc, options);
    Ok(Conversion { html, warnings })
}

/// Convert a DOCX file to an HTML page with default options.
pub fn convert_file(path: impl AsRef<Path>) -> Result<Conversion> {
    convert_file_with_options(path, &PageOptions::default())
}

/// Convert a DOCX file to an HTML page.
pub fn convert_file_with_options(
    path: impl AsRef<Path>,
    options: &PageOptions,
) -> Result<Conversion> {
    let data = std::fs::read(path)?;
    convert_bytes_with_options(&data, options)
}
