//! Error types for the docpage library.

use std::io;
use thiserror::Error;

/// Result type alias for docpage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conversion errors.
///
/// Any condition that prevents producing *a* readable document is fatal and
/// surfaces here. Per-element degradation (a missing image, a cyclic style)
/// is reported through [`crate::Warning`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The package container could not be opened (bad signature,
    /// truncated archive, checksum failure).
    #[error("Malformed package: {0}")]
    MalformedPackage(String),

    /// A required package part is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A relationship descriptor exists but cannot be parsed.
    #[error("Malformed relationships: {0}")]
    MalformedRelationships(String),

    /// The main document body XML is not well-formed.
    #[error("Unreadable document body: {0}")]
    UnreadableDocumentBody(String),

    /// Error parsing XML content of an ancillary part.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::MalformedPackage(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPart("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Missing package part: word/document.xml");

        let err = Error::MalformedPackage("invalid Zip archive".to_string());
        assert!(err.to_string().starts_with("Malformed package"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
