//! DOCX package access: the ZIP container and its relationship parts.
//!
//! A [`Package`] is an immutable, fully in-memory view of one document
//! package. It exposes named parts as bytes and parses the companion
//! `.rels` descriptors into [`Relationships`] maps. No disk or network
//! access happens after construction.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// A relationship entry from a `.rels` part.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part's directory
    pub target: String,
    /// Whether the target lives outside the package (hyperlinks)
    pub external: bool,
}

/// Relationships of one source part, keyed by ID.
///
/// Built once when the part is first needed; read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_id: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Resolve a relationship ID to its target path. `None` is non-fatal
    /// for callers: the element degrades to a placeholder.
    pub fn target(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(|r| r.target.as_str())
    }

    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// The opened document package.
pub struct Package {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl Package {
    /// Open a package from raw bytes.
    ///
    /// Fails with [`Error::MalformedPackage`] if the container cannot be
    /// opened (bad signature, truncated archive).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read a part as raw bytes. Fails with [`Error::MissingPart`] when the
    /// named part is absent.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingPart(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an XML part as a string, decoding UTF-8 or UTF-16 content.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Check whether a part exists.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == path)
    }

    /// List all part paths in the package.
    pub fn list_parts(&self) -> Vec<String> {
        self.archive.borrow().file_names().map(String::from).collect()
    }

    /// Parse the relationship descriptor companion to `part_path`.
    ///
    /// A part with no `.rels` companion simply has no relationships, so a
    /// missing descriptor yields an empty map. A descriptor that exists but
    /// cannot be parsed is [`Error::MalformedRelationships`].
    pub fn relationships_for(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = rels_path_for(part_path);
        let content = match self.read_xml(&rels_path) {
            Ok(c) => c,
            Err(Error::MissingPart(_)) => return Ok(Relationships::new()),
            Err(e) => return Err(e),
        };
        if content.trim().is_empty() {
            return Ok(Relationships::new());
        }

        let mut rels = Relationships::new();
        let mut reader = quick_xml::Reader::from_str(&content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            b"TargetMode" => {
                                external = String::from_utf8_lossy(&attr.value)
                                    .eq_ignore_ascii_case("external")
                            }
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::MalformedRelationships(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Resolve a relationship target relative to its source part.
    ///
    /// `word/document.xml` + `media/image1.png` → `word/media/image1.png`;
    /// absolute targets are rooted at the package.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_dir = Path::new(base).parent().unwrap_or(Path::new(""));
        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }
        result.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("parts", &self.list_parts().len())
            .finish()
    }
}

/// Build the `.rels` companion path for a part.
fn rels_path_for(part_path: &str) -> String {
    if part_path.is_empty() || part_path == "/" {
        return "_rels/.rels".to_string();
    }
    let path = Path::new(part_path);
    let parent = path.parent().unwrap_or(Path::new(""));
    let filename = path.file_name().unwrap_or_default().to_string_lossy();
    if parent.as_os_str().is_empty() {
        format!("_rels/{}.rels", filename)
    } else {
        format!("{}/_rels/{}.rels", parent.display(), filename)
    }
}

/// Decode XML bytes, handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
///
/// Most packages are UTF-8, but older producers emit UTF-16 parts.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 3 && bytes[..3] == [0xEF, 0xBB, 0xBF] {
        return String::from_utf8(bytes[3..].to_vec()).map_err(|e| Error::Encoding(e.to_string()));
    }
    if bytes.len() >= 2 && bytes[..2] == [0xFF, 0xFE] {
        return Ok(fix_encoding_declaration(&decode_utf16(&bytes[2..], u16::from_le_bytes)?));
    }
    if bytes.len() >= 2 && bytes[..2] == [0xFE, 0xFF] {
        return Ok(fix_encoding_declaration(&decode_utf16(&bytes[2..], u16::from_be_bytes)?));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // BOM-less UTF-16 detection: null bytes interleaved with ASCII
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                Ok(fix_encoding_declaration(&decode_utf16(bytes, u16::from_le_bytes)?))
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                Ok(fix_encoding_declaration(&decode_utf16(bytes, u16::from_be_bytes)?))
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| from_bytes([bytes[i], bytes[i + 1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Rewrite `encoding="UTF-16"` in the XML declaration after the content has
/// already been transcoded to UTF-8; quick-xml would otherwise try to
/// re-interpret the string as UTF-16.
fn fix_encoding_declaration(content: &str) -> String {
    if let Some(end) = content.find("?>").filter(|_| content.starts_with("<?xml")) {
        let (decl, rest) = content.split_at(end + 2);
        let fixed = decl
            .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
            .replace("encoding='UTF-16'", "encoding='UTF-8'")
            .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
            .replace("encoding='utf-16'", "encoding='UTF-8'");
        return format!("{}{}", fixed, rest);
    }
    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_rejects_garbage() {
        let err = Package::from_bytes(b"not a zip archive".to_vec()).unwrap_err();
        assert!(matches!(err, Error::MalformedPackage(_)));
    }

    #[test]
    fn test_read_parts() {
        let data = make_package(&[("word/document.xml", b"<w:document/>")]);
        let pkg = Package::from_bytes(data).unwrap();

        assert!(pkg.exists("word/document.xml"));
        assert!(!pkg.exists("word/styles.xml"));
        assert_eq!(pkg.read_xml("word/document.xml").unwrap(), "<w:document/>");
        assert!(matches!(
            pkg.read_binary("missing.bin").unwrap_err(),
            Error::MissingPart(_)
        ));
    }

    #[test]
    fn test_relationships_parsing() {
        let rels = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;
        let data = make_package(&[
            ("word/document.xml", b"<w:document/>"),
            ("word/_rels/document.xml.rels", rels),
        ]);
        let pkg = Package::from_bytes(data).unwrap();
        let rels = pkg.relationships_for("word/document.xml").unwrap();

        assert_eq!(rels.len(), 2);
        assert_eq!(rels.target("rId1"), Some("media/image1.png"));
        assert!(rels.get("rId2").unwrap().external);
        assert!(rels.target("rId9").is_none());
    }

    #[test]
    fn test_missing_rels_is_empty_map() {
        let data = make_package(&[("word/document.xml", b"<w:document/>")]);
        let pkg = Package::from_bytes(data).unwrap();
        let rels = pkg.relationships_for("word/document.xml").unwrap();
        assert!(rels.is_empty());
    }

    #[test]
    fn test_malformed_rels_is_fatal() {
        let data = make_package(&[
            ("word/document.xml", b"<w:document/>"),
            ("word/_rels/document.xml.rels", b"<Relationships><Relationship Id="),
        ]);
        let pkg = Package::from_bytes(data).unwrap();
        let err = pkg.relationships_for("word/document.xml").unwrap_err();
        assert!(matches!(err, Error::MalformedRelationships(_)));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            Package::resolve_path("word/document.xml", "media/image1.png"),
            "word/media/image1.png"
        );
        assert_eq!(
            Package::resolve_path("word/document.xml", "../docProps/thumbnail.jpeg"),
            "docProps/thumbnail.jpeg"
        );
        assert_eq!(
            Package::resolve_path("word/document.xml", "/word/media/image1.png"),
            "word/media/image1.png"
        );
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for("top.xml"), "_rels/top.xml.rels");
    }

    #[test]
    fn test_decode_utf16_variants() {
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        let utf8_bom = b"\xEF\xBB\xBF<?xml>";
        assert_eq!(decode_xml_bytes(utf8_bom).unwrap(), "<?xml>");

        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }
}
