//! Document model builder.
//!
//! Walks the main document body in document order and produces the owned
//! [`Document`] tree, resolving style and relationship references through
//! the catalog and the package relationships. Failures confined to one
//! element degrade that element and record a warning; only a body that is
//! not well-formed XML is fatal.

use crate::error::{Error, Result};
use crate::model::{
    mime_from_path, Block, Cell, Document, Hyperlink, Inline, InlineImage, ListInfo, Metadata,
    Paragraph, Resource, Row, Table, TextRun,
};
use crate::package::{Package, Relationships};
use crate::warning::Warning;
use std::collections::{BTreeSet, HashSet};
use unicode_normalization::UnicodeNormalization;

use super::numbering::NumberingMap;
use super::styles::{parse_alignment, RunOverrides, StyleCatalog, StyleRole};

/// The one part every document package must contain.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Parser for DOCX document packages.
#[derive(Debug)]
pub struct DocxParser {
    package: Package,
    styles: StyleCatalog,
    numbering: NumberingMap,
    relationships: Relationships,
    warnings: Vec<Warning>,
    skipped_kinds: HashSet<String>,
}

impl DocxParser {
    /// Open a parser over raw package bytes.
    ///
    /// Fails fatally when the container cannot be opened, the main document
    /// part is absent, or a structural part (styles, numbering, document
    /// relationships) exists but cannot be parsed.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let package = Package::from_bytes(data)?;
        if !package.exists(DOCUMENT_PART) {
            return Err(Error::MissingPart(DOCUMENT_PART.to_string()));
        }

        let mut warnings = Vec::new();

        let styles = match package.read_xml("word/styles.xml") {
            Ok(xml) => {
                let mut catalog = StyleCatalog::parse(&xml)?;
                catalog.resolve(&mut warnings);
                catalog
            }
            Err(Error::MissingPart(_)) => StyleCatalog::default(),
            Err(e) => return Err(e),
        };

        let numbering = match package.read_xml("word/numbering.xml") {
            Ok(xml) => NumberingMap::parse(&xml)?,
            Err(Error::MissingPart(_)) => NumberingMap::default(),
            Err(e) => return Err(e),
        };

        let relationships = package.relationships_for(DOCUMENT_PART)?;

        Ok(Self {
            package,
            styles,
            numbering,
            relationships,
            warnings,
            skipped_kinds: HashSet::new(),
        })
    }

    /// Parse the package into a document model plus accumulated warnings.
    pub fn parse(mut self) -> Result<(Document, Vec<Warning>)> {
        let mut doc = Document::new();
        doc.metadata = self.parse_metadata();
        doc.blocks = self.parse_body()?;
        self.extract_resources(&mut doc);
        Ok((doc, self.warnings))
    }

    /// Parse core metadata from docProps/core.xml, if present.
    fn parse_metadata(&self) -> Metadata {
        let mut meta = Metadata::default();
        let xml = match self.package.read_xml("docProps/core.xml") {
            Ok(xml) => xml,
            Err(_) => return meta,
        };

        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<String> = None;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => {
                    current = Some(
                        String::from_utf8_lossy(e.name().local_name().as_ref()).to_string(),
                    );
                }
                Ok(quick_xml::events::Event::Text(e)) => {
                    if let Some(ref elem) = current {
                        let text = e.unescape().unwrap_or_default().to_string();
                        match elem.as_str() {
                            "title" => meta.title = Some(text),
                            "creator" => meta.author = Some(text),
                            "created" => meta.created = Some(text),
                            "modified" => meta.modified = Some(text),
                            _ => {}
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(_)) => current = None,
                Ok(quick_xml::events::Event::Eof) | Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        meta
    }

    /// Walk the body in order, slicing each top-level paragraph or table
    /// into its own XML fragment and parsing it.
    fn parse_body(&mut self) -> Result<Vec<Block>> {
        let xml = self.package.read_xml(DOCUMENT_PART)?;
        let mut blocks = Vec::new();

        let mut reader = quick_xml::Reader::from_str(&xml);
        // Run-edge whitespace is significant; text events outside an open
        // fragment are dropped below instead.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_body = false;
        let mut fragment = String::new();
        let mut in_paragraph = false;
        let mut table_depth: u32 = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"w:body" if !in_paragraph && table_depth == 0 => in_body = true,
                    b"w:p" if in_body && !in_paragraph && table_depth == 0 => {
                        in_paragraph = true;
                        fragment.clear();
                        append_start(&mut fragment, e);
                    }
                    b"w:tbl" if in_body && !in_paragraph => {
                        if table_depth == 0 {
                            fragment.clear();
                        }
                        table_depth += 1;
                        append_start(&mut fragment, e);
                    }
                    name => {
                        if in_paragraph || table_depth > 0 {
                            append_start(&mut fragment, e);
                        } else if in_body {
                            self.record_skipped(&String::from_utf8_lossy(name));
                        }
                    }
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => {
                    if in_paragraph || table_depth > 0 {
                        append_empty(&mut fragment, e);
                    }
                }
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_paragraph || table_depth > 0 {
                        let text = e.unescape().unwrap_or_default();
                        fragment.push_str(&escape_xml(&text));
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"w:body" if !in_paragraph && table_depth == 0 => in_body = false,
                    b"w:p" if in_paragraph => {
                        fragment.push_str("</w:p>");
                        in_paragraph = false;
                        let para = self.parse_paragraph(&fragment)?;
                        blocks.push(Block::Paragraph(para));
                    }
                    b"w:tbl" if table_depth > 0 => {
                        fragment.push_str("</w:tbl>");
                        table_depth -= 1;
                        if table_depth == 0 {
                            let table = self.parse_table(&fragment)?;
                            blocks.push(Block::Table(table));
                        }
                    }
                    _ => {
                        if in_paragraph || table_depth > 0 {
                            append_end(&mut fragment, e);
                        }
                    }
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::UnreadableDocumentBody(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(blocks)
    }

    /// Parse one `w:p` fragment into a paragraph node.
    fn parse_paragraph(&mut self, xml: &str) -> Result<Paragraph> {
        let mut para = Paragraph::new();

        // Run defaults inherited from the paragraph's effective style;
        // run-local properties override field by field, never toggling.
        let mut para_run_defaults = RunOverrides::default();
        let mut local_alignment = None;
        let mut num_ref: Option<(String, u8)> = None;

        let mut reader = quick_xml::Reader::from_str(xml);
        // Preserve whitespace from xml:space="preserve" runs.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_ppr = false;
        let mut in_rpr = false;
        let mut in_run = false;
        let mut in_text = false;
        let mut in_instr_text = false;
        let mut in_drawing = false;
        let mut in_num_pr = false;
        let mut run_local = RunOverrides::default();
        let mut image_alt: Option<String> = None;
        // Inline nodes inside an open hyperlink buffer separately.
        let mut link: Option<Hyperlink> = None;
        let mut num_id: Option<String> = None;
        let mut num_level: u8 = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"w:pPr" => in_ppr = true,
                    b"w:rPr" => in_rpr = true,
                    b"w:numPr" if in_ppr => in_num_pr = true,
                    b"w:r" => {
                        in_run = true;
                        run_local = RunOverrides::default();
                    }
                    b"w:t" => in_text = true,
                    b"w:instrText" => {
                        in_instr_text = true;
                        self.record_skipped("w:instrText");
                    }
                    b"w:drawing" => {
                        in_drawing = true;
                        image_alt = None;
                    }
                    b"w:hyperlink" => {
                        let target = self.resolve_hyperlink(e);
                        link = Some(Hyperlink {
                            target,
                            runs: Vec::new(),
                        });
                    }
                    b"w:object" => self.record_skipped("w:object"),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"w:pStyle" if in_ppr => {
                        if let Some(style_id) = attr_value(e, b"w:val") {
                            let fmt = self.styles.effective(Some(&style_id));
                            para_run_defaults = fmt.run.clone();
                            match fmt.role {
                                StyleRole::Heading(level) => para.heading = level,
                                StyleRole::Quote => para.quote = true,
                                StyleRole::Normal => {}
                            }
                            para.alignment = fmt.alignment;
                            para.style_id = Some(style_id);
                        }
                    }
                    b"w:jc" if in_ppr => {
                        local_alignment = attr_value(e, b"w:val").map(|v| parse_alignment(&v));
                    }
                    b"w:shd" if in_ppr && !in_rpr => {
                        if let Some(fill) = shading_fill(e) {
                            para.shading = Some(fill);
                        }
                    }
                    b"w:numId" if in_num_pr => num_id = attr_value(e, b"w:val"),
                    b"w:ilvl" if in_num_pr => {
                        num_level = attr_value(e, b"w:val")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                    }
                    b"w:b" if in_rpr && in_run => {
                        run_local.bold = Some(bool_attr(e).unwrap_or(true));
                    }
                    b"w:i" if in_rpr && in_run => {
                        run_local.italic = Some(bool_attr(e).unwrap_or(true));
                    }
                    b"w:u" if in_rpr && in_run => {
                        if let Some(val) = attr_value(e, b"w:val") {
                            run_local.underline = Some(val != "none");
                        }
                    }
                    b"w:strike" if in_rpr && in_run => {
                        run_local.strikethrough = Some(bool_attr(e).unwrap_or(true));
                    }
                    b"w:sz" if in_rpr && in_run => {
                        run_local.size = attr_value(e, b"w:val").and_then(|v| v.parse().ok());
                    }
                    b"w:color" if in_rpr && in_run => {
                        if let Some(val) = attr_value(e, b"w:val") {
                            if val != "auto" {
                                run_local.color = Some(val);
                            }
                        }
                    }
                    b"w:br" if in_run => {
                        push_inline(&mut para, &mut link, Inline::Break);
                    }
                    b"wp:docPr" if in_drawing => {
                        if let Some(descr) = attr_value(e, b"descr") {
                            image_alt = Some(descr);
                        }
                    }
                    b"a:blip" if in_drawing => {
                        if let Some(rel_id) = attr_value(e, b"r:embed") {
                            push_inline(
                                &mut para,
                                &mut link,
                                Inline::Image(InlineImage {
                                    resource_id: rel_id,
                                    alt_text: image_alt.clone(),
                                }),
                            );
                        }
                    }
                    b"w:footnoteReference" => self.record_skipped("w:footnoteReference"),
                    b"w:endnoteReference" => self.record_skipped("w:endnoteReference"),
                    b"w:commentReference" => self.record_skipped("w:commentReference"),
                    b"w:fldChar" => self.record_skipped("w:fldChar"),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_run && in_text && !in_instr_text {
                        let text: String =
                            e.unescape().unwrap_or_default().nfc().collect();
                        if !text.is_empty() {
                            let mut effective = para_run_defaults.clone();
                            effective.merge(&run_local);
                            let run = TextRun::styled(text, effective.to_text_style());
                            match link {
                                Some(ref mut l) => l.runs.push(run),
                                None => para.inlines.push(Inline::Run(run)),
                            }
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"w:pPr" => in_ppr = false,
                    b"w:rPr" => in_rpr = false,
                    b"w:numPr" => in_num_pr = false,
                    b"w:r" => in_run = false,
                    b"w:t" => in_text = false,
                    b"w:instrText" => in_instr_text = false,
                    b"w:drawing" => {
                        in_drawing = false;
                        image_alt = None;
                    }
                    b"w:hyperlink" => {
                        if let Some(l) = link.take() {
                            if !l.runs.is_empty() {
                                para.inlines.push(Inline::Link(l));
                            }
                        }
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::UnreadableDocumentBody(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if let Some(local) = local_alignment {
            para.alignment = local;
        }

        if let Some(ref nid) = num_id {
            if let Some((kind, number)) = self.numbering.claim(nid, num_level) {
                para.list = Some(ListInfo {
                    kind,
                    num_id: nid.clone(),
                    level: num_level,
                    number: Some(number),
                });
            }
        }

        Ok(para)
    }

    /// Resolve a hyperlink's target: an external relationship URL or an
    /// in-document `#anchor`. Unresolvable IDs degrade to `None`.
    fn resolve_hyperlink(&mut self, e: &quick_xml::events::BytesStart) -> Option<String> {
        if let Some(rel_id) = attr_value(e, b"r:id") {
            return match self.relationships.target(&rel_id) {
                Some(target) => Some(target.to_string()),
                None => {
                    self.warnings.push(Warning::unresolved_relationship(&rel_id));
                    None
                }
            };
        }
        attr_value(e, b"w:anchor").map(|a| format!("#{}", a))
    }

    /// Parse one `w:tbl` fragment, recursing into nested tables.
    fn parse_table(&mut self, xml: &str) -> Result<Table> {
        let mut table = Table::new();

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut current_row: Option<Row> = None;
        let mut current_cell: Option<Cell> = None;
        let mut is_header_row = false;
        let mut in_tc_pr = false;
        let mut skip_cell = false;

        // Paragraphs and nested tables inside a cell are sliced out and
        // parsed through the same entry points as top-level blocks.
        let mut fragment = String::new();
        let mut para_depth: u32 = 0;
        let mut nested_depth: u32 = 0;

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => {
                    let name = e.name();
                    if para_depth > 0 || nested_depth > 0 {
                        append_start(&mut fragment, e);
                        if name.as_ref() == b"w:tbl" {
                            nested_depth += 1;
                        }
                        continue;
                    }
                    match name.as_ref() {
                        b"w:tr" => {
                            current_row = Some(Row::new());
                            is_header_row = false;
                        }
                        b"w:tc" => {
                            current_cell = Some(Cell::new());
                            skip_cell = false;
                        }
                        b"w:tcPr" => in_tc_pr = true,
                        b"w:p" if current_cell.is_some() => {
                            para_depth = 1;
                            fragment.clear();
                            append_start(&mut fragment, e);
                        }
                        b"w:tbl" if current_cell.is_some() => {
                            nested_depth = 1;
                            fragment.clear();
                            append_start(&mut fragment, e);
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Empty(ref e)) => {
                    if para_depth > 0 || nested_depth > 0 {
                        append_empty(&mut fragment, e);
                        continue;
                    }
                    match e.name().as_ref() {
                        b"w:tblHeader" => is_header_row = true,
                        b"w:gridSpan" if in_tc_pr => {
                            if let Some(ref mut cell) = current_cell {
                                cell.col_span = attr_value(e, b"w:val")
                                    .and_then(|v| v.parse().ok())
                                    .unwrap_or(1);
                            }
                        }
                        b"w:vMerge" if in_tc_pr => {
                            // Continuation of a vertical merge renders nothing.
                            if attr_value(e, b"w:val").is_none() {
                                skip_cell = true;
                            }
                        }
                        b"w:shd" if in_tc_pr => {
                            if let Some(ref mut cell) = current_cell {
                                if let Some(fill) = shading_fill(e) {
                                    cell.shading = Some(fill);
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if para_depth > 0 || nested_depth > 0 {
                        let text = e.unescape().unwrap_or_default();
                        fragment.push_str(&escape_xml(&text));
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => {
                    let name = e.name();
                    if nested_depth > 0 {
                        if name.as_ref() == b"w:tbl" {
                            fragment.push_str("</w:tbl>");
                            nested_depth -= 1;
                            if nested_depth == 0 {
                                let nested = self.parse_table(&fragment)?;
                                if let Some(ref mut cell) = current_cell {
                                    cell.blocks.push(Block::Table(nested));
                                }
                            }
                        } else {
                            append_end(&mut fragment, e);
                        }
                        continue;
                    }
                    if para_depth > 0 {
                        if name.as_ref() == b"w:p" {
                            fragment.push_str("</w:p>");
                            para_depth -= 1;
                            let para = self.parse_paragraph(&fragment)?;
                            if let Some(ref mut cell) = current_cell {
                                cell.blocks.push(Block::Paragraph(para));
                            }
                        } else {
                            append_end(&mut fragment, e);
                        }
                        continue;
                    }
                    match name.as_ref() {
                        b"w:tcPr" => in_tc_pr = false,
                        b"w:tc" => {
                            if let Some(mut cell) = current_cell.take() {
                                if !skip_cell {
                                    // An empty cell stays a cell.
                                    if cell.blocks.is_empty() {
                                        cell.blocks.push(Block::Paragraph(Paragraph::new()));
                                    }
                                    if let Some(ref mut row) = current_row {
                                        row.cells.push(cell);
                                    }
                                }
                            }
                        }
                        b"w:tr" => {
                            if let Some(mut row) = current_row.take() {
                                row.is_header = is_header_row;
                                table.add_row(row);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::UnreadableDocumentBody(e.to_string())),
                _ => {}
            }
        }

        Ok(table)
    }

    /// Pull the bytes of every referenced image out of the package.
    ///
    /// Missing relationships and unreadable targets are non-fatal; the
    /// renderer emits a placeholder for resources that never arrive.
    /// Referenced IDs are visited in sorted order so warnings are stable.
    fn extract_resources(&mut self, doc: &mut Document) {
        let mut referenced = BTreeSet::new();
        collect_image_ids(&doc.blocks, &mut referenced);

        for rel_id in referenced {
            let target = match self.relationships.target(&rel_id) {
                Some(t) => t.to_string(),
                None => {
                    self.warnings.push(Warning::missing_image(&rel_id));
                    continue;
                }
            };
            let path = Package::resolve_path(DOCUMENT_PART, &target);
            match self.package.read_binary(&path) {
                Ok(data) => {
                    let mime = mime_from_path(&path).unwrap_or("application/octet-stream");
                    doc.resources.insert(rel_id, Resource::new(mime, data));
                }
                Err(_) => self.warnings.push(Warning::missing_image(&rel_id)),
            }
        }
    }

    /// Record a skipped element kind, one warning per kind.
    fn record_skipped(&mut self, kind: &str) {
        if !matches!(
            kind,
            "w:sectPr" | "w:bookmarkStart" | "w:bookmarkEnd" | "w:proofErr"
        ) && self.skipped_kinds.insert(kind.to_string())
        {
            self.warnings.push(Warning::unsupported_element(kind));
        }
    }
}

/// Push an inline node into the open hyperlink, or the paragraph itself.
fn push_inline(para: &mut Paragraph, link: &mut Option<Hyperlink>, inline: Inline) {
    match link.take() {
        None => para.inlines.push(inline),
        Some(mut open) => match inline {
            Inline::Run(run) => {
                open.runs.push(run);
                *link = Some(open);
            }
            // A non-run inline splits the link, keeping document order.
            other => {
                let target = open.target.clone();
                if !open.runs.is_empty() {
                    para.inlines.push(Inline::Link(open));
                }
                para.inlines.push(other);
                *link = Some(Hyperlink {
                    target,
                    runs: Vec::new(),
                });
            }
        },
    }
}

/// Walk the block tree collecting image relationship IDs.
fn collect_image_ids(blocks: &[Block], out: &mut BTreeSet<String>) {
    for block in blocks {
        match block {
            Block::Paragraph(para) => {
                for inline in &para.inlines {
                    if let Inline::Image(img) = inline {
                        out.insert(img.resource_id.clone());
                    }
                }
            }
            Block::Table(table) => {
                for row in &table.rows {
                    for cell in &row.cells {
                        collect_image_ids(&cell.blocks, out);
                    }
                }
            }
        }
    }
}

/// Extract a `w:shd` fill, ignoring auto/none.
fn shading_fill(e: &quick_xml::events::BytesStart) -> Option<String> {
    let fill = attr_value(e, b"w:fill")?.to_uppercase();
    if fill.is_empty() || fill == "AUTO" || fill == "NONE" {
        None
    } else {
        Some(fill)
    }
}

fn attr_value(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Toggle-style boolean attribute: absent w:val means "on".
fn bool_attr(e: &quick_xml::events::BytesStart) -> Option<bool> {
    attr_value(e, b"w:val").map(|v| v != "0" && v != "false")
}

fn append_start(out: &mut String, e: &quick_xml::events::BytesStart) {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    append_attrs(out, e);
    out.push('>');
}

fn append_empty(out: &mut String, e: &quick_xml::events::BytesStart) {
    out.push('<');
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    append_attrs(out, e);
    out.push_str("/>");
}

fn append_end(out: &mut String, e: &quick_xml::events::BytesEnd) {
    out.push_str("</");
    out.push_str(&String::from_utf8_lossy(e.name().as_ref()));
    out.push('>');
}

fn append_attrs(out: &mut String, e: &quick_xml::events::BytesStart) {
    for attr in e.attributes().flatten() {
        out.push(' ');
        out.push_str(&String::from_utf8_lossy(attr.key.as_ref()));
        out.push_str("=\"");
        out.push_str(&escape_xml(&String::from_utf8_lossy(&attr.value)));
        out.push('"');
    }
}

/// Escape XML special characters when re-assembling fragments.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, ListKind, TextAlignment};
    use crate::warning::WarningKind;
    use std::io::{Cursor, Write};

    const W_NS: &str =
        r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn package_bytes(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document {}><w:body>{}</w:body></w:document>"#,
            W_NS, body
        )
    }

    fn parse(body: &str) -> (Document, Vec<Warning>) {
        let data = package_bytes(&[(DOCUMENT_PART, document_xml(body).as_bytes())]);
        DocxParser::from_bytes(data).unwrap().parse().unwrap()
    }

    #[test]
    fn test_missing_document_part_is_fatal() {
        let data = package_bytes(&[("word/styles.xml", b"<w:styles/>")]);
        let err = DocxParser::from_bytes(data).unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_parse_plain_paragraph() {
        let (doc, warnings) = parse(r#"<w:p><w:r><w:t>Hello world.</w:t></w:r></w:p>"#);
        assert!(warnings.is_empty());
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.plain_text(), "Hello world.");
    }

    #[test]
    fn test_run_formatting_composes_with_style() {
        let styles = br#"<w:styles xmlns:w="http://x">
            <w:style w:styleId="Em"><w:name w:val="Em"/><w:rPr><w:b/><w:i/></w:rPr></w:style>
        </w:styles>"#;
        let body = r#"<w:p>
            <w:pPr><w:pStyle w:val="Em"/></w:pPr>
            <w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>text</w:t></w:r>
        </w:p>"#;
        let data = package_bytes(&[
            (DOCUMENT_PART, document_xml(body).as_bytes()),
            ("word/styles.xml", styles),
        ]);
        let (doc, _) = DocxParser::from_bytes(data).unwrap().parse().unwrap();

        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        let Inline::Run(ref run) = para.inlines[0] else {
            panic!("expected run")
        };
        // Local override turns bold off; italic inherits from the style.
        assert!(!run.style.bold);
        assert!(run.style.italic);
    }

    #[test]
    fn test_heading_from_style() {
        let styles = br#"<w:styles xmlns:w="http://x">
            <w:style w:styleId="Heading1"><w:name w:val="heading 1"/>
                <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
            </w:style>
        </w:styles>"#;
        let body = r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Overview</w:t></w:r></w:p>"#;
        let data = package_bytes(&[
            (DOCUMENT_PART, document_xml(body).as_bytes()),
            ("word/styles.xml", styles),
        ]);
        let (doc, warnings) = DocxParser::from_bytes(data).unwrap().parse().unwrap();
        assert!(warnings.is_empty());

        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        assert_eq!(para.heading, HeadingLevel::H1);
    }

    #[test]
    fn test_unknown_style_is_default_formatting() {
        let (doc, warnings) =
            parse(r#"<w:p><w:pPr><w:pStyle w:val="S1"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#);
        assert!(warnings.is_empty());
        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        assert_eq!(para.heading, HeadingLevel::None);
        assert_eq!(para.alignment, TextAlignment::Left);
    }

    #[test]
    fn test_local_alignment_overrides_style() {
        let (doc, _) = parse(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>centered</w:t></w:r></w:p>"#,
        );
        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        assert_eq!(para.alignment, TextAlignment::Center);
    }

    #[test]
    fn test_list_info_from_numbering() {
        let numbering = br#"<w:numbering xmlns:w="http://x">
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/></w:lvl>
            </w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
        </w:numbering>"#;
        let body = r#"
            <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>first</w:t></w:r></w:p>
            <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>second</w:t></w:r></w:p>"#;
        let data = package_bytes(&[
            (DOCUMENT_PART, document_xml(body).as_bytes()),
            ("word/numbering.xml", numbering),
        ]);
        let (doc, _) = DocxParser::from_bytes(data).unwrap().parse().unwrap();

        let numbers: Vec<u32> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => p.list.as_ref(),
                _ => None,
            })
            .map(|l| {
                assert_eq!(l.kind, ListKind::Numbered);
                l.number.unwrap()
            })
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_run_edge_whitespace_survives() {
        let body = r#"<w:p><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>world</w:t></w:r></w:p>"#;
        let (doc, warnings) = parse(body);
        assert!(warnings.is_empty());
        assert_eq!(doc.plain_text(), "Hello world");
    }

    #[test]
    fn test_run_edge_whitespace_survives_in_table_cell() {
        let body = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t xml:space="preserve">one </w:t></w:r><w:r><w:t>two</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        let (doc, _) = parse(body);
        let Block::Table(ref table) = doc.blocks[0] else {
            panic!("expected table")
        };
        assert_eq!(table.rows[0].cells[0].plain_text(), "one two");
    }

    #[test]
    fn test_hyperlink_resolution() {
        let rels = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://t/hyperlink" Target="https://example.com" TargetMode="External"/>
        </Relationships>"#;
        let body = r#"<w:p><w:hyperlink r:id="rId1"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#;
        let data = package_bytes(&[
            (DOCUMENT_PART, document_xml(body).as_bytes()),
            ("word/_rels/document.xml.rels", rels),
        ]);
        let (doc, warnings) = DocxParser::from_bytes(data).unwrap().parse().unwrap();
        assert!(warnings.is_empty());

        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        let Inline::Link(ref link) = para.inlines[0] else {
            panic!("expected link")
        };
        assert_eq!(link.target.as_deref(), Some("https://example.com"));
        assert_eq!(link.plain_text(), "link");
    }

    #[test]
    fn test_unresolved_hyperlink_degrades() {
        let (doc, warnings) =
            parse(r#"<w:p><w:hyperlink r:id="rId9"><w:r><w:t>orphan</w:t></w:r></w:hyperlink></w:p>"#);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnresolvedRelationship);

        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        let Inline::Link(ref link) = para.inlines[0] else {
            panic!("expected link")
        };
        assert!(link.target.is_none());
        assert_eq!(link.plain_text(), "orphan");
    }

    #[test]
    fn test_break_inside_hyperlink_keeps_order() {
        let rels = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://t/hyperlink" Target="https://example.com" TargetMode="External"/>
        </Relationships>"#;
        let body = r#"<w:p><w:hyperlink r:id="rId1"><w:r><w:t>one</w:t></w:r><w:r><w:br/></w:r><w:r><w:t>two</w:t></w:r></w:hyperlink></w:p>"#;
        let data = package_bytes(&[
            (DOCUMENT_PART, document_xml(body).as_bytes()),
            ("word/_rels/document.xml.rels", rels),
        ]);
        let (doc, _) = DocxParser::from_bytes(data).unwrap().parse().unwrap();

        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        // The break lands between two halves of the link, both still linked.
        assert_eq!(para.inlines.len(), 3);
        let Inline::Link(ref before) = para.inlines[0] else {
            panic!("expected link before the break")
        };
        assert!(matches!(para.inlines[1], Inline::Break));
        let Inline::Link(ref after) = para.inlines[2] else {
            panic!("expected link after the break")
        };
        assert_eq!(before.plain_text(), "one");
        assert_eq!(after.plain_text(), "two");
        assert_eq!(before.target, after.target);
    }

    #[test]
    fn test_image_extraction() {
        let rels = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://t/image" Target="media/image1.png"/>
        </Relationships>"#;
        let body = r#"<w:p><w:r><w:drawing><wp:inline><wp:docPr id="1" name="p" descr="a chart"/><a:blip r:embed="rId1"/></wp:inline></w:drawing></w:r></w:p>"#;
        let png = [0x89u8, 0x50, 0x4E, 0x47];
        let data = package_bytes(&[
            (DOCUMENT_PART, document_xml(body).as_bytes()),
            ("word/_rels/document.xml.rels", rels),
            ("word/media/image1.png", &png),
        ]);
        let (doc, warnings) = DocxParser::from_bytes(data).unwrap().parse().unwrap();
        assert!(warnings.is_empty());

        let resource = doc.resource("rId1").unwrap();
        assert_eq!(resource.mime_type, "image/png");
        assert_eq!(resource.data, png);

        let Block::Paragraph(ref para) = doc.blocks[0] else {
            panic!("expected paragraph")
        };
        let Inline::Image(ref img) = para.inlines[0] else {
            panic!("expected image")
        };
        assert_eq!(img.alt_text.as_deref(), Some("a chart"));
    }

    #[test]
    fn test_missing_image_is_single_warning() {
        let body = r#"
            <w:p><w:r><w:t>before</w:t></w:r></w:p>
            <w:p><w:r><w:drawing><wp:inline><a:blip r:embed="rId5"/></wp:inline></w:drawing></w:r></w:p>
            <w:p><w:r><w:t>after</w:t></w:r></w:p>"#;
        let (doc, warnings) = parse(body);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingImage);
        assert!(doc.resources.is_empty());
        assert_eq!(doc.blocks.len(), 3);
        assert!(doc.plain_text().contains("before"));
        assert!(doc.plain_text().contains("after"));
    }

    #[test]
    fn test_table_with_empty_cell() {
        let body = r#"<w:tbl>
            <w:tr>
                <w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>
                <w:tc><w:p/></w:tc>
            </w:tr>
        </w:tbl>"#;
        let (doc, _) = parse(body);

        let Block::Table(ref table) = doc.blocks[0] else {
            panic!("expected table")
        };
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert!(table.rows[0].cells[1].is_empty());
    }

    #[test]
    fn test_nested_table() {
        let body = r#"<w:tbl><w:tr><w:tc>
            <w:p><w:r><w:t>outer</w:t></w:r></w:p>
            <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
        </w:tc></w:tr></w:tbl>"#;
        let (doc, _) = parse(body);

        let Block::Table(ref table) = doc.blocks[0] else {
            panic!("expected table")
        };
        let cell = &table.rows[0].cells[0];
        assert_eq!(cell.blocks.len(), 2);
        assert!(matches!(cell.blocks[1], Block::Table(_)));
        assert!(cell.plain_text().contains("inner"));
    }

    #[test]
    fn test_cell_shading_captured() {
        let body = r#"<w:tbl><w:tr><w:tc>
            <w:tcPr><w:shd w:val="clear" w:fill="1E4D8C"/></w:tcPr>
            <w:p><w:r><w:t>label</w:t></w:r></w:p>
        </w:tc></w:tr></w:tbl>"#;
        let (doc, _) = parse(body);

        let Block::Table(ref table) = doc.blocks[0] else {
            panic!("expected table")
        };
        assert_eq!(table.rows[0].cells[0].shading.as_deref(), Some("1E4D8C"));
    }

    #[test]
    fn test_unsupported_kind_warned_once() {
        let body = r#"
            <w:p><w:r><w:footnoteReference w:id="1"/><w:t>a</w:t></w:r></w:p>
            <w:p><w:r><w:footnoteReference w:id="2"/><w:t>b</w:t></w:r></w:p>"#;
        let (_, warnings) = parse(body);
        let skipped: Vec<_> = warnings
            .iter()
            .filter(|w| w.kind == WarningKind::UnsupportedElement)
            .collect();
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].message.contains("w:footnoteReference"));
    }

    #[test]
    fn test_malformed_body_is_fatal() {
        // A mismatched end tag trips the reader's end-name check.
        let data = package_bytes(&[(
            DOCUMENT_PART,
            b"<w:document><w:body></w:p></w:document>" as &[u8],
        )]);
        let err = DocxParser::from_bytes(data).unwrap().parse().unwrap_err();
        assert!(matches!(err, Error::UnreadableDocumentBody(_)));
    }
}
