//! Style catalog: parsing styles.xml and resolving inheritance chains.
//!
//! Parsing keeps `based-on` references as raw IDs; a second pass walks each
//! chain root-ward with a visited set and computes the effective formatting
//! per style. Child attributes override ancestor attributes field by field,
//! mirroring cascading resolution. A chain that revisits an ID terminates
//! with a [`WarningKind::CyclicStyle`] notice and the style keeps only its
//! directly declared attributes.

use crate::error::{Error, Result};
use crate::model::{HeadingLevel, TextAlignment, TextStyle};
use crate::warning::Warning;
use std::collections::{BTreeMap, HashMap, HashSet};

#[cfg(test)]
use crate::warning::WarningKind;

/// Semantic role a style assigns to its paragraphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StyleRole {
    #[default]
    Normal,
    Heading(HeadingLevel),
    Quote,
}

/// Optional run-property overrides declared by one style.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub size: Option<u32>,
    pub color: Option<String>,
}

impl RunOverrides {
    /// Merge `other` on top; present fields in `other` win.
    pub fn merge(&mut self, other: &RunOverrides) {
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.strikethrough.is_some() {
            self.strikethrough = other.strikethrough;
        }
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.color.is_some() {
            self.color = other.color.clone();
        }
    }

    /// Collapse into concrete flags, absent fields defaulting off.
    pub fn to_text_style(&self) -> TextStyle {
        TextStyle {
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
            underline: self.underline.unwrap_or(false),
            strikethrough: self.strikethrough.unwrap_or(false),
            size: self.size,
            color: self.color.clone(),
        }
    }
}

/// One style definition as declared, inheritance unresolved.
#[derive(Debug, Clone, Default)]
pub struct RawStyle {
    pub id: String,
    pub name: String,
    pub based_on: Option<String>,
    pub run: RunOverrides,
    pub alignment: Option<TextAlignment>,
    pub outline_level: Option<u8>,
}

impl RawStyle {
    /// Role declared by this style alone: outline level first, then
    /// well-known style names.
    fn declared_role(&self) -> Option<StyleRole> {
        if let Some(level) = self.outline_level {
            let heading = HeadingLevel::from_number(level + 1);
            if heading.is_heading() {
                return Some(StyleRole::Heading(heading));
            }
        }
        let name = self.name.to_lowercase();
        if name == "title" {
            return Some(StyleRole::Heading(HeadingLevel::H1));
        }
        if name == "subtitle" {
            return Some(StyleRole::Heading(HeadingLevel::H2));
        }
        if let Some(n) = name.strip_prefix("heading ").and_then(|s| s.parse::<u8>().ok()) {
            let heading = HeadingLevel::from_number(n);
            if heading.is_heading() {
                return Some(StyleRole::Heading(heading));
            }
        }
        if name == "quote" || name == "intense quote" || name == "block text" {
            return Some(StyleRole::Quote);
        }
        None
    }
}

/// Effective formatting for one style after inheritance resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFormatting {
    /// Run defaults paragraphs of this style start from
    pub run: RunOverrides,
    pub alignment: TextAlignment,
    pub role: StyleRole,
}

/// All styles of a document, with effective formatting per ID.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: BTreeMap<String, RawStyle>,
    resolved: HashMap<String, ResolvedFormatting>,
    default_formatting: ResolvedFormatting,
}

impl StyleCatalog {
    /// Parse styles.xml. Inheritance stays unresolved until
    /// [`StyleCatalog::resolve`] runs.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut catalog = StyleCatalog::default();
        if xml.trim().is_empty() {
            return Ok(catalog);
        }

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<RawStyle> = None;
        let mut in_ppr = false;
        let mut in_rpr = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"w:style" => {
                        let mut style = RawStyle::default();
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"w:styleId" {
                                style.id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                        current = Some(style);
                    }
                    b"w:pPr" if current.is_some() => in_ppr = true,
                    b"w:rPr" if current.is_some() => in_rpr = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(e)) => {
                    if let Some(ref mut style) = current {
                        match e.name().as_ref() {
                            b"w:name" => {
                                if let Some(val) = attr_value(&e, b"w:val") {
                                    style.name = val;
                                }
                            }
                            b"w:basedOn" => {
                                style.based_on = attr_value(&e, b"w:val");
                            }
                            b"w:outlineLvl" if in_ppr => {
                                style.outline_level =
                                    attr_value(&e, b"w:val").and_then(|v| v.parse().ok());
                            }
                            b"w:jc" if in_ppr => {
                                style.alignment =
                                    attr_value(&e, b"w:val").map(|v| parse_alignment(&v));
                            }
                            b"w:b" if in_rpr => {
                                style.run.bold = Some(bool_attr(&e).unwrap_or(true));
                            }
                            b"w:i" if in_rpr => {
                                style.run.italic = Some(bool_attr(&e).unwrap_or(true));
                            }
                            b"w:u" if in_rpr => {
                                if let Some(val) = attr_value(&e, b"w:val") {
                                    style.run.underline = Some(val != "none");
                                }
                            }
                            b"w:strike" if in_rpr => {
                                style.run.strikethrough = Some(bool_attr(&e).unwrap_or(true));
                            }
                            b"w:sz" if in_rpr => {
                                style.run.size =
                                    attr_value(&e, b"w:val").and_then(|v| v.parse().ok());
                            }
                            b"w:color" if in_rpr => {
                                if let Some(val) = attr_value(&e, b"w:val") {
                                    if val != "auto" {
                                        style.run.color = Some(val);
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"w:style" => {
                        if let Some(style) = current.take() {
                            if !style.id.is_empty() {
                                catalog.styles.insert(style.id.clone(), style);
                            }
                        }
                        in_ppr = false;
                        in_rpr = false;
                    }
                    b"w:pPr" => in_ppr = false,
                    b"w:rPr" => in_rpr = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(catalog)
    }

    /// Second pass: compute effective formatting for every style.
    ///
    /// Styles resolve in ID order, so warning order is deterministic.
    pub fn resolve(&mut self, warnings: &mut Vec<Warning>) {
        let mut resolved = HashMap::with_capacity(self.styles.len());
        for id in self.styles.keys() {
            resolved.insert(id.clone(), self.resolve_one(id, warnings));
        }
        self.resolved = resolved;
    }

    /// Effective formatting for a style ID. Absent or unknown IDs get the
    /// built-in normal-text formatting.
    pub fn effective(&self, style_id: Option<&str>) -> &ResolvedFormatting {
        style_id
            .and_then(|id| self.resolved.get(id))
            .unwrap_or(&self.default_formatting)
    }

    /// Heading level a style assigns, `None` level for non-headings.
    pub fn heading_level(&self, style_id: &str) -> HeadingLevel {
        match self.effective(Some(style_id)).role {
            StyleRole::Heading(level) => level,
            _ => HeadingLevel::None,
        }
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Walk one inheritance chain entry-to-root, guarding against cycles.
    fn resolve_one(&self, id: &str, warnings: &mut Vec<Warning>) -> ResolvedFormatting {
        let entry = &self.styles[id];

        // Chain from entry toward the root, cut short on a revisit.
        let mut chain: Vec<&RawStyle> = vec![entry];
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut next = entry.based_on.as_deref();
        while let Some(base_id) = next {
            if !visited.insert(base_id) {
                warnings.push(Warning::cyclic_style(id));
                chain.truncate(1);
                break;
            }
            match self.styles.get(base_id) {
                Some(base) => {
                    chain.push(base);
                    next = base.based_on.as_deref();
                }
                // Unknown base terminates the chain quietly; the style
                // still resolves from what is declared.
                None => break,
            }
        }

        // Fold root-down so nearer styles override field by field.
        let mut run = RunOverrides::default();
        for style in chain.iter().rev() {
            run.merge(&style.run);
        }
        let alignment = chain
            .iter()
            .find_map(|s| s.alignment)
            .unwrap_or_default();
        let role = chain
            .iter()
            .find_map(|s| s.declared_role())
            .unwrap_or_default();

        ResolvedFormatting { run, alignment, role }
    }
}

/// Map a `w:jc` value to an alignment.
pub fn parse_alignment(val: &str) -> TextAlignment {
    match val {
        "center" => TextAlignment::Center,
        "right" | "end" => TextAlignment::Right,
        "both" | "distribute" => TextAlignment::Justify,
        _ => TextAlignment::Left,
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
