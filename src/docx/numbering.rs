//! Numbering definitions (numbering.xml) feeding list detection.

use crate::error::{Error, Result};
use crate::model::ListKind;
use std::collections::HashMap;

/// An abstract numbering definition with its level formats.
#[derive(Debug, Clone)]
pub struct AbstractNum {
    pub id: String,
    pub levels: Vec<NumLevel>,
}

/// One numbering level definition (0-8).
#[derive(Debug, Clone)]
pub struct NumLevel {
    pub level: u8,
    /// Start value for ordered lists
    pub start: u32,
    /// Number format: decimal, bullet, lowerLetter, ...
    pub num_fmt: String,
}

impl NumLevel {
    pub fn list_kind(&self) -> ListKind {
        match self.num_fmt.as_str() {
            "decimal" | "decimalZero" | "lowerLetter" | "upperLetter" | "lowerRoman"
            | "upperRoman" => ListKind::Numbered,
            _ => ListKind::Bullet,
        }
    }
}

/// All numbering definitions of a document.
///
/// `numId` instances point at abstract definitions; item counters advance
/// in document order as paragraphs claim their numbers.
#[derive(Debug, Clone, Default)]
pub struct NumberingMap {
    abstract_nums: HashMap<String, AbstractNum>,
    /// numId -> abstractNumId
    instances: HashMap<String, String>,
    counters: HashMap<(String, u8), u32>,
}

impl NumberingMap {
    /// Parse numbering.xml.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut map = NumberingMap::default();
        if xml.trim().is_empty() {
            return Ok(map);
        }

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut current_abstract: Option<AbstractNum> = None;
        let mut current_level: Option<NumLevel> = None;
        let mut current_num_id: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                    b"w:abstractNum" => {
                        let id = attr_value(&e, b"w:abstractNumId").unwrap_or_default();
                        current_abstract = Some(AbstractNum {
                            id,
                            levels: Vec::new(),
                        });
                    }
                    b"w:lvl" if current_abstract.is_some() => {
                        let level = attr_value(&e, b"w:ilvl")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                        current_level = Some(NumLevel {
                            level,
                            start: 1,
                            num_fmt: "bullet".to_string(),
                        });
                    }
                    b"w:num" => {
                        current_num_id = attr_value(&e, b"w:numId");
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(e)) => match e.name().as_ref() {
                    b"w:start" => {
                        if let Some(ref mut level) = current_level {
                            if let Some(v) = attr_value(&e, b"w:val").and_then(|v| v.parse().ok()) {
                                level.start = v;
                            }
                        }
                    }
                    b"w:numFmt" => {
                        if let Some(ref mut level) = current_level {
                            if let Some(v) = attr_value(&e, b"w:val") {
                                level.num_fmt = v;
                            }
                        }
                    }
                    b"w:abstractNumId" => {
                        if let (Some(num_id), Some(abstract_id)) =
                            (current_num_id.as_ref(), attr_value(&e, b"w:val"))
                        {
                            map.instances.insert(num_id.clone(), abstract_id);
                        }
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                    b"w:abstractNum" => {
                        if let Some(abstract_num) = current_abstract.take() {
                            map.abstract_nums.insert(abstract_num.id.clone(), abstract_num);
                        }
                    }
                    b"w:lvl" => {
                        if let Some(level) = current_level.take() {
                            if let Some(ref mut abstract_num) = current_abstract {
                                abstract_num.levels.push(level);
                            }
                        }
                    }
                    b"w:num" => current_num_id = None,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Claim list kind and item number for a paragraph at `(num_id, level)`.
    ///
    /// Each call advances the counter for that slot; callers must invoke
    /// this in document order.
    pub fn claim(&mut self, num_id: &str, level: u8) -> Option<(ListKind, u32)> {
        let abstract_id = self.instances.get(num_id)?;
        let abstract_num = self.abstract_nums.get(abstract_id)?;
        let num_level = abstract_num.levels.iter().find(|l| l.level == level)?;

        let kind = num_level.list_kind();
        let counter = self
            .counters
            .entry((num_id.to_string(), level))
            .or_insert(num_level.start);
        let number = *counter;
        *counter += 1;

        Some((kind, number))
    }
}

fn attr_value(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}
