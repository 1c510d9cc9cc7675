//! Document and block-level model structures.

use super::{Paragraph, Resource, Table};
use serde::Serialize;
use std::collections::BTreeMap;

/// Document metadata from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

/// A top-level content block.
///
/// The document root owns a single ordered sequence of these; the tree has
/// no shared ownership and no cycles.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// A fully parsed document: block tree plus extracted image resources.
///
/// Resources are keyed by relationship ID in a `BTreeMap` so iteration
/// order, and therefore rendered output, is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub metadata: Metadata,

    #[serde(default)]
    pub blocks: Vec<Block>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub resources: BTreeMap<String, Resource>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Extract all text content as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(para) => {
                    text.push_str(&para.plain_text());
                    text.push('\n');
                }
                Block::Table(table) => {
                    text.push_str(&table.plain_text());
                    text.push('\n');
                }
            }
        }
        text.trim().to_string()
    }

    /// Convert the model to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
