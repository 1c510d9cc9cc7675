//! Table model structures.

use super::document::Block;
use super::Paragraph;
use serde::Serialize;

/// A cell in a table.
///
/// Cells own block nodes, so nested tables recurse naturally. An empty
/// cell is represented as a cell with one empty paragraph, never omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cell {
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Horizontal span (colspan)
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub col_span: u32,

    /// Background fill (hex), from `w:shd`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<String>,
}

fn default_span() -> u32 {
    1
}

fn is_default_span(n: &u32) -> bool {
    *n == 1
}

impl Cell {
    pub fn new() -> Self {
        Self {
            col_span: 1,
            ..Default::default()
        }
    }

    /// Create a cell with text content.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::Paragraph(Paragraph::with_text(text))],
            col_span: 1,
            ..Default::default()
        }
    }

    /// Get the plain text content, paragraphs joined by newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Paragraph(p) => p.plain_text(),
                Block::Table(t) => t.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| match b {
            Block::Paragraph(p) => p.is_empty(),
            Block::Table(t) => t.is_empty(),
        })
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A table: an ordered sequence of rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count from the widest row, accounting for spans.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.col_span as usize).sum())
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get plain text representation, cells tab-separated.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(|c| c.plain_text()).collect();
            text.push_str(&cells.join("\t"));
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        let cell = Cell::with_text("Hello");
        assert_eq!(cell.plain_text(), "Hello");
        assert!(!cell.is_empty());
        assert!(Cell::new().is_empty());
    }

    #[test]
    fn test_table_shape() {
        let mut table = Table::new();
        let mut row = Row::new();
        row.add_cell(Cell::with_text("A"));
        let mut wide = Cell::with_text("B");
        wide.col_span = 2;
        row.add_cell(wide);
        table.add_row(row);

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_nested_table_text() {
        let inner = {
            let mut t = Table::new();
            let mut r = Row::new();
            r.add_cell(Cell::with_text("inner"));
            t.add_row(r);
            t
        };
        let mut cell = Cell::new();
        cell.blocks.push(Block::Table(inner));

        assert!(cell.plain_text().contains("inner"));
        assert!(!cell.is_empty());
    }
}
