//! Document tree to HTML body rendering.
//!
//! Rendering is pure: identical documents and options produce identical
//! markup. Heading anchors and the table of contents are assigned in
//! document order.

use crate::model::{
    Block, Cell, Document, Hyperlink, Inline, InlineImage, ListInfo, ListKind, Paragraph, Table,
    TextAlignment, TextRun,
};
use std::collections::HashMap;
use std::fmt::Write;

use super::options::PageOptions;
use super::page::{escape_html, fill_class, fill_is_dark};

/// One table-of-contents entry, in document order.
#[derive(Debug, Clone)]
struct TocEntry {
    level: u8,
    text: String,
    slug: String,
}

/// Renders a document model into an HTML body fragment.
pub struct HtmlRenderer<'a> {
    doc: &'a Document,
    options: &'a PageOptions,
    used_slugs: HashMap<String, u32>,
    toc: Vec<TocEntry>,
    // Open list nesting, innermost last. Grouping keys on the list
    // identifier too: a new numId opens a fresh container.
    list_stack: Vec<(ListKind, String)>,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(doc: &'a Document, options: &'a PageOptions) -> Self {
        Self {
            doc,
            options,
            used_slugs: HashMap::new(),
            toc: Vec::new(),
            list_stack: Vec::new(),
        }
    }

    /// Render the body fragment, table of contents included when enabled.
    pub fn render_body(&mut self) -> String {
        let mut out = String::new();
        for block in &self.doc.blocks {
            match block {
                Block::Paragraph(para) => self.render_paragraph(&mut out, para),
                Block::Table(table) => {
                    self.close_lists(&mut out, 0);
                    self.render_table(&mut out, table);
                }
            }
        }
        self.close_lists(&mut out, 0);

        if self.options.table_of_contents && !self.toc.is_empty() {
            let mut with_toc = self.render_toc();
            with_toc.push_str(&out);
            return with_toc;
        }
        out
    }

    fn render_toc(&self) -> String {
        let mut out = String::from("<nav class=\"toc\">\n<div class=\"toc-title\">Contents</div>\n<ol>\n");
        for entry in &self.toc {
            let _ = writeln!(
                out,
                "<li class=\"toc-{}\"><a href=\"#{}\">{}</a></li>",
                entry.level,
                entry.slug,
                escape_html(&entry.text)
            );
        }
        out.push_str("</ol>\n</nav>\n");
        out
    }

    fn render_paragraph(&mut self, out: &mut String, para: &Paragraph) {
        if let Some(ref list) = para.list {
            self.render_list_item(out, para, list);
            return;
        }
        self.close_lists(out, 0);

        if para.inlines.is_empty() {
            return;
        }
        let inner = self.render_inlines(&para.inlines);

        if para.heading.is_heading() {
            let level = para.heading.level().min(self.options.max_heading_level);
            let text = para.plain_text();
            let slug = self.claim_slug(&text);
            self.toc.push(TocEntry {
                level,
                text,
                slug: slug.clone(),
            });
            let _ = writeln!(out, "<h{level} id=\"{slug}\">{inner}</h{level}>");
            return;
        }

        if para.quote {
            let _ = writeln!(out, "<blockquote>{}</blockquote>", inner);
            return;
        }

        if let Some(ref fill) = para.shading {
            if fill_is_dark(fill) {
                let class = fill_class(fill).unwrap_or("fill-navy");
                let _ = writeln!(out, "<div class=\"shaded-para {}\">{}</div>", class, inner);
                return;
            }
        }

        match alignment_class(para.alignment) {
            Some(class) => {
                let _ = writeln!(out, "<p class=\"{}\">{}</p>", class, inner);
            }
            None => {
                let _ = writeln!(out, "<p>{}</p>", inner);
            }
        }
    }

    /// Consecutive list paragraphs group into (nested) `ul`/`ol` elements;
    /// any other block closes every open list.
    fn render_list_item(&mut self, out: &mut String, para: &Paragraph, list: &ListInfo) {
        let depth = list.level as usize + 1;

        while self.list_stack.len() > depth {
            self.close_one_list(out);
        }
        if self.list_stack.len() == depth {
            let same = self
                .list_stack
                .last()
                .is_some_and(|(kind, id)| *kind == list.kind && *id == list.num_id);
            if !same {
                self.close_one_list(out);
            }
        }
        while self.list_stack.len() < depth {
            self.open_one_list(out, list);
        }

        let inner = self.render_inlines(&para.inlines);
        let _ = writeln!(out, "<li>{}</li>", inner);
    }

    fn open_one_list(&mut self, out: &mut String, list: &ListInfo) {
        match list.kind {
            ListKind::Bullet => out.push_str("<ul>\n"),
            ListKind::Numbered => match list.number {
                // Opening at an item other than 1 keeps the counter.
                Some(n) if n > 1 && self.list_stack.len() == list.level as usize => {
                    let _ = writeln!(out, "<ol start=\"{}\">", n);
                }
                _ => out.push_str("<ol>\n"),
            },
        }
        self.list_stack.push((list.kind, list.num_id.clone()));
    }

    fn close_one_list(&mut self, out: &mut String) {
        match self.list_stack.pop() {
            Some((ListKind::Bullet, _)) => out.push_str("</ul>\n"),
            Some((ListKind::Numbered, _)) => out.push_str("</ol>\n"),
            None => {}
        }
    }

    fn close_lists(&mut self, out: &mut String, depth: usize) {
        while self.list_stack.len() > depth {
            self.close_one_list(out);
        }
    }

    fn render_inlines(&self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        for inline in inlines {
            match inline {
                Inline::Run(run) => out.push_str(&render_run(run)),
                Inline::Link(link) => out.push_str(&self.render_link(link)),
                Inline::Image(img) => out.push_str(&self.render_image(img)),
                Inline::Break => out.push_str("<br>"),
            }
        }
        out
    }

    fn render_link(&self, link: &Hyperlink) -> String {
        let inner: String = link.runs.iter().map(render_run).collect();
        match link.target {
            Some(ref target) => {
                format!("<a href=\"{}\">{}</a>", escape_html(target), inner)
            }
            // Unresolved target renders the text un-linked.
            None => inner,
        }
    }

    /// Embed the image as a data URI, or a labelled placeholder when its
    /// bytes never made it out of the package.
    fn render_image(&self, img: &InlineImage) -> String {
        let alt = img.alt_text.as_deref().unwrap_or("");
        match self.doc.resource(&img.resource_id) {
            Some(resource) => format!(
                "<img src=\"{}\" alt=\"{}\">",
                resource.data_uri(),
                escape_html(alt)
            ),
            None => {
                let label = if alt.is_empty() { "image unavailable" } else { alt };
                format!(
                    "<span class=\"missing-image\">{}</span>",
                    escape_html(label)
                )
            }
        }
    }

    fn render_table(&mut self, out: &mut String, table: &Table) {
        if table.is_empty() {
            return;
        }
        out.push_str("<div class=\"table-wrap\">\n<table>\n");
        for (index, row) in table.rows.iter().enumerate() {
            let header = row.is_header || index == 0;
            out.push_str("<tr>\n");
            for cell in &row.cells {
                self.render_cell(out, cell, header);
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table>\n</div>\n");
    }

    fn render_cell(&mut self, out: &mut String, cell: &Cell, header: bool) {
        let tag = if header { "th" } else { "td" };
        out.push('<');
        out.push_str(tag);
        if cell.col_span > 1 {
            let _ = write!(out, " colspan=\"{}\"", cell.col_span);
        }
        if !header {
            if let Some(ref fill) = cell.shading {
                match fill_class(fill) {
                    Some(class) => {
                        let _ = write!(out, " class=\"{}\"", class);
                    }
                    None => {
                        let _ = write!(out, " style=\"background:#{}\"", escape_html(fill));
                    }
                }
            }
        }
        out.push('>');

        // Cell content reuses the block renderer, nested tables included.
        for block in &cell.blocks {
            match block {
                Block::Paragraph(para) => self.render_paragraph(out, para),
                Block::Table(nested) => {
                    self.close_lists(out, 0);
                    self.render_table(out, nested);
                }
            }
        }
        self.close_lists(out, 0);

        let _ = writeln!(out, "</{}>", tag);
    }

    /// Claim a unique anchor slug for a heading.
    fn claim_slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.used_slugs.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, count)
        }
    }
}

fn render_run(run: &TextRun) -> String {
    let mut html = escape_html(&run.text);
    if run.style.strikethrough {
        html = format!("<s>{}</s>", html);
    }
    if run.style.underline {
        html = format!("<u>{}</u>", html);
    }
    if run.style.italic {
        html = format!("<em>{}</em>", html);
    }
    if run.style.bold {
        html = format!("<strong>{}</strong>", html);
    }
    if let Some(ref color) = run.style.color {
        html = format!(
            "<span style=\"color:#{}\">{}</span>",
            escape_html(color),
            html
        );
    }
    html
}

fn alignment_class(alignment: TextAlignment) -> Option<&'static str> {
    match alignment {
        TextAlignment::Left => None,
        TextAlignment::Center => Some("align-center"),
        TextAlignment::Right => Some("align-right"),
        TextAlignment::Justify => Some("align-justify"),
    }
}

/// Lowercased, hyphen-joined anchor form of a heading.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, HeadingLevel, Row, TextStyle};

    fn render(doc: &Document) -> String {
        let options = PageOptions::default();
        HtmlRenderer::new(doc, &options).render_body()
    }

    fn heading(level: HeadingLevel, text: &str) -> Block {
        Block::Paragraph(Paragraph::heading(level, text))
    }

    fn list_item(text: &str, kind: ListKind, level: u8, number: Option<u32>) -> Block {
        numbered_item(text, kind, "1", level, number)
    }

    fn numbered_item(
        text: &str,
        kind: ListKind,
        num_id: &str,
        level: u8,
        number: Option<u32>,
    ) -> Block {
        let mut para = Paragraph::with_text(text);
        para.list = Some(ListInfo {
            kind,
            num_id: num_id.to_string(),
            level,
            number,
        });
        Block::Paragraph(para)
    }

    #[test]
    fn test_paragraph_and_heading() {
        let mut doc = Document::new();
        doc.add_block(heading(HeadingLevel::H1, "Overview"));
        doc.add_block(Block::Paragraph(Paragraph::with_text("Hello world.")));

        let html = render(&doc);
        assert!(html.contains(r##"<h1 id="overview">Overview</h1>"##));
        assert!(html.contains("<p>Hello world.</p>"));
        // One heading still gets a contents block.
        assert!(html.contains(r##"<a href="#overview">Overview</a>"##));
    }

    #[test]
    fn test_no_toc_without_headings() {
        let mut doc = Document::new();
        doc.add_block(Block::Paragraph(Paragraph::with_text("plain")));
        let html = render(&doc);
        assert!(!html.contains("class=\"toc\""));
    }

    #[test]
    fn test_duplicate_heading_slugs_stay_unique() {
        let mut doc = Document::new();
        doc.add_block(heading(HeadingLevel::H2, "Notes"));
        doc.add_block(heading(HeadingLevel::H2, "Notes"));
        let html = render(&doc);
        assert!(html.contains(r##"id="notes""##));
        assert!(html.contains(r##"id="notes-2""##));
    }

    #[test]
    fn test_run_formatting_nests() {
        let mut para = Paragraph::new();
        para.inlines.push(Inline::Run(TextRun::styled(
            "both",
            TextStyle {
                bold: true,
                italic: true,
                ..Default::default()
            },
        )));
        let mut doc = Document::new();
        doc.add_block(Block::Paragraph(para));

        let html = render(&doc);
        assert!(html.contains("<strong><em>both</em></strong>"));
    }

    #[test]
    fn test_list_grouping_and_kind_switch() {
        let mut doc = Document::new();
        doc.add_block(list_item("a", ListKind::Bullet, 0, None));
        doc.add_block(list_item("b", ListKind::Bullet, 0, None));
        doc.add_block(list_item("one", ListKind::Numbered, 0, Some(1)));
        doc.add_block(Block::Paragraph(Paragraph::with_text("after")));

        let html = render(&doc);
        let ul = html.find("<ul>").unwrap();
        let ul_end = html.find("</ul>").unwrap();
        let ol = html.find("<ol>").unwrap();
        assert!(ul < ul_end && ul_end < ol);
        assert_eq!(html.matches("<li>").count(), 3);
        assert!(html.find("</ol>").unwrap() < html.find("<p>after</p>").unwrap());
    }

    #[test]
    fn test_distinct_list_ids_open_separate_containers() {
        let mut doc = Document::new();
        doc.add_block(numbered_item("first", ListKind::Numbered, "1", 0, Some(1)));
        doc.add_block(numbered_item("second", ListKind::Numbered, "1", 0, Some(2)));
        doc.add_block(numbered_item("other", ListKind::Numbered, "2", 0, Some(1)));

        let html = render(&doc);
        // Same kind, new identifier: the counter restarts in a fresh list.
        assert_eq!(html.matches("<ol>").count(), 2);
        assert_eq!(html.matches("</ol>").count(), 2);
        assert_eq!(html.matches("<li>").count(), 3);
        assert!(!html.contains("start="));
    }

    #[test]
    fn test_nested_list_levels() {
        let mut doc = Document::new();
        doc.add_block(list_item("top", ListKind::Bullet, 0, None));
        doc.add_block(list_item("sub", ListKind::Bullet, 1, None));
        doc.add_block(list_item("top again", ListKind::Bullet, 0, None));

        let html = render(&doc);
        assert_eq!(html.matches("<ul>").count(), 2);
        assert_eq!(html.matches("</ul>").count(), 2);
    }

    #[test]
    fn test_table_renders_first_row_as_header() {
        let mut table = Table::new();
        let mut header = Row::new();
        header.cells.push(Cell::with_text("Name"));
        header.cells.push(Cell::with_text("Value"));
        table.add_row(header);
        let mut row = Row::new();
        row.cells.push(Cell::with_text("size"));
        row.cells.push(Cell::with_text("10"));
        table.add_row(row);

        let mut doc = Document::new();
        doc.add_block(Block::Table(table));

        let html = render(&doc);
        assert!(html.contains("class=\"table-wrap\""));
        assert_eq!(html.matches("<th>").count(), 2);
        assert_eq!(html.matches("<td>").count(), 2);
    }

    #[test]
    fn test_unresolved_link_renders_plain_text() {
        let mut para = Paragraph::new();
        para.inlines.push(Inline::Link(Hyperlink {
            target: None,
            runs: vec![TextRun::plain("orphan")],
        }));
        let mut doc = Document::new();
        doc.add_block(Block::Paragraph(para));

        let html = render(&doc);
        assert!(html.contains("orphan"));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_missing_image_placeholder() {
        let mut para = Paragraph::new();
        para.inlines.push(Inline::Image(InlineImage {
            resource_id: "rId7".to_string(),
            alt_text: None,
        }));
        let mut doc = Document::new();
        doc.add_block(Block::Paragraph(para));

        let html = render(&doc);
        assert!(html.contains("class=\"missing-image\""));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = Document::new();
        doc.add_block(Block::Paragraph(Paragraph::with_text("<script> & done")));
        let html = render(&doc);
        assert!(html.contains("&lt;script&gt; &amp; done"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let mut doc = Document::new();
        doc.add_block(heading(HeadingLevel::H1, "Title"));
        doc.add_block(list_item("x", ListKind::Numbered, 0, Some(1)));
        let first = render(&doc);
        let second = render(&doc);
        assert_eq!(first, second);
    }
}
