//! HTML output: body rendering, page assembly, and options.

mod options;
mod page;
mod renderer;

pub use options::PageOptions;
pub use page::{escape_html, STYLESHEET};
pub use renderer::HtmlRenderer;

use crate::model::Document;

/// Render a document model into a complete standalone page.
pub fn render_page(doc: &Document, options: &PageOptions) -> String {
    let body = HtmlRenderer::new(doc, options).render_body();
    page::assemble(&body, &doc.metadata, options)
}
