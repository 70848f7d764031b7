//! # rulebook
//!
//! Renders championship regulations to paginated PDF.
//!
//! Section bodies use a deliberately small markup dialect: `**bold**`,
//! `__bold__`, `*italic*`, `_italic_` and `` `code` `` inline; headings,
//! `-`/`*`/`+` lists, fenced code and pipe tables as blocks. A document is laid
//! out in two phases (pages, then page numbers) and handed to Typst for export.
//!
//! ```no_run
//! use rulebook::{Config, Document, LogoLoader};
//!
//! fn main() -> rulebook::Result<()> {
//!     let doc = Document::from_json(&std::fs::read_to_string("regulamento.json")?)?;
//!     let pdf = rulebook::render_pdf(&doc, &Config::compiled_default(), &LogoLoader::new("."))?;
//!     std::fs::write(doc.filename(&Config::compiled_default().output), pdf)?;
//!     Ok(())
//! }
//! ```

mod assemble;
mod block;
mod config;
mod document;
mod error;
mod inline;
mod layout;
mod logo;
mod metrics;
mod parser;
mod render;
mod style;
mod typst;

use typst_library::layout::PagedDocument;

pub use assemble::{LayoutResult, layout_document, stamp_page_numbers};
pub use block::{Block, Span};
pub use config::{
    CodeConfig, ColorConfig, Config, CoverConfig, FontConfig, HeadingConfig, ListConfig, OutputConfig,
    PageConfig, ParagraphConfig, SectionConfig, TableConfig,
};
pub use document::{Document, Section, pdf_filename, sanitize};
pub use error::{Error, Result};
pub use inline::{Spans, parse_inline};
pub use layout::{
    Anchor, Cursor, DrawOp, Geometry, Layout, Line, Page, Piece, Run, Stroke, Word, words_from_spans,
};
pub use logo::{
    FsImageLoader, HttpImageLoader, ImageFormat, ImageLoader, LoadedImage, LogoLoader, load_logo,
};
pub use metrics::{StandardMetrics, TextMeasure};
pub use style::{FontFace, Rgb, TextStyle, Weight};
pub use typst::SvgDocument;

/// Parse a section body into blocks.
pub fn parse_blocks(body: &str) -> Vec<Block> {
    parser::parse(body)
}

/// Serialize blocks back into the markup dialect.
pub fn blocks_to_markup(blocks: &[Block]) -> String {
    parser::to_markup(blocks)
}

/// Typst markup for a document plus the logo it references, if any.
pub struct TypstSource {
    pub source: String,
    pub logo: Option<LoadedImage>,
}

/// Load the logo, lay the document out, stamp page numbers and emit Typst markup.
///
/// A logo that cannot be loaded is logged and left out.
pub fn document_to_typst(
    doc: &Document,
    config: &Config,
    loader: &dyn ImageLoader,
) -> TypstSource {
    let logo = doc
        .logo
        .as_deref()
        .and_then(|source| match load_logo(source, loader) {
            Ok(logo) => Some(logo),
            Err(e) => {
                log::warn!("rendering cover without logo: {e}");
                None
            }
        });

    TypstSource {
        source: pages_source(doc, logo.as_ref(), config),
        logo,
    }
}

fn pages_source(doc: &Document, logo: Option<&LoadedImage>, config: &Config) -> String {
    let result = layout_document(doc, logo, config, &StandardMetrics);
    let pages = stamp_page_numbers(result, config);
    typst::pages_to_typst(&pages, config)
}

/// Compile the document. If Typst rejects the logo (an SVG it cannot parse,
/// say), the cover is laid out again without it.
fn compile(
    doc: &Document,
    config: &Config,
    loader: &dyn ImageLoader,
) -> Result<PagedDocument> {
    let TypstSource { source, logo } = document_to_typst(doc, config, loader);
    match typst::compile(source, logo.as_ref(), config) {
        Err(e) if logo.is_some() => {
            log::warn!("rendering cover without logo: {e}");
            typst::compile(pages_source(doc, None, config), None, config)
        }
        compiled => compiled,
    }
}

/// Render a document to PDF bytes.
pub fn render_pdf(doc: &Document, config: &Config, loader: &dyn ImageLoader) -> Result<Vec<u8>> {
    typst::export_pdf(&compile(doc, config, loader)?)
}

/// Render a document to one SVG string per page.
pub fn render_svg(
    doc: &Document,
    config: &Config,
    loader: &dyn ImageLoader,
) -> Result<SvgDocument> {
    Ok(typst::export_svg(&compile(doc, config, loader)?))
}
