//! Cover page, numbered sections and page-number stamping.
//!
//! Assembly runs in two phases. [`layout_document`] lays out every page and
//! records where the content pages start; [`stamp_page_numbers`] then labels
//! each content page once the total is known.

use std::iter;
use std::ops::Range;

use crate::block::Span;
use crate::config::Config;
use crate::document::{Document, Section};
use crate::logo::LoadedImage;
use crate::inline::parse_inline;
use crate::layout::{Anchor, DrawOp, Geometry, Layout, Page, Stroke, words_from_spans};
use crate::metrics::TextMeasure;
use crate::parser;
use crate::render::render_block;
use crate::style::TextStyle;

/// Baseline-to-baseline distance of wrapped cover lines, in font sizes.
const COVER_LEADING: f64 = 1.2;
const MM_PER_PT: f64 = 25.4 / 72.0;

/// Phase-one output: laid-out pages and where the content starts.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub pages: Vec<Page>,
    pub first_content_page: usize,
}

impl LayoutResult {
    pub fn content_pages(&self) -> Range<usize> {
        self.first_content_page.min(self.pages.len())..self.pages.len()
    }

    pub fn content_page_count(&self) -> usize {
        self.content_pages().len()
    }
}

/// Lay out the cover page followed by every section, in order.
pub fn layout_document(
    doc: &Document,
    logo: Option<&LoadedImage>,
    config: &Config,
    measure: &dyn TextMeasure,
) -> LayoutResult {
    let mut layout = Layout::new(Geometry::from(&config.page), measure);
    layout.start_page();
    layout_cover(&mut layout, doc, logo, config);
    let first_content_page = layout.page_count();

    let sections = doc.ordered_sections();
    if sections.is_empty() {
        log::debug!("document has no sections, rendering the cover only");
    } else {
        layout.start_page();
        for (index, section) in sections.iter().enumerate() {
            if index > 0 {
                layout.advance(config.section.spacing_between);
            }
            layout_section(&mut layout, index + 1, section, config);
        }
    }

    let pages = layout.finish();
    log::debug!(
        "laid out {} pages ({} content)",
        pages.len(),
        pages.len() - first_content_page
    );
    LayoutResult {
        pages,
        first_content_page,
    }
}

fn layout_cover(
    layout: &mut Layout<'_>,
    doc: &Document,
    logo: Option<&LoadedImage>,
    config: &Config,
) {
    let cover = &config.cover;
    let colors = &config.colors;
    let page = &config.page;

    if let Some(logo) = logo {
        layout.draw(DrawOp::Image {
            x: (page.width - cover.logo_size) / 2.0,
            y: cover.logo_y,
            width: cover.logo_size,
            height: cover.logo_size,
            name: logo.name.clone(),
        });
    }

    let title = TextStyle::sans(cover.title_size, colors.primary).bold();
    centered_text(layout, &doc.title, cover.title_y, title);
    let championship = TextStyle::sans(cover.championship_size, colors.text).bold();
    centered_text(layout, &doc.championship, cover.championship_y, championship);
    let season = TextStyle::sans(cover.season_size, colors.muted);
    centered_text(layout, &doc.season, cover.season_y, season);

    layout.draw(DrawOp::Line {
        from: (page.margin, cover.divider_y),
        to: (page.width - page.margin, cover.divider_y),
        stroke: Stroke {
            color: colors.divider,
            width: cover.divider_width,
        },
    });

    let date = cover
        .date_label
        .replace("{date}", &doc.generation_timestamp());
    centered_text(
        layout,
        &date,
        cover.date_y,
        TextStyle::sans(cover.date_size, colors.muted),
    );
}

/// Wrap plain text to the content width and center each line on the page,
/// the first baseline at `y`.
fn centered_text(layout: &mut Layout<'_>, text: &str, y: f64, style: TextStyle) {
    let geometry = *layout.geometry();
    let words = words_from_spans(iter::once(Span::Plain(text.to_string())), style, style.color);
    let leading = style.size * COVER_LEADING * MM_PER_PT;

    for (index, line) in layout.wrap(&words, geometry.content_width()).iter().enumerate() {
        let text = line
            .runs
            .iter()
            .map(|run| run.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        layout.draw(DrawOp::Text {
            x: geometry.width / 2.0,
            y: y + index as f64 * leading,
            text,
            style,
            anchor: Anchor::Center,
        });
    }
}

fn layout_section(layout: &mut Layout<'_>, ordinal: usize, section: &Section, config: &Config) {
    let geometry = *layout.geometry();
    let style = TextStyle::sans(config.section.title_size, config.colors.primary).bold();
    let title = iter::once(Span::Plain(format!("{ordinal}. "))).chain(parse_inline(&section.title));
    let words = words_from_spans(title, style, config.colors.code_text);

    layout.flow(
        &words,
        geometry.margin,
        geometry.content_width(),
        config.section.title_line_height,
    );
    layout.advance(config.section.spacing_after_title);

    for block in parser::parse(&section.content) {
        log::debug!("section {ordinal}: rendering {} block", block.kind());
        render_block(layout, &block, config);
    }
}

/// Label every content page with its number and the content page total.
pub fn stamp_page_numbers(mut result: LayoutResult, config: &Config) -> Vec<Page> {
    let page = &config.page;
    if !page.numbers {
        return result.pages;
    }

    let total = result.content_page_count().to_string();
    let style = TextStyle::sans(page.number_size, config.colors.muted);
    let first = result.first_content_page;
    for (index, content_page) in result.pages.iter_mut().skip(first).enumerate() {
        let label = page
            .number_label
            .replace("{page}", &(index + 1).to_string())
            .replace("{total}", &total);
        content_page.ops.push(DrawOp::Text {
            x: page.width - page.margin,
            y: page.height - page.number_offset,
            text: label,
            style,
            anchor: Anchor::Right,
        });
    }
    result.pages
}
