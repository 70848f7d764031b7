//! Per-block placement on top of the layout engine.

use crate::block::Block;
use crate::config::{Config, HeadingConfig};
use crate::inline::parse_inline;
use crate::layout::{Anchor, DrawOp, Layout, Line, Stroke, words_from_spans};
use crate::metrics::TextMeasure;
use crate::style::TextStyle;

const ELLIPSIS: &str = "...";
const MM_PER_PT: f64 = 25.4 / 72.0;

pub fn render_block(layout: &mut Layout<'_>, block: &Block, config: &Config) {
    match block {
        Block::Paragraph(text) => render_paragraph(layout, text, config),
        Block::Heading { level, text } => render_heading(layout, *level, text, config),
        Block::List(items) => render_list(layout, items, config),
        Block::Code(lines) => render_code(layout, lines, config),
        Block::Table(rows) => render_table(layout, rows, config),
    }
}

fn body_style(config: &Config) -> TextStyle {
    TextStyle::sans(config.paragraph.size, config.colors.text)
}

fn render_paragraph(layout: &mut Layout<'_>, text: &str, config: &Config) {
    let words = words_from_spans(parse_inline(text), body_style(config), config.colors.code_text);
    let geometry = *layout.geometry();
    layout.flow(
        &words,
        geometry.margin,
        geometry.content_width(),
        config.paragraph.line_height,
    );
    layout.advance(config.paragraph.spacing_after);
}

fn render_heading(layout: &mut Layout<'_>, level: u8, text: &str, config: &Config) {
    let style = TextStyle::sans(HeadingConfig::size(level), config.colors.primary).bold();
    let words = words_from_spans(parse_inline(text), style, config.colors.code_text);
    let geometry = *layout.geometry();

    layout.advance(config.heading.spacing_before);
    layout.flow(
        &words,
        geometry.margin,
        geometry.content_width(),
        config.heading.line_height,
    );
    layout.advance(config.heading.spacing_after);
}

fn render_list(layout: &mut Layout<'_>, items: &[String], config: &Config) {
    let style = body_style(config);
    let list = &config.list;
    let geometry = *layout.geometry();
    let bullet_x = geometry.margin + list.bullet_indent;
    let text_x = geometry.margin + list.text_indent;
    let width = geometry.content_width() - list.text_indent;

    for item in items {
        let words = words_from_spans(parse_inline(item), style, config.colors.code_text);
        for (i, line) in layout.wrap(&words, width).iter().enumerate() {
            if i == 0 {
                // The bullet must land on the same page as the first line.
                layout.break_if_needed();
                let y = layout.cursor().y;
                layout.draw(DrawOp::Text {
                    x: bullet_x,
                    y,
                    text: list.bullet.clone(),
                    style,
                    anchor: Anchor::Left,
                });
            }
            layout.place_line(line, text_x, config.paragraph.line_height);
        }
        layout.advance(list.item_spacing);
    }
    layout.advance(list.spacing_after);
}

fn render_code(layout: &mut Layout<'_>, lines: &[String], config: &Config) {
    let code = &config.code;
    let style = TextStyle::mono(code.size, config.colors.text);
    let geometry = *layout.geometry();

    for line in lines {
        layout.break_if_needed();
        let y = layout.cursor().y;
        layout.draw(DrawOp::Rect {
            x: geometry.margin,
            y: y - code.line_height * 0.7,
            width: geometry.content_width(),
            height: code.line_height,
            fill: Some(config.colors.code_background),
            stroke: None,
        });
        if !line.trim().is_empty() {
            layout.draw(DrawOp::Text {
                x: geometry.margin + code.indent,
                y,
                text: line.clone(),
                style,
                anchor: Anchor::Left,
            });
        }
        layout.advance(code.line_height);
    }
    layout.advance(code.spacing_after);
}

fn render_table(layout: &mut Layout<'_>, rows: &[Vec<String>], config: &Config) {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return;
    }
    let table = &config.table;
    let geometry = *layout.geometry();
    let column_width = geometry.content_width() / columns as f64;
    let header = TextStyle::sans(table.size, config.colors.table_header_text).bold();
    let body = TextStyle::sans(table.size, config.colors.text);
    let stroke = Stroke {
        color: config.colors.table_border,
        width: table.border_width,
    };

    for (index, row) in rows.iter().enumerate() {
        layout.break_unless_fits(table.row_height);
        let top = layout.cursor().y;
        let (fill, style) = if index == 0 {
            (config.colors.primary, header)
        } else {
            (config.colors.table_body, body)
        };
        // Vertically centered baseline: half the row plus roughly a third of the font size.
        let baseline = top + table.row_height / 2.0 + style.size * MM_PER_PT * 0.35;

        for column in 0..columns {
            let x = geometry.margin + column as f64 * column_width;
            layout.draw(DrawOp::Rect {
                x,
                y: top,
                width: column_width,
                height: table.row_height,
                fill: Some(fill),
                stroke: Some(stroke),
            });

            let Some(cell) = row.get(column) else {
                continue;
            };
            let words = words_from_spans(parse_inline(cell), style, config.colors.code_text);
            let line = layout
                .wrap(&words, f64::INFINITY)
                .into_iter()
                .next()
                .unwrap_or_default();
            let line = truncate(
                layout.measure(),
                line,
                column_width - 2.0 * table.cell_padding,
            );
            let start = x + (column_width - line.width) / 2.0;
            for run in line.runs {
                layout.draw(DrawOp::Text {
                    x: start + run.x,
                    y: baseline,
                    text: run.text,
                    style: run.style,
                    anchor: Anchor::Left,
                });
            }
        }
        layout.advance(table.row_height);
    }
    layout.advance(table.spacing_after);
}

/// Shorten a line from the end until it fits, marking the cut with an ellipsis.
fn truncate(measure: &dyn TextMeasure, mut line: Line, max_width: f64) -> Line {
    if line.width <= max_width {
        return line;
    }
    loop {
        let Some(last) = line.runs.last_mut() else {
            line.width = 0.0;
            return line;
        };
        if last.text.is_empty() {
            line.runs.pop();
            continue;
        }
        let end = last.x + measure.width(&last.text, &last.style);
        let ellipsis = measure.width(ELLIPSIS, &last.style);
        if end + ellipsis <= max_width {
            last.text.push_str(ELLIPSIS);
            line.width = end + ellipsis;
            return line;
        }
        last.text.pop();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout::tests::FixedWidth;
    use crate::layout::{Geometry, Page};
    use crate::parser::parse;
    use crate::style::{FontFace, Weight};

    fn config() -> Config {
        let mut config = Config::default();
        config.page.width = 100.0;
        config.page.height = 100.0;
        config.page.margin = 10.0;
        config.page.bottom_margin = 10.0;
        config
    }

    fn render(source: &str, config: &Config) -> Vec<Page> {
        let mut layout = Layout::new(Geometry::from(&config.page), &FixedWidth);
        layout.start_page();
        for block in parse(source) {
            render_block(&mut layout, &block, config);
        }
        layout.finish()
    }

    fn rects(page: &Page) -> usize {
        page.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { .. }))
            .count()
    }

    #[test]
    fn paragraph_spans_get_their_styles() {
        let pages = render("Respeite os **limites** e `box-3`.", &config());
        let styles: Vec<(&str, Weight, FontFace)> = pages[0]
            .texts()
            .map(|(text, style, _)| (text, style.weight, style.face))
            .collect();
        assert_eq!(
            styles,
            vec![
                ("Respeite", Weight::Normal, FontFace::Sans),
                ("os", Weight::Normal, FontFace::Sans),
                ("limites", Weight::Bold, FontFace::Sans),
                ("e", Weight::Normal, FontFace::Sans),
                ("box-3", Weight::Normal, FontFace::Mono),
                (".", Weight::Normal, FontFace::Sans),
            ]
        );
    }

    #[test]
    fn heading_size_follows_level() {
        let pages = render("# Um\n\n#### Quatro", &config());
        let sizes: Vec<f64> = pages[0].texts().map(|(_, style, _)| style.size).collect();
        assert_eq!(sizes, vec![14.0, 12.0]);
        assert!(pages[0].texts().all(|(_, style, _)| style.weight == Weight::Bold));
    }

    #[test]
    fn list_items_get_bullets() {
        let config = config();
        let pages = render("- Item 1\n- Item 2", &config);
        assert_eq!(pages[0].lines(), vec!["• Item 1", "• Item 2"]);
        let first = pages[0].ops.first();
        assert!(matches!(
            first,
            Some(DrawOp::Text { x, .. }) if *x == 10.0 + config.list.bullet_indent
        ));
    }

    #[test]
    fn code_lines_are_verbatim_and_unstyled() {
        let pages = render("```\nlet **x** = 1;\n\n```", &config());
        assert_eq!(pages[0].lines(), vec!["let **x** = 1;"]);
        assert!(pages[0].texts().all(|(_, style, _)| style.face == FontFace::Mono));
        // One background band per source line, blank lines included.
        assert_eq!(rects(&pages[0]), 2);
    }

    #[test]
    fn table_uses_uniform_columns_and_header_band() {
        let config = config();
        let pages = render("| A | B |\n|---|---|\n| 1 | 2 |", &config);
        assert_eq!(rects(&pages[0]), 4);
        let widths: Vec<f64> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![40.0; 4]);

        let texts: Vec<(&str, f64)> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, x, .. } => Some((text.as_str(), *x)),
                _ => None,
            })
            .collect();
        // Centered in 40mm columns starting at x = 10 and x = 50.
        assert_eq!(texts, vec![("A", 29.5), ("B", 69.5), ("1", 29.5), ("2", 69.5)]);

        let header = pages[0].texts().next().map(|(_, style, _)| *style);
        assert_eq!(header.map(|s| s.weight), Some(Weight::Bold));
        assert_eq!(header.map(|s| s.color), Some(config.colors.table_header_text));
    }

    #[test]
    fn long_cells_are_truncated() {
        let truncated = truncate(
            &FixedWidth,
            Line {
                runs: vec![crate::layout::Run {
                    x: 0.0,
                    text: "Classificação".into(),
                    style: TextStyle::sans(10.0, crate::style::Rgb::BLACK),
                }],
                width: 13.0,
            },
            8.0,
        );
        assert_eq!(truncated.runs[0].text, "Class...");
        assert_eq!(truncated.width, 8.0);
    }

    #[test]
    fn table_rows_break_pages() {
        let rows: String = (0..15).map(|i| format!("| {i} | x |\n")).collect();
        let pages = render(&rows, &config());
        // Rows start at 10, 18, ..., 82: ten rows end at or above the limit.
        assert_eq!(pages.len(), 2);
        assert_eq!(rects(&pages[0]), 20);
        assert_eq!(rects(&pages[1]), 10);
    }

    #[test]
    fn table_rows_never_cross_the_bottom_margin() {
        let config = config();
        // Eight paragraphs leave the cursor exactly on the limit.
        let source = format!("{}| a | b |\n| c | d |", "linha\n\n".repeat(8));
        let pages = render(&source, &config);
        let limit = config.page.height - config.page.bottom_margin;
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Rect { y, height, .. } = op {
                    assert!(y + height <= limit, "row at {y} crosses {limit}");
                }
            }
        }
        assert_eq!(pages.len(), 2);
    }
}
