use std::fmt::Write;

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::config::{Config, FontConfig};
use crate::error::{Error, Result};
use crate::logo::LoadedImage;
use crate::layout::{Anchor, DrawOp, Page, Stroke};
use crate::style::{FontFace, Rgb, TextStyle, Weight};

/// Convert laid-out pages to Typst markup.
///
/// Pages have no margin and every element is placed absolutely. Text edges
/// sit on the baseline, so a placed text's `dy` is its baseline.
pub fn pages_to_typst(pages: &[Page], config: &Config) -> String {
    let mut out = String::new();
    let page = &config.page;

    let _ = writeln!(
        out,
        "#set page(width: {}, height: {}, margin: 0mm)",
        mm(page.width),
        mm(page.height)
    );
    let _ = writeln!(
        out,
        "#set text(font: {}, top-edge: \"baseline\", bottom-edge: \"baseline\")",
        font_list(&config.fonts.sans)
    );
    out.push('\n');

    for (index, content) in pages.iter().enumerate() {
        if index > 0 {
            out.push_str("#pagebreak()\n");
        }
        for op in &content.ops {
            emit_op(op, config, &mut out);
        }
    }

    out
}

fn emit_op(op: &DrawOp, config: &Config, out: &mut String) {
    match op {
        DrawOp::Text {
            x,
            y,
            text,
            style,
            anchor,
        } => {
            let body = text_call(text, style, &config.fonts);
            let width = config.page.width;
            let _ = match anchor {
                Anchor::Left => writeln!(
                    out,
                    "#place(top + left, dx: {}, dy: {}, {body})",
                    mm(*x),
                    mm(*y)
                ),
                Anchor::Center => writeln!(
                    out,
                    "#place(top + left, dx: {}, dy: {}, block(width: {}, align(center, {body})))",
                    mm(x - width / 2.0),
                    mm(*y),
                    mm(width)
                ),
                Anchor::Right => writeln!(
                    out,
                    "#place(top + left, dx: {}, dy: {}, block(width: {}, align(right, {body})))",
                    mm(x - width),
                    mm(*y),
                    mm(width)
                ),
            };
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let fill = fill.map_or_else(|| "none".to_string(), color);
            let stroke = stroke.as_ref().map_or_else(|| "none".to_string(), stroke_spec);
            let _ = writeln!(
                out,
                "#place(top + left, dx: {}, dy: {}, rect(width: {}, height: {}, fill: {fill}, stroke: {stroke}))",
                mm(*x),
                mm(*y),
                mm(*width),
                mm(*height)
            );
        }
        DrawOp::Line { from, to, stroke } => {
            let _ = writeln!(
                out,
                "#place(top + left, line(start: ({}, {}), end: ({}, {}), stroke: {}))",
                mm(from.0),
                mm(from.1),
                mm(to.0),
                mm(to.1),
                stroke_spec(stroke)
            );
        }
        DrawOp::Image {
            x,
            y,
            width,
            height,
            name,
        } => {
            let _ = writeln!(
                out,
                "#place(top + left, dx: {}, dy: {}, image({}, width: {}, height: {}, fit: \"contain\"))",
                mm(*x),
                mm(*y),
                string_literal(name),
                mm(*width),
                mm(*height)
            );
        }
    }
}

fn text_call(text: &str, style: &TextStyle, fonts: &FontConfig) -> String {
    let mut args = format!("size: {}pt, fill: {}", number(style.size), color(style.color));
    if style.weight == Weight::Bold {
        args.push_str(", weight: \"bold\"");
    }
    if style.italic {
        args.push_str(", style: \"italic\"");
    }
    let text = match style.face {
        FontFace::Sans => text.to_string(),
        FontFace::Mono => {
            let _ = write!(args, ", font: {}", font_list(&fonts.mono));
            // Keep indentation: regular spaces would collapse.
            text.replace(' ', "\u{a0}")
        }
    };
    format!("text({args}, {})", string_literal(&text))
}

fn mm(value: f64) -> String {
    format!("{}mm", number(value))
}

fn number(value: f64) -> String {
    let formatted = format!("{value:.3}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn color(rgb: Rgb) -> String {
    format!("rgb(\"{rgb}\")")
}

fn stroke_spec(stroke: &Stroke) -> String {
    format!("{} + {}", mm(stroke.width), color(stroke.color))
}

fn font_list(families: &[String]) -> String {
    let names: Vec<String> = families.iter().map(|f| string_literal(f)).collect();
    // A one-element array needs a trailing comma in Typst.
    match names.len() {
        0 => "(\"Libertinus Serif\",)".to_string(),
        1 => format!("({},)", names[0]),
        _ => format!("({})", names.join(", ")),
    }
}

/// Escape text as a Typst string literal.
fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Compile generated markup, with the logo available as a static file.
pub fn compile(
    source: String,
    logo: Option<&LoadedImage>,
    config: &Config,
) -> Result<PagedDocument> {
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(config.fonts.system);

    let engine = TypstEngine::builder()
        .main_file(source)
        .search_fonts_with(font_options)
        .with_static_file_resolver(logo.map(|logo| (logo.name.as_str(), logo.bytes.as_slice())))
        .build();

    let warned = engine.compile();
    let document: Result<PagedDocument> = warned
        .output
        .map_err(|e| Error::Compile(format!("{e:?}")));
    for warning in &warned.warnings {
        log::debug!("typst: {}", warning.message);
    }
    document
}

pub fn export_pdf(document: &PagedDocument) -> Result<Vec<u8>> {
    typst_pdf::pdf(document, &PdfOptions::default()).map_err(|e| Error::Export(format!("{e:?}")))
}

/// Rendered SVG pages.
pub struct SvgDocument {
    pub pages: Vec<String>,
    pub width_pt: f64,
    pub height_pt: f64,
}

pub fn export_svg(document: &PagedDocument) -> SvgDocument {
    let pages: Vec<String> = document.pages.iter().map(|page| typst_svg::svg(page)).collect();

    let (width_pt, height_pt) = match document.pages.first() {
        Some(first) => {
            let size = first.frame.size();
            (size.x.to_pt(), size.y.to_pt())
        }
        None => (0.0, 0.0),
    };

    SvgDocument {
        pages,
        width_pt,
        height_pt,
    }
}
