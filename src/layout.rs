//! Greedy line breaking and page allocation.
//!
//! Text is broken into [`Word`]s, wrapped into [`Line`]s against a maximum
//! width and placed at the current [`Cursor`]. Before every placed line the
//! cursor is checked against the bottom margin, so one block can span any
//! number of pages. The result is a list of [`Page`]s holding absolutely
//! positioned [`DrawOp`]s, in millimetres from the top-left page corner.

use crate::block::Span;
use crate::config::PageConfig;
use crate::metrics::TextMeasure;
use crate::style::{Rgb, TextStyle};

/// Printable area of a page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub bottom_margin: f64,
}

impl Geometry {
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest baseline that may still receive a line.
    pub fn limit(&self) -> f64 {
        self.height - self.bottom_margin
    }
}

impl From<&PageConfig> for Geometry {
    fn from(page: &PageConfig) -> Self {
        Self {
            width: page.width,
            height: page.height,
            margin: page.margin,
            bottom_margin: page.bottom_margin,
        }
    }
}

/// Current page index and baseline of the next line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f64,
}

/// Horizontal anchoring of a text operation relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    /// Line width in millimetres.
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text whose baseline sits at `y`.
    Text {
        x: f64,
        y: f64,
        text: String,
        style: TextStyle,
        anchor: Anchor,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        name: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text operations in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &TextStyle, f64)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, style, y, .. } => Some((text.as_str(), style, *y)),
            _ => None,
        })
    }

    /// Text of every baseline on the page, top to bottom, runs joined by spaces.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<(f64, Vec<&str>)> = Vec::new();
        for (text, _, y) in self.texts() {
            match lines.iter_mut().find(|(line_y, _)| (*line_y - y).abs() < 1e-6) {
                Some((_, runs)) => runs.push(text),
                None => lines.push((y, vec![text])),
            }
        }
        lines.sort_by(|a, b| a.0.total_cmp(&b.0));
        lines.into_iter().map(|(_, runs)| runs.join(" ")).collect()
    }
}

/// A styled fragment of a word.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub text: String,
    pub style: TextStyle,
}

/// An unbreakable unit: pieces with no whitespace between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub pieces: Vec<Piece>,
}

/// Split inline spans into words, keeping adjacent spans glued when no
/// whitespace separates them (`**limites**.` stays one word).
pub fn words_from_spans(
    spans: impl IntoIterator<Item = Span>,
    base: TextStyle,
    code_color: Rgb,
) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pieces = Vec::new();

    for span in spans {
        let style = base.for_span(&span, code_color);
        let mut piece = String::new();
        for c in span.text().chars() {
            if c.is_whitespace() {
                if !piece.is_empty() {
                    pieces.push(Piece {
                        text: std::mem::take(&mut piece),
                        style,
                    });
                }
                if !pieces.is_empty() {
                    words.push(Word {
                        pieces: std::mem::take(&mut pieces),
                    });
                }
            } else {
                piece.push(c);
            }
        }
        if !piece.is_empty() {
            pieces.push(Piece { text: piece, style });
        }
    }
    if !pieces.is_empty() {
        words.push(Word { pieces });
    }
    words
}

/// A piece placed at `x` relative to the start of its line.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub x: f64,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<Run>,
    pub width: f64,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

pub struct Layout<'m> {
    geometry: Geometry,
    measure: &'m dyn TextMeasure,
    pages: Vec<Page>,
    cursor: Cursor,
}

impl<'m> Layout<'m> {
    pub fn new(geometry: Geometry, measure: &'m dyn TextMeasure) -> Self {
        Self {
            geometry,
            measure,
            pages: Vec::new(),
            cursor: Cursor {
                page: 0,
                y: geometry.margin,
            },
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn measure(&self) -> &'m dyn TextMeasure {
        self.measure
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a page and move the cursor to its top margin.
    pub fn start_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = Cursor {
            page: self.pages.len() - 1,
            y: self.geometry.margin,
        };
    }

    pub fn set_y(&mut self, y: f64) {
        self.cursor.y = y;
    }

    pub fn advance(&mut self, dy: f64) {
        self.cursor.y += dy;
    }

    /// Start a new page if the cursor has passed the bottom margin.
    pub fn break_if_needed(&mut self) -> bool {
        if self.cursor.y > self.geometry.limit() {
            log::debug!(
                "page break after page {} at y={:.2}",
                self.cursor.page + 1,
                self.cursor.y
            );
            self.start_page();
            true
        } else {
            false
        }
    }

    /// Start a new page if a band of `height` starting at the cursor would
    /// cross the bottom margin. A band already at the top margin stays put.
    pub fn break_unless_fits(&mut self, height: f64) -> bool {
        let y = self.cursor.y;
        if y + height > self.geometry.limit() && y > self.geometry.margin {
            log::debug!(
                "page break after page {}: {height:.2}mm band at y={y:.2} does not fit",
                self.cursor.page + 1
            );
            self.start_page();
            true
        } else {
            false
        }
    }

    /// Push an operation onto the current page.
    pub fn draw(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.start_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Greedy word wrap.
    ///
    /// A word joins the current line if the line stays within `max_width`;
    /// otherwise the line is closed first. A word wider than `max_width` gets a
    /// line of its own.
    pub fn wrap(&self, words: &[Word], max_width: f64) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut line = Line::default();

        for word in words {
            let Some(first) = word.pieces.first() else {
                continue;
            };
            let word_width: f64 = word
                .pieces
                .iter()
                .map(|piece| self.measure.width(&piece.text, &piece.style))
                .sum();
            let mut space = if line.is_empty() {
                0.0
            } else {
                self.measure.width(" ", &first.style)
            };
            if !line.is_empty() && line.width + space + word_width > max_width {
                lines.push(std::mem::take(&mut line));
                space = 0.0;
            }

            let mut x = line.width + space;
            for piece in &word.pieces {
                line.runs.push(Run {
                    x,
                    text: piece.text.clone(),
                    style: piece.style,
                });
                x += self.measure.width(&piece.text, &piece.style);
            }
            line.width = x;
        }

        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Place one line at `x` on the current baseline, breaking the page first
    /// if needed, then advance by `line_height`.
    pub fn place_line(&mut self, line: &Line, x: f64, line_height: f64) {
        self.break_if_needed();
        let y = self.cursor.y;
        for run in &line.runs {
            self.draw(DrawOp::Text {
                x: x + run.x,
                y,
                text: run.text.clone(),
                style: run.style,
                anchor: Anchor::Left,
            });
        }
        self.cursor.y += line_height;
    }

    /// Wrap `words` to `max_width` and place every line; returns the new
    /// cursor position.
    pub fn flow(&mut self, words: &[Word], x: f64, max_width: f64, line_height: f64) -> f64 {
        for line in self.wrap(words, max_width) {
            self.place_line(&line, x, line_height);
        }
        self.cursor.y
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::inline::parse_inline;
    use crate::style::Weight;

    /// One millimetre per character, whatever the style.
    pub(crate) struct FixedWidth;

    impl TextMeasure for FixedWidth {
        fn width(&self, text: &str, _style: &TextStyle) -> f64 {
            text.chars().count() as f64
        }
    }

    fn geometry() -> Geometry {
        Geometry {
            width: 100.0,
            height: 100.0,
            margin: 10.0,
            bottom_margin: 10.0,
        }
    }

    fn style() -> TextStyle {
        TextStyle::sans(11.0, Rgb::BLACK)
    }

    fn words(text: &str) -> Vec<Word> {
        words_from_spans(parse_inline(text), style(), Rgb(200, 0, 0))
    }

    fn line_texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.runs
                    .iter()
                    .map(|run| run.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[test]
    fn wraps_greedily() {
        let layout = Layout::new(geometry(), &FixedWidth);
        let lines = layout.wrap(&words("aa bb cc dd"), 5.0);
        assert_eq!(line_texts(&lines), vec!["aa bb", "cc dd"]);
        assert_eq!(lines[0].width, 5.0);
        assert_eq!(lines[0].runs[1].x, 3.0);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let layout = Layout::new(geometry(), &FixedWidth);
        let lines = layout.wrap(&words("a quilometragem b"), 5.0);
        assert_eq!(line_texts(&lines), vec!["a", "quilometragem", "b"]);
    }

    #[test]
    fn glued_spans_stay_together() {
        let words = words("os **limites**. Fim");
        assert_eq!(words.len(), 3);
        assert_eq!(words[1].pieces.len(), 2);
        assert_eq!(words[1].pieces[0].style.weight, Weight::Bold);
        assert_eq!(words[1].pieces[1].text, ".");

        let layout = Layout::new(geometry(), &FixedWidth);
        let lines = layout.wrap(&words, 11.0);
        assert_eq!(lines[0].runs[2].x, 10.0);
        assert_eq!(line_texts(&lines), vec!["os limites .", "Fim"]);
    }

    #[test]
    fn newlines_are_soft_breaks() {
        assert_eq!(words("a\nb").len(), 2);
    }

    #[test]
    fn flow_returns_new_cursor() {
        let mut layout = Layout::new(geometry(), &FixedWidth);
        layout.start_page();
        let y = layout.flow(&words("aa bb cc"), 10.0, 5.0, 6.0);
        assert_eq!(y, 10.0 + 2.0 * 6.0);
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn one_overflow_line_adds_exactly_one_page() {
        // Limit is y = 90: from y = 70 there is room for lines at 70, 80 and 90.
        let mut layout = Layout::new(geometry(), &FixedWidth);
        layout.start_page();
        layout.set_y(70.0);
        layout.flow(&words("l1 l2 l3"), 10.0, 2.0, 10.0);
        assert_eq!(layout.page_count(), 1);

        let mut layout = Layout::new(geometry(), &FixedWidth);
        layout.start_page();
        layout.set_y(70.0);
        layout.flow(&words("l1 l2 l3 l4"), 10.0, 2.0, 10.0);
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.cursor(), Cursor { page: 1, y: 20.0 });

        let pages = layout.finish();
        assert_eq!(pages[0].lines(), vec!["l1", "l2", "l3"]);
        assert_eq!(pages[1].lines(), vec!["l4"]);
        assert_eq!(pages[1].texts().next().map(|(_, _, y)| y), Some(10.0));
    }

    #[test]
    fn page_breaks_are_checked_per_line() {
        let mut layout = Layout::new(geometry(), &FixedWidth);
        layout.start_page();
        let text = (0..25).map(|i| format!("w{i:02}")).collect::<Vec<_>>().join(" ");
        layout.flow(&words(&text), 10.0, 3.0, 10.0);
        // Nine baselines (10..=90) fit on each page.
        let pages = layout.finish();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].lines().len(), 9);
        assert_eq!(pages[2].lines().len(), 7);
    }

    #[test]
    fn bands_break_when_their_bottom_crosses_the_limit() {
        let mut layout = Layout::new(geometry(), &FixedWidth);
        layout.start_page();
        layout.set_y(82.0);
        assert!(!layout.break_unless_fits(8.0));
        layout.set_y(82.5);
        assert!(layout.break_unless_fits(8.0));
        assert_eq!(layout.cursor(), Cursor { page: 1, y: 10.0 });

        // Taller than the page: placed at the top instead of looping.
        assert!(!layout.break_unless_fits(200.0));
        assert_eq!(layout.page_count(), 2);
    }

    #[test]
    fn drawing_without_a_page_starts_one() {
        let mut layout = Layout::new(geometry(), &FixedWidth);
        layout.draw(DrawOp::Line {
            from: (0.0, 0.0),
            to: (1.0, 1.0),
            stroke: Stroke {
                color: Rgb::BLACK,
                width: 0.5,
            },
        });
        assert_eq!(layout.page_count(), 1);
    }
}
