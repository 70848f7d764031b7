use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::block::Span;

/// Alternatives in priority order: code, `**bold**`, `__bold__`, `*italic*`, `_italic_`.
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+?)`|\*\*(.+?)\*\*|__(.+?)__|\*(.+?)\*|_(.+?)_")
        .expect("inline markup pattern is valid")
});

/// Parse a run of inline markup into styled spans.
///
/// The returned iterator is lazy: the text is scanned only as far as needed to
/// produce the next span. Unterminated delimiters stay literal, and emphasis
/// whose content is made only of delimiter characters (`****`) is not styled.
pub fn parse_inline(text: &str) -> Spans<'_> {
    Spans {
        text,
        pos: 0,
        pending: None,
    }
}

/// Lazy span iterator returned by [`parse_inline`].
pub struct Spans<'t> {
    text: &'t str,
    pos: usize,
    pending: Option<Span>,
}

impl Iterator for Spans<'_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if let Some(span) = self.pending.take() {
            return Some(span);
        }
        if self.pos >= self.text.len() {
            return None;
        }

        let plain_start = self.pos;
        let mut search = self.pos;
        while let Some(caps) = INLINE.captures_at(self.text, search) {
            let whole = caps.get(0)?;
            match styled_span(&caps) {
                Some(span) => {
                    self.pos = whole.end();
                    let plain = &self.text[plain_start..whole.start()];
                    if plain.is_empty() {
                        return Some(span);
                    }
                    self.pending = Some(span);
                    return Some(Span::Plain(plain.to_string()));
                }
                // Rejected markup is folded into the surrounding plain text.
                None => search = whole.end(),
            }
        }

        self.pos = self.text.len();
        let plain = &self.text[plain_start..];
        (!plain.is_empty()).then(|| Span::Plain(plain.to_string()))
    }
}

fn styled_span(caps: &Captures<'_>) -> Option<Span> {
    if let Some(code) = caps.get(1) {
        return Some(Span::Code(code.as_str().to_string()));
    }
    let (inner, bold) = match (caps.get(2).or(caps.get(3)), caps.get(4).or(caps.get(5))) {
        (Some(inner), _) => (inner.as_str(), true),
        (None, Some(inner)) => (inner.as_str(), false),
        (None, None) => return None,
    };
    if inner.chars().all(|c| c == '*' || c == '_') {
        return None;
    }
    let text = flatten(inner);
    Some(if bold { Span::Bold(text) } else { Span::Italic(text) })
}

/// Nested emphasis takes the outer style: only the inner text survives.
fn flatten(inner: &str) -> String {
    parse_inline(inner).map(|span| span.text().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn spans(text: &str) -> Vec<Span> {
        parse_inline(text).collect()
    }

    #[rstest]
    #[case("Respeite os limites de pista.")]
    #[case("Largada às 10h: 3 voltas de aquecimento")]
    #[case("a # b + c")]
    fn text_without_delimiters_is_one_plain_span(#[case] text: &str) {
        assert_eq!(spans(text), vec![Span::Plain(text.to_string())]);
    }

    #[rstest]
    #[case("**limites**", Span::Bold("limites".into()))]
    #[case("__limites__", Span::Bold("limites".into()))]
    #[case("*volta*", Span::Italic("volta".into()))]
    #[case("_volta_", Span::Italic("volta".into()))]
    #[case("`kart-01`", Span::Code("kart-01".into()))]
    fn single_delimited_run(#[case] text: &str, #[case] expected: Span) {
        assert_eq!(spans(text), vec![expected]);
    }

    #[test]
    fn plain_text_around_styled_spans() {
        assert_eq!(
            spans("Respeite os **limites** de pista."),
            vec![
                Span::Plain("Respeite os ".into()),
                Span::Bold("limites".into()),
                Span::Plain(" de pista.".into()),
            ]
        );
    }

    #[test]
    fn shortest_enclosed_run_wins() {
        assert_eq!(
            spans("**a** e **b**"),
            vec![
                Span::Bold("a".into()),
                Span::Plain(" e ".into()),
                Span::Bold("b".into()),
            ]
        );
    }

    #[test]
    fn unterminated_delimiter_is_literal() {
        assert_eq!(spans("peso **mínimo"), vec![Span::Plain("peso **mínimo".into())]);
        assert_eq!(spans("use `fita"), vec![Span::Plain("use `fita".into())]);
    }

    #[test]
    fn delimiter_only_emphasis_stays_plain() {
        assert_eq!(spans("a **** b"), vec![Span::Plain("a **** b".into())]);
        assert_eq!(spans("__"), vec![Span::Plain("__".into())]);
    }

    #[test]
    fn nested_emphasis_flattens_to_outer_style() {
        assert_eq!(
            spans("**bold *and italic* text**"),
            vec![Span::Bold("bold and italic text".into())]
        );
    }

    #[test]
    fn code_content_is_not_reparsed() {
        assert_eq!(spans("`*x*`"), vec![Span::Code("*x*".into())]);
    }

    #[test]
    fn empty_input_has_no_spans() {
        assert!(spans("").is_empty());
    }

    #[test]
    fn iteration_is_lazy() {
        let mut iter = parse_inline("**a** resto");
        assert_eq!(iter.next(), Some(Span::Bold("a".into())));
        assert_eq!(iter.pos, 5);
    }
}
