use unicode_normalization::UnicodeNormalization;

use crate::style::{FontFace, TextStyle, Weight};

const MM_PER_PT: f64 = 25.4 / 72.0;
const FALLBACK_UNITS: u16 = 556;
const COURIER_UNITS: u16 = 600;

/// Measures the rendered width of a string, in millimetres.
pub trait TextMeasure {
    fn width(&self, text: &str, style: &TextStyle) -> f64;
}

/// Advance widths of the standard PDF fonts (Helvetica, Helvetica-Bold, Courier).
///
/// Oblique faces share the upright widths. Accented letters are measured as
/// their base letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

impl TextMeasure for StandardMetrics {
    fn width(&self, text: &str, style: &TextStyle) -> f64 {
        let units: u32 = match style.face {
            FontFace::Mono => text.chars().count() as u32 * u32::from(COURIER_UNITS),
            FontFace::Sans => text
                .chars()
                .map(|c| u32::from(sans_units(c, style.weight)))
                .sum(),
        };
        f64::from(units) / 1000.0 * style.size * MM_PER_PT
    }
}

fn sans_units(c: char, weight: Weight) -> u16 {
    let table = match weight {
        Weight::Normal => &HELVETICA,
        Weight::Bold => &HELVETICA_BOLD,
    };
    let ascii = |c: char| {
        (' '..='~')
            .contains(&c)
            .then(|| table[c as usize - ' ' as usize])
    };
    if let Some(units) = ascii(c) {
        return units;
    }
    if let Some(units) = symbol_units(c, weight) {
        return units;
    }
    c.nfd().next().and_then(ascii).unwrap_or(FALLBACK_UNITS)
}

fn symbol_units(c: char, weight: Weight) -> Option<u16> {
    let bold = weight == Weight::Bold;
    Some(match c {
        '\u{a0}' => 278,
        '•' => 350,
        'º' => 365,
        'ª' => 370,
        '°' => 400,
        '–' => 556,
        '—' | '…' => 1000,
        '‘' | '’' => if bold { 278 } else { 222 },
        '“' | '”' => if bold { 500 } else { 333 },
        '€' => 556,
        _ => return None,
    })
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgb;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn helvetica_widths_in_millimetres() {
        let style = TextStyle::sans(10.0, Rgb::BLACK);
        // "Kart" = 667 + 556 + 333 + 278 units
        let expected = 1834.0 / 1000.0 * 10.0 * 25.4 / 72.0;
        assert!(close(StandardMetrics.width("Kart", &style), expected));
    }

    #[test]
    fn bold_is_wider() {
        let regular = TextStyle::sans(11.0, Rgb::BLACK);
        let bold = regular.bold();
        assert!(StandardMetrics.width("limites", &bold) > StandardMetrics.width("limites", &regular));
    }

    #[test]
    fn accented_letters_use_base_widths() {
        let style = TextStyle::sans(11.0, Rgb::BLACK);
        assert!(close(
            StandardMetrics.width("Ação", &style),
            StandardMetrics.width("Acao", &style)
        ));
    }

    #[test]
    fn courier_is_fixed_width() {
        let style = TextStyle::mono(9.0, Rgb::BLACK);
        assert!(close(
            StandardMetrics.width("iiii", &style),
            StandardMetrics.width("MMMM", &style)
        ));
        assert!(close(StandardMetrics.width("ab", &style), 1.2 * 9.0 * 25.4 / 72.0));
    }

    #[test]
    fn table_covers_printable_ascii() {
        assert_eq!(HELVETICA.len(), ('~' as usize) - (' ' as usize) + 1);
        assert_eq!(sans_units('A', Weight::Normal), 667);
        assert_eq!(sans_units('~', Weight::Bold), 584);
        assert_eq!(sans_units('漢', Weight::Normal), FALLBACK_UNITS);
    }
}
