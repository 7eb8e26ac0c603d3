//! Helvetica advance widths for line measurement.
//!
//! Widths are in thousandths of an em, taken from the Adobe Core 14 AFM
//! metrics for the printable Latin-1 range. Characters outside that range
//! never reach the renderer after cleanup; they measure as a full em.

/// U+0020 through U+007E.
const ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// U+00A0 through U+00FF.
const LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp..¯
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // °..¿
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // À..Ï
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Ð..ß
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // à..ï
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // ð..ÿ
];

const FALLBACK: u32 = 1000;

/// Advance width of `c`.
pub fn glyph_width(c: char) -> u32 {
    let code = c as u32;
    let width = match code {
        0x20..=0x7E => ASCII[(code - 0x20) as usize],
        0xA0..=0xFF => LATIN1[(code - 0xA0) as usize],
        _ => return FALLBACK,
    };
    u32::from(width)
}

/// Advance width of `text`, without kerning.
pub fn text_width(text: &str) -> u32 {
    text.chars().map(glyph_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widths() {
        assert_eq!(glyph_width(' '), 278);
        assert_eq!(glyph_width('0'), 556);
        assert_eq!(glyph_width('M'), 833);
        assert_eq!(glyph_width('W'), 944);
        assert_eq!(glyph_width('i'), 222);
        assert_eq!(glyph_width('~'), 584);
        assert_eq!(glyph_width('é'), 556);
        assert_eq!(glyph_width('Æ'), 1000);
        assert_eq!(glyph_width('ÿ'), 500);
    }

    #[test]
    fn unmapped_characters_measure_a_full_em() {
        assert_eq!(glyph_width('\u{7F}'), FALLBACK);
        assert_eq!(glyph_width('→'), FALLBACK);
    }

    #[test]
    fn capitals_are_wider_than_lowercase() {
        assert!(text_width("MANAGEMENT") > text_width("management"));
        assert_eq!(text_width("MANAGEMENT"), 833 + 667 + 722 + 667 + 778 + 667 + 833 + 667 + 722 + 611);
    }
}
