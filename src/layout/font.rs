//! Advance widths for the built-in Helvetica faces, taken from the Adobe
//! AFM metrics (units of 1/1000 em). Wrapping decisions have to use the
//! same face and size that later paints the text, so the renderer and the
//! measurer share this table.

/// Font weight of a drawn text run. Only the two faces the receipt
/// actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Points to millimetres (1pt = 1/72 inch).
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Helvetica advance widths for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of one character in milli-em. Characters outside the
/// table (anything non-ASCII other than the bullet and em-dash used on
/// the receipt) fall back to the digit width.
fn char_width_milliem(c: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Normal => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    match c {
        ' '..='~' => table[c as usize - 0x20],
        '\u{2022}' => 350, // bullet
        '\u{2014}' => 1000, // em dash
        _ => 556,
    }
}

/// Width of `text` in mm when set in the given face at `size_pt`.
pub fn text_width_mm(text: &str, size_pt: f64, weight: FontWeight) -> f64 {
    let milliem: u64 = text
        .chars()
        .map(|c| char_width_milliem(c, weight) as u64)
        .sum();
    milliem as f64 / 1000.0 * size_pt * PT_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(text_width_mm("", 8.0, FontWeight::Normal), 0.0);
    }

    #[test]
    fn width_scales_with_size() {
        let at8 = text_width_mm("Consultation", 8.0, FontWeight::Normal);
        let at4 = text_width_mm("Consultation", 4.0, FontWeight::Normal);
        assert!((at8 - 2.0 * at4).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider_for_letters() {
        let normal = text_width_mm("Rupees", 8.0, FontWeight::Normal);
        let bold = text_width_mm("Rupees", 8.0, FontWeight::Bold);
        assert!(bold > normal);
    }

    #[test]
    fn known_width_matches_afm() {
        // "iii" in Helvetica: 3 x 222 milli-em at 10pt
        let expected = 3.0 * 0.222 * 10.0 * PT_TO_MM;
        let got = text_width_mm("iii", 10.0, FontWeight::Normal);
        assert!((got - expected).abs() < 1e-9);
    }
}
