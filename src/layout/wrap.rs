//! Greedy word wrapping against real font metrics. Lines are measured
//! with the same face and size the renderer will use.

use super::font::{text_width_mm, FontWeight};

/// Split `text` into lines that each fit within `max_width_mm` when set
/// at `size_pt` in `weight`. Words are kept whole where possible; a word
/// wider than the whole line is broken at character boundaries. A line
/// that already fits comes back as a single-element sequence equal to
/// the input, so wrapping is idempotent.
pub fn wrap_to_width(
    text: &str,
    max_width_mm: f64,
    size_pt: f64,
    weight: FontWeight,
) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in words {
        if current.is_empty() {
            push_word(&mut lines, &mut current, word, max_width_mm, size_pt, weight);
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width_mm(&candidate, size_pt, weight) <= max_width_mm {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            push_word(&mut lines, &mut current, word, max_width_mm, size_pt, weight);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Start a fresh line with `word`, hard-breaking it when it alone is
/// wider than the line.
fn push_word(
    lines: &mut Vec<String>,
    current: &mut String,
    word: &str,
    max_width_mm: f64,
    size_pt: f64,
    weight: FontWeight,
) {
    if text_width_mm(word, size_pt, weight) <= max_width_mm {
        current.push_str(word);
        return;
    }
    let mut piece = String::new();
    for c in word.chars() {
        let mut candidate = piece.clone();
        candidate.push(c);
        if !piece.is_empty() && text_width_mm(&candidate, size_pt, weight) > max_width_mm {
            lines.push(std::mem::take(&mut piece));
            piece.push(c);
        } else {
            piece = candidate;
        }
    }
    *current = piece;
}
