//! # Text Wrapping
//!
//! Greedy line breaking at UAX#14 opportunities. Explicit newlines are
//! mandatory breaks; a single word wider than the line is broken between
//! characters so nothing ever runs past the right edge.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font;
use crate::surface::{TextOptions, MM_PER_PT};

/// Wrap `text` so no line is wider than `max_width` millimetres when set
/// in the given style.
pub fn wrap(text: &str, max_width: f64, options: &TextOptions) -> Vec<String> {
    wrap_with(text, max_width, |s| {
        font::measure(s, options.font_style, options.font_size) * MM_PER_PT
    })
}

/// Wrap with an arbitrary width function (same unit as `max_width`).
///
/// Empty and whitespace-only input yields no lines at all. Trailing blank
/// lines are dropped; blank lines between paragraphs are kept.
pub fn wrap_with<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut start = 0;

    for (idx, opp) in linebreaks(text) {
        let segment = &text[start..idx];
        start = idx;
        let piece = segment.trim_end_matches(['\r', '\n']);

        if !line.is_empty() {
            let candidate = format!("{}{}", line, piece);
            if measure(candidate.trim_end()) > max_width {
                lines.push(line.trim_end().to_string());
                line.clear();
            }
        }

        if line.is_empty() && measure(piece.trim_end()) > max_width {
            break_long_word(piece, max_width, &measure, &mut line, &mut lines);
        } else {
            line.push_str(piece);
        }

        if opp == BreakOpportunity::Mandatory {
            lines.push(line.trim_end().to_string());
            line.clear();
        }
    }

    if !line.trim_end().is_empty() {
        lines.push(line.trim_end().to_string());
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Character-level fallback for a segment that cannot fit on an empty line.
fn break_long_word<F>(
    piece: &str,
    max_width: f64,
    measure: &F,
    line: &mut String,
    lines: &mut Vec<String>,
) where
    F: Fn(&str) -> f64,
{
    for ch in piece.chars() {
        if !line.is_empty() {
            let mut next = line.clone();
            next.push(ch);
            if measure(next.trim_end()) > max_width {
                lines.push(line.trim_end().to_string());
                line.clear();
                if ch.is_whitespace() {
                    continue;
                }
            }
        }
        line.push(ch);
    }
}
