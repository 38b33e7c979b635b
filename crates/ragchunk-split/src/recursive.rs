//! Greedy separator-aware splitting shared by the recursive, token and section strategies.

use ragchunk_core::{ChunkFlag, Separator};
use tracing::warn;

use crate::measure::Measure;
use crate::Piece;

/// Split `text` into pieces whose measure, overlap included, stays within `max`.
///
/// Each piece after the first starts with the longest suffix of the consumed
/// text measuring at most `overlap`. The body is cut at the end of the last
/// occurrence of the coarsest separator that fits, falling through the list and
/// finally to a raw cut at the budget.
pub(crate) fn split(text: &str, measure: &dyn Measure, max: usize, overlap: usize, separators: &[Separator]) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut body_start = 0;
    while body_start < text.len() {
        let start = if pieces.is_empty() || overlap == 0 { body_start } else { measure.fit_suffix(&text[..body_start], overlap) };
        let limit = start + measure.fit_prefix(&text[start..], max);
        if limit == text.len() {
            pieces.push(Piece::new(start, body_start, text.len()));
            break;
        }
        if limit <= body_start {
            // Not even one character fits after the overlap.
            let end = text[body_start..].chars().next().map_or(text.len(), |c| body_start + c.len_utf8());
            warn!(at = body_start, max, "unit exceeds budget on its own, keeping it whole");
            pieces.push(Piece::new(start, body_start, end).flagged(ChunkFlag::Oversized));
            body_start = end;
            continue;
        }
        let window = &text[body_start..limit];
        let cut = separators
            .iter()
            .find_map(|sep| last_cut(window, *sep))
            .map_or(limit, |offset| body_start + offset);
        pieces.push(Piece::new(start, body_start, cut));
        body_start = cut;
    }
    pieces
}

/// Byte offset just past the last occurrence of `separator` in `window`.
fn last_cut(window: &str, separator: Separator) -> Option<usize> {
    match separator {
        Separator::Paragraph => window.rfind("\n\n").map(|i| i + 2),
        Separator::Line => window.rfind('\n').map(|i| i + 1),
        Separator::Sentence => {
            let mut cut = None;
            let mut prev = None;
            for (i, c) in window.char_indices() {
                if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) { cut = Some(i + c.len_utf8()); }
                prev = Some(c);
            }
            cut
        }
        Separator::Word => window.char_indices().filter(|(_, c)| c.is_whitespace()).last().map(|(i, c)| i + c.len_utf8()),
    }
}
