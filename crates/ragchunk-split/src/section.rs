//! Section spans and the per-label rules of the section-based strategy.

use ragchunk_core::{ChunkFlag, Document, Error, Result, SectionLabel, Separator};
use tracing::{debug, warn};

use crate::measure::CharMeasure;
use crate::recursive;
use crate::strategy::SectionParams;
use crate::Piece;

/// Labeled byte range of the document text. `label` is `None` for the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionSpan {
    pub label: Option<SectionLabel>,
    pub page: Option<u32>,
    pub start: usize,
    pub end: usize,
}

impl SectionSpan {
    pub fn is_blank(&self, text: &str) -> bool { text[self.start..self.end].trim().is_empty() }

    /// Tag pieces computed on this span's slice with its label and page.
    pub fn adopt(&self, pieces: Vec<Piece>) -> impl Iterator<Item = Piece> + '_ {
        pieces.into_iter().map(move |p| {
            let mut p = p.shifted(self.start);
            p.section = self.label.clone();
            p.page = self.page;
            p
        })
    }
}

/// Resolve the document's markers into contiguous spans covering the whole text.
///
/// Every declared section must hold some text; only the preamble may be blank.
pub(crate) fn section_spans(doc: &Document) -> Result<Vec<SectionSpan>> {
    if !doc.has_structure() {
        return Err(Error::MissingStructure(format!("document '{}' has no section markers", doc.id)));
    }
    let mut markers: Vec<_> = doc.sections.iter().collect();
    markers.sort_by_key(|m| m.start);

    let offsets = byte_offsets(&doc.text);
    let char_len = offsets.len() - 1;
    for pair in markers.windows(2) {
        if pair[0].start == pair[1].start {
            return Err(Error::InvalidInput(format!(
                "sections '{}' and '{}' both start at {}",
                pair[0].label, pair[1].label, pair[0].start
            )));
        }
    }
    if let Some(last) = markers.last().filter(|m| m.start > char_len) {
        return Err(Error::InvalidInput(format!(
            "section '{}' starts at {} past the end of a {char_len}-character text",
            last.label, last.start
        )));
    }

    let fallback_page = doc.page();
    let mut spans = Vec::with_capacity(markers.len() + 1);
    if let Some(first) = markers.first().filter(|m| m.start > 0) {
        spans.push(SectionSpan { label: None, page: fallback_page, start: 0, end: offsets[first.start] });
    }
    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(doc.text.len(), |next| offsets[next.start]);
        spans.push(SectionSpan {
            label: Some(marker.label.clone()),
            page: marker.page.or(fallback_page),
            start: offsets[marker.start],
            end,
        });
    }
    if let Some(label) = spans.iter().find_map(|s| s.label.as_ref().filter(|_| s.is_blank(&doc.text))) {
        return Err(Error::InvalidInput(format!("section '{label}' in document '{}' has no text", doc.id)));
    }
    Ok(spans)
}

pub(crate) fn split(doc: &Document, params: &SectionParams) -> Result<Vec<Piece>> {
    let text = doc.text.as_str();
    let mut pieces = Vec::new();
    for span in section_spans(doc)? {
        if span.is_blank(text) {
            debug!("skipping blank preamble");
            continue;
        }
        let slice = &text[span.start..span.end];
        let local = match &span.label {
            Some(SectionLabel::Abstract | SectionLabel::References) => vec![whole(slice, params.max_size)],
            Some(SectionLabel::Methods | SectionLabel::Results) => subsections(slice)
                .into_iter()
                .filter(|&(s, e)| !slice[s..e].trim().is_empty())
                .flat_map(|(s, e)| recursive_pieces(&slice[s..e], params).into_iter().map(move |p| p.shifted(s)))
                .collect(),
            _ => recursive_pieces(slice, params),
        };
        pieces.extend(span.adopt(local));
    }
    Ok(pieces)
}

fn recursive_pieces(text: &str, params: &SectionParams) -> Vec<Piece> {
    recursive::split(text, &CharMeasure, params.max_size, params.overlap, &Separator::DEFAULT)
}

/// The section as a single piece, flagged when it is larger than the maximum.
fn whole(slice: &str, max_size: usize) -> Piece {
    let piece = Piece::new(0, 0, slice.len());
    let len = slice.chars().count();
    if len > max_size {
        warn!(len, max_size, "indivisible section exceeds max_size");
        return piece.flagged(ChunkFlag::Oversized);
    }
    piece
}

/// Byte ranges of `slice` split at numbered sub-heading lines such as "3.1 Setup".
fn subsections(slice: &str) -> Vec<(usize, usize)> {
    let mut cuts = vec![0];
    let mut line_start = 0;
    for line in slice.split_inclusive('\n') {
        if line_start > 0 && is_subheading(line) { cuts.push(line_start); }
        line_start += line.len();
    }
    cuts.push(slice.len());
    cuts.windows(2).map(|w| (w[0], w[1])).collect()
}

/// `N.M[.K...]` numbering, an optional trailing dot, whitespace, then a title.
fn is_subheading(line: &str) -> bool {
    let line = line.trim_start();
    let number_len = line.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(line.len());
    let number = line[..number_len].trim_end_matches('.');
    let mut parts = number.split('.');
    let well_formed = parts.clone().count() >= 2 && parts.all(|p| !p.is_empty());
    let rest = &line[number_len..];
    well_formed
        && rest.starts_with([' ', '\t'])
        && rest.trim_start().starts_with(|c: char| c.is_alphabetic())
}

/// Byte offset of every character boundary, the text length included.
pub(crate) fn byte_offsets(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect()
}
