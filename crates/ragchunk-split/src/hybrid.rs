use ragchunk_core::traits::Embedder;
use ragchunk_core::{Document, Result};

use crate::strategy::{SectionParams, SemanticParams};
use crate::{section, semantic, Piece};

/// Section-based chunking first, then semantic chunking inside the new text of
/// each section chunk. Every section-based boundary stays a boundary and no
/// chunk crosses one. Overlap is dropped: pieces tile the section bodies.
pub(crate) fn split(
    doc: &Document,
    params: &SemanticParams,
    sections: &SectionParams,
    embedder: &dyn Embedder,
) -> Result<Vec<Piece>> {
    let text = doc.text.as_str();
    let mut pieces = Vec::new();
    for outer in section::split(doc, sections)? {
        let local = semantic::split(&text[outer.body_start..outer.end], params, embedder)?;
        pieces.extend(local.into_iter().map(|p| {
            let mut p = p.shifted(outer.body_start);
            p.section = outer.section.clone();
            p.page = outer.page;
            p
        }));
    }
    Ok(pieces)
}
