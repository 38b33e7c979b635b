use ragchunk_core::{Chunk, Document, Error, Result, StrategyKind};
use tracing::{debug, info};

use crate::measure::{CharMeasure, TokenMeasure};
use crate::section::byte_offsets;
use crate::strategy::StrategyConfig;
use crate::{hybrid, recursive, section, semantic, Piece};

/// Split one document into an ordered chunk sequence.
///
/// Fails as a whole: on error no chunks are produced.
///
/// # Errors
///
/// - `Config` for parameters that fail validation, before the text is read
/// - `InvalidInput` for empty or whitespace-only text and malformed section markers
/// - `MissingStructure` when a section or hybrid run finds no markers
/// - `Collaborator` when the embedder fails or returns inconsistent vectors
pub fn chunk(doc: &Document, config: &StrategyConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    if doc.text.trim().is_empty() {
        return Err(Error::InvalidInput(format!("document '{}' has no text", doc.id)));
    }
    let text = doc.text.as_str();
    let pieces = match config {
        StrategyConfig::Recursive(p) => recursive::split(text, &CharMeasure, p.max_size, p.overlap, &p.separators),
        StrategyConfig::Token { params, tokenizer } => recursive::split(
            text,
            &TokenMeasure(tokenizer.as_ref()),
            params.max_tokens,
            params.overlap,
            &params.separators,
        ),
        StrategyConfig::Semantic { params, embedder } => semantic::split(text, params, embedder.as_ref())?,
        StrategyConfig::Section(p) => section::split(doc, p)?,
        StrategyConfig::Hybrid { params, section, embedder } => hybrid::split(doc, params, section, embedder.as_ref())?,
    };
    let chunks = assemble(doc, config.kind(), pieces);
    debug!(doc = %doc.id, strategy = %config.kind(), chunks = chunks.len(), "chunked document");
    Ok(chunks)
}

/// Run `primary`, switching to `fallback` when the document lacks the
/// structure `primary` needs. Other errors are returned as is.
pub fn chunk_with_fallback(doc: &Document, primary: &StrategyConfig, fallback: &StrategyConfig) -> Result<Vec<Chunk>> {
    match chunk(doc, primary) {
        Err(Error::MissingStructure(reason)) => {
            info!(doc = %doc.id, from = %primary.kind(), to = %fallback.kind(), %reason, "falling back");
            chunk(doc, fallback)
        }
        other => other,
    }
}

/// Convert byte pieces into chunks carrying character offsets and provenance.
fn assemble(doc: &Document, strategy: StrategyKind, pieces: Vec<Piece>) -> Vec<Chunk> {
    let offsets = byte_offsets(&doc.text);
    let to_char = |byte: usize| offsets.partition_point(|&b| b < byte);
    pieces
        .into_iter()
        .enumerate()
        .map(|(chunk_index, piece)| {
            let char_start = to_char(piece.start);
            Chunk {
                text: doc.text[piece.start..piece.end].to_string(),
                chunk_index,
                source_document_id: doc.id.clone(),
                strategy,
                section: piece.section,
                page: piece.page,
                char_start,
                char_end: to_char(piece.end),
                overlap_len: to_char(piece.body_start) - char_start,
                flags: piece.flags,
            }
        })
        .collect()
}
