//! Similarity-driven boundaries between consecutive sentences.

use ragchunk_core::traits::Embedder;
use ragchunk_core::{ChunkFlag, Error, Result};
use tracing::{trace, warn};

use crate::sentences::sentence_spans;
use crate::strategy::SemanticParams;
use crate::Piece;

/// Group sentences into chunks, closing a chunk where the similarity to the
/// next sentence drops below the threshold (once the chunk holds `min_size`
/// characters) or where the next sentence would push it past `max_size`.
pub(crate) fn split(text: &str, params: &SemanticParams, embedder: &dyn Embedder) -> Result<Vec<Piece>> {
    let sentences = sentence_spans(text);
    if sentences.len() <= 1 {
        return Ok(sentences.into_iter().map(|(s, e)| bounded(Piece::new(s, s, e), text, params.max_size)).collect());
    }
    let similarities = adjacent_similarities(text, &sentences, embedder)?;
    let lengths: Vec<usize> = sentences.iter().map(|&(s, e)| text[s..e].chars().count()).collect();

    let mut pieces = Vec::new();
    let mut chunk_start = sentences[0].0;
    let mut chunk_len = lengths[0];
    for j in 1..sentences.len() {
        let boundary = sentences[j].0;
        let similarity = similarities[j - 1];
        if similarity < params.similarity_threshold && chunk_len >= params.min_size {
            trace!(at = boundary, similarity, "semantic boundary");
            pieces.push(bounded(Piece::new(chunk_start, chunk_start, boundary), text, params.max_size));
        } else if chunk_len + lengths[j] > params.max_size {
            trace!(at = boundary, chunk_len, "forced boundary");
            pieces.push(bounded(Piece::new(chunk_start, chunk_start, boundary), text, params.max_size).flagged(ChunkFlag::ForcedSplit));
        } else {
            chunk_len += lengths[j];
            continue;
        }
        chunk_start = boundary;
        chunk_len = lengths[j];
    }
    pieces.push(bounded(Piece::new(chunk_start, chunk_start, text.len()), text, params.max_size));
    Ok(pieces)
}

/// Flag a piece that is a single sentence longer than the maximum.
fn bounded(piece: Piece, text: &str, max_size: usize) -> Piece {
    let len = text[piece.start..piece.end].chars().count();
    if len > max_size {
        warn!(len, max_size, "sentence exceeds max_size, keeping it whole");
        return piece.flagged(ChunkFlag::Oversized);
    }
    piece
}

fn adjacent_similarities(text: &str, sentences: &[(usize, usize)], embedder: &dyn Embedder) -> Result<Vec<f32>> {
    let inputs: Vec<String> = sentences.iter().map(|&(s, e)| text[s..e].trim().to_string()).collect();
    let embeddings = embedder.embed_batch(&inputs).map_err(|e| Error::Collaborator(format!("embedding sentences: {e}")))?;
    if embeddings.len() != inputs.len() {
        return Err(Error::Collaborator(format!(
            "embedder returned {} vectors for {} sentences",
            embeddings.len(),
            inputs.len()
        )));
    }
    embeddings.windows(2).map(|pair| cosine(&pair[0], &pair[1])).collect()
}

fn cosine(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::Collaborator(format!("embedding dimensions differ: {} vs {}", a.len(), b.len())));
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 { return Ok(0.0); }
    Ok(dot / (norm_a * norm_b))
}
