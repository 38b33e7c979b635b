//! ragchunk-split
//!
//! The chunking pipeline: five strategies turning one [`Document`] into an
//! ordered, provenance-tagged sequence of [`Chunk`]s. Every strategy is a pure
//! function of the document and its [`StrategyConfig`]; collaborators
//! (tokenizer, sentence embedder) are injected through the config.
//!
//! [`Document`]: ragchunk_core::Document
//! [`Chunk`]: ragchunk_core::Chunk

mod hybrid;
mod measure;
mod pipeline;
mod recursive;
mod section;
mod semantic;
mod sentences;
pub mod strategy;

pub use pipeline::{chunk, chunk_with_fallback};
pub use strategy::{Collaborators, RecursiveParams, SectionParams, SemanticParams, StrategyConfig, TokenParams};

/// Byte range of one output chunk inside the text handed to a strategy.
///
/// `body_start` is where the text shared with the previous chunk ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Piece {
    pub start: usize,
    pub body_start: usize,
    pub end: usize,
    pub section: Option<ragchunk_core::SectionLabel>,
    pub page: Option<u32>,
    pub flags: Vec<ragchunk_core::ChunkFlag>,
}

impl Piece {
    pub fn new(start: usize, body_start: usize, end: usize) -> Self {
        Self { start, body_start, end, section: None, page: None, flags: Vec::new() }
    }

    pub fn flagged(mut self, flag: ragchunk_core::ChunkFlag) -> Self {
        if !self.flags.contains(&flag) { self.flags.push(flag); }
        self
    }

    /// Shift a piece computed on a sub-slice back into document coordinates.
    pub fn shifted(mut self, by: usize) -> Self {
        self.start += by;
        self.body_start += by;
        self.end += by;
        self
    }
}
