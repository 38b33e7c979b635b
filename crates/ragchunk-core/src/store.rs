//! JSON persistence of chunk sequences and run statistics.
//!
//! Layout: `<root>/<strategy>/<doc_id>.json` holds one document's chunks for
//! one strategy; `<root>/chunking_summary.json` holds the run counters.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Chunk, ChunkFlag, Document, Meta, SectionLabel, StrategyKind};

/// On-disk form of a chunk, ready for an embedding/indexing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub strategy: StrategyKind,
    pub section: Option<SectionLabel>,
    pub page: Option<u32>,
    pub char_start: usize,
    pub char_end: usize,
    pub overlap_len: usize,
    pub flags: Vec<ChunkFlag>,
    pub indexable: bool,
    pub content_hash: String,
    pub metadata: Meta,
}

impl ChunkRecord {
    pub fn from_chunk(chunk: &Chunk, total_chunks: usize, document: &Document) -> Self {
        Self {
            id: chunk.id(),
            content: chunk.text.clone(),
            chunk_index: chunk.chunk_index,
            total_chunks,
            strategy: chunk.strategy,
            section: chunk.section.clone(),
            page: chunk.page,
            char_start: chunk.char_start,
            char_end: chunk.char_end,
            overlap_len: chunk.overlap_len,
            flags: chunk.flags.clone(),
            indexable: chunk.is_indexable(),
            content_hash: blake3::hash(chunk.text.as_bytes()).to_hex().to_string(),
            metadata: document.metadata.clone(),
        }
    }
}

pub struct ChunkStore {
    root: PathBuf,
}

impl ChunkStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).with_context(|| format!("creating {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn chunk_path(&self, strategy: StrategyKind, doc_id: &str) -> PathBuf {
        self.root.join(strategy.as_str()).join(format!("{doc_id}.json"))
    }

    /// Replace the stored chunks of `document` under the `strategy` directory.
    pub fn write_chunks(&self, strategy: StrategyKind, document: &Document, chunks: &[Chunk]) -> Result<PathBuf> {
        let dir = self.root.join(strategy.as_str());
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let records: Vec<ChunkRecord> = chunks.iter().map(|c| ChunkRecord::from_chunk(c, chunks.len(), document)).collect();
        let path = self.chunk_path(strategy, &document.id);
        fs::write(&path, serde_json::to_string_pretty(&records)?).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Delete the chunk file of `doc_id` under `strategy`, if one exists.
    /// Returns whether a file was removed.
    pub fn remove_chunks(&self, strategy: StrategyKind, doc_id: &str) -> Result<bool> {
        let path = self.chunk_path(strategy, doc_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }

    pub fn read_chunks(&self, strategy: StrategyKind, doc_id: &str) -> Result<Vec<ChunkRecord>> {
        let path = self.chunk_path(strategy, doc_id);
        let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_summary(&self, stats: &ChunkingStats) -> Result<PathBuf> {
        let path = self.root.join("chunking_summary.json");
        fs::write(&path, serde_json::to_string_pretty(stats)?).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// Counters for one chunking run, keyed by requested strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub chunks: BTreeMap<StrategyKind, usize>,
    pub fallbacks: BTreeMap<StrategyKind, usize>,
    pub oversized_chunks: usize,
}

impl ChunkingStats {
    pub fn record_chunks(&mut self, requested: StrategyKind, chunks: &[Chunk]) {
        *self.chunks.entry(requested).or_default() += chunks.len();
        self.oversized_chunks += chunks.iter().filter(|c| c.is_oversized()).count();
        if chunks.first().is_some_and(|c| c.strategy != requested) {
            *self.fallbacks.entry(requested).or_default() += 1;
        }
    }

    pub fn record_document(&mut self) { self.documents_processed += 1; }

    pub fn record_failure(&mut self) { self.documents_failed += 1; }

    pub fn total_chunks(&self) -> usize { self.chunks.values().sum() }
}
