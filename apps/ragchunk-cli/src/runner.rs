use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use ragchunk_core::config::Settings;
use ragchunk_core::loader::DocumentLoader;
use ragchunk_core::sections::SectionDetector;
use ragchunk_core::store::{ChunkStore, ChunkingStats};
use ragchunk_core::{Chunk, Document, StrategyKind};
use ragchunk_embed::{get_default_embedder, get_token_counter};
use ragchunk_split::{chunk_with_fallback, Collaborators, StrategyConfig};
use tracing::{info, warn};

/// One batch run over an input directory.
#[derive(Debug, Clone)]
pub struct ChunkJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub strategies: Vec<StrategyKind>,
    pub limit: Option<usize>,
    pub detect_sections: bool,
    pub workers: usize,
    pub show_progress: bool,
}

/// Build only the collaborators the requested strategies use.
pub fn collaborators_for(strategies: &[StrategyKind], settings: &Settings) -> Result<Collaborators> {
    let mut with = Collaborators::default();
    if strategies.iter().any(|s| matches!(s, StrategyKind::Semantic | StrategyKind::Hybrid)) {
        with.embedder = Some(get_default_embedder(&settings.embedding).context("loading sentence embedder")?);
    }
    if strategies.contains(&StrategyKind::Token) {
        with.tokenizer = Some(get_token_counter(&settings.embedding).context("loading tokenizer")?);
    }
    Ok(with)
}

/// Plan per strategy: the config to run and the one to fall back to when a
/// document has no section markers.
struct Plan {
    kind: StrategyKind,
    primary: StrategyConfig,
    fallback: StrategyConfig,
}

type DocOutcome = (Document, Vec<(StrategyKind, ragchunk_core::Result<Vec<Chunk>>)>);

/// Chunk every document under `job.input_dir` and write one file per
/// document and strategy plus `chunking_summary.json`.
///
/// A document that fails under a strategy is logged and counted, and any file an
/// earlier run wrote for it under that strategy is removed; the run goes on.
pub async fn run(job: &ChunkJob, settings: &Settings, with: &Collaborators) -> Result<ChunkingStats> {
    let plans = plans(&job.strategies, settings, with)?;
    let documents = load(job)?;
    let store = ChunkStore::new(&job.output_dir)?;
    info!(documents = documents.len(), strategies = plans.len(), out = %job.output_dir.display(), "chunking");

    let progress = progress_bar(job.show_progress, documents.len());
    let plans = Arc::new(plans);
    let mut outcomes = stream::iter(documents)
        .map(|doc| {
            let plans = Arc::clone(&plans);
            tokio::task::spawn_blocking(move || chunk_document(doc, &plans))
        })
        .buffered(job.workers.max(1));

    let mut stats = ChunkingStats::default();
    while let Some(outcome) = outcomes.next().await {
        let (doc, results) = outcome.context("chunking worker panicked")?;
        let mut failed = false;
        for (kind, result) in results {
            match result {
                Ok(chunks) => {
                    store.write_chunks(kind, &doc, &chunks)?;
                    stats.record_chunks(kind, &chunks);
                }
                Err(e) => {
                    warn!(doc = %doc.id, strategy = %kind, error = %e, "chunking failed");
                    if store.remove_chunks(kind, &doc.id)? {
                        info!(doc = %doc.id, strategy = %kind, "removed chunks left by an earlier run");
                    }
                    failed = true;
                }
            }
        }
        if failed { stats.record_failure() } else { stats.record_document() }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = store.write_summary(&stats)?;
    info!(summary = %summary.display(), chunks = stats.total_chunks(), "chunking finished");
    Ok(stats)
}

fn plans(strategies: &[StrategyKind], settings: &Settings, with: &Collaborators) -> Result<Vec<Plan>> {
    let fallback = StrategyConfig::from_settings(StrategyKind::Recursive, &settings.chunking, with)?;
    strategies
        .iter()
        .map(|&kind| {
            let primary = StrategyConfig::from_settings(kind, &settings.chunking, with)
                .with_context(|| format!("configuring {kind} strategy"))?;
            Ok(Plan { kind, primary, fallback: fallback.clone() })
        })
        .collect()
}

fn load(job: &ChunkJob) -> Result<Vec<Document>> {
    let mut loader = DocumentLoader::new();
    if job.detect_sections {
        loader = loader.with_section_detection(SectionDetector::new().context("compiling heading patterns")?);
    }
    match job.limit {
        Some(limit) => loader.load_directory_limited(&job.input_dir, limit),
        None => loader.load_directory(&job.input_dir),
    }
}

fn chunk_document(doc: Document, plans: &[Plan]) -> DocOutcome {
    let results = plans.iter().map(|p| (p.kind, chunk_with_fallback(&doc, &p.primary, &p.fallback))).collect();
    (doc, results)
}

fn progress_bar(visible: bool, len: usize) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} documents") {
        bar.set_style(style);
    }
    bar
}
