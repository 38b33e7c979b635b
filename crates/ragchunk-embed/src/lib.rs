//! ragchunk-embed
//!
//! Collaborators injected into the chunking strategies: token counters for the
//! token strategy and sentence embedders for the semantic and hybrid ones.

mod batch;
mod counter;
mod device;
mod fake;
mod model;
mod pool;
mod tokenize;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use ragchunk_core::config::{expand_path, EmbeddingSettings};
use ragchunk_core::traits::{Embedder, TokenCounter};
use tracing::info;

pub use batch::embed_in_batches;
pub use counter::{ApproxTokenCounter, HfTokenCounter};
pub use device::select_device;
pub use fake::FakeEmbedder;
pub use model::BgeM3Embedder;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_batch;

/// Output width of BGE-M3, also used for the fake embedder.
pub const EMBEDDING_DIM: usize = 1024;

/// Fake embeddings when `APP_USE_FAKE_EMBEDDINGS` is set (or `embedding.use_fake`),
/// the BGE-M3 model otherwise.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if use_fake(settings) {
        info!("using FakeEmbedder");
        return Ok(Arc::new(FakeEmbedder::new(EMBEDDING_DIM)));
    }
    let model_dir = resolve_model_dir(settings)?;
    Ok(Arc::new(BgeM3Embedder::load(&model_dir, settings.max_len, settings.batch_size)?))
}

/// The configured `tokenizer.json`, else the model's, else the word estimate.
pub fn get_token_counter(settings: &EmbeddingSettings) -> Result<Arc<dyn TokenCounter>> {
    if let Some(path) = &settings.tokenizer_path {
        return Ok(Arc::new(HfTokenCounter::from_file(&expand_path(path))?));
    }
    if let Ok(dir) = resolve_model_dir(settings) {
        let path = dir.join("tokenizer.json");
        if path.exists() {
            info!(tokenizer = %path.display(), "counting tokens with model tokenizer");
            return Ok(Arc::new(HfTokenCounter::from_file(&path)?));
        }
    }
    info!("no tokenizer configured, estimating tokens from word counts");
    Ok(Arc::new(ApproxTokenCounter))
}

fn use_fake(settings: &EmbeddingSettings) -> bool {
    let from_env = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    from_env || settings.use_fake
}

/// `embedding.model_dir`, then `APP_MODEL_DIR`/`MODEL_DIR`, then `models/bge-m3`
/// relative to the working directory or its parent.
pub fn resolve_model_dir(settings: &EmbeddingSettings) -> Result<PathBuf> {
    let configured = settings.model_dir.iter().cloned();
    let from_env = ["APP_MODEL_DIR", "MODEL_DIR"].into_iter().filter_map(|k| std::env::var(k).ok());
    for dir in configured.chain(from_env) {
        let p = expand_path(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    ["models/bge-m3", "../models/bge-m3"]
        .into_iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("could not locate BGE-M3 model directory; set embedding.model_dir or APP_MODEL_DIR"))
}
