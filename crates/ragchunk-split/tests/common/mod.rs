#![allow(dead_code)]

use ragchunk_core::traits::Embedder;
use ragchunk_core::Chunk;

/// Two-topic embedder: sentences mentioning "rocket" point one way, all others the other way.
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn dim(&self) -> usize { 2 }
    fn max_len(&self) -> usize { 512 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| if t.contains("rocket") { vec![0.0, 1.0] } else { vec![1.0, 0.0] }).collect())
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize { 2 }
    fn max_len(&self) -> usize { 512 }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { anyhow::bail!("model not loaded") }
}

/// Returns one vector too few.
pub struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn dim(&self) -> usize { 2 }
    fn max_len(&self) -> usize { 512 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

/// A sentence of exactly `len` characters, trailing space included, starting with `topic`.
pub fn sentence(topic: &str, len: usize) -> String {
    format!("{topic} {}. ", "x".repeat(len - topic.len() - 3))
}

/// Deterministic prose mixing words, sentence ends, line and paragraph breaks and non-ASCII text.
pub fn prose(seed: u64, words: usize) -> String {
    const VOCAB: [&str; 10] = ["alpha", "beta", "gamma", "délta", "日本語", "x", "longerword", "ok", "naïve", "z9"];
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) as usize
    };
    let mut out = String::new();
    for _ in 0..words {
        out.push_str(VOCAB[next() % VOCAB.len()]);
        out.push_str(match next() % 20 {
            0 => ".\n\n",
            1 => "\n",
            2 | 3 => ". ",
            4 => "! ",
            _ => " ",
        });
    }
    out
}

/// Concatenate chunk bodies, dropping the overlap each chunk repeats.
pub fn reconstruct(chunks: &[Chunk]) -> String { chunks.iter().map(Chunk::body).collect() }

pub fn char_slice(text: &str, start: usize, end: usize) -> String { text.chars().skip(start).take(end - start).collect() }
