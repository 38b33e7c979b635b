use std::path::Path;

use anyhow::{anyhow, Result};
use ragchunk_core::traits::TokenCounter;
use tokenizers::Tokenizer;
use tracing::warn;

/// Word-based estimate: English prose averages about 0.75 words per token.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCounter;

impl TokenCounter for ApproxTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        (words * 4).div_ceil(3)
    }
}

/// Counts with a Hugging Face `tokenizer.json`, special tokens excluded.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
}

impl HfTokenCounter {
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("failed to load tokenizer from {}: {}", path.display(), e))?;
        Ok(Self { tokenizer })
    }

    pub fn new(tokenizer: Tokenizer) -> Self { Self { tokenizer } }
}

impl TokenCounter for HfTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(enc) => enc.get_ids().len(),
            Err(e) => {
                warn!(error = %e, "tokenizer failed, counting characters instead");
                text.chars().count()
            }
        }
    }
}
