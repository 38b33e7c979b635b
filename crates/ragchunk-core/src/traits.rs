//! Capability interfaces for the collaborators a strategy may need.

/// Sentence embedder used by the semantic and hybrid strategies.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Token counter used by the token-based strategy.
///
/// Counts must not shrink when text is appended; the splitter binary-searches
/// prefixes and suffixes against the budget.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count_tokens(&self, text: &str) -> usize { self(text) }
}
