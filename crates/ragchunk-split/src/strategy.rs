//! Strategy selection and parameters.

use std::fmt;
use std::sync::Arc;

use ragchunk_core::config::{ChunkingSettings, RecursiveSettings, SectionSettings, SemanticSettings, TokenSettings};
use ragchunk_core::traits::{Embedder, TokenCounter};
use ragchunk_core::{Error, Result, Separator, StrategyKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveParams {
    /// Maximum chunk length in characters, overlap included.
    pub max_size: usize,
    pub overlap: usize,
    pub separators: Vec<Separator>,
}

impl Default for RecursiveParams {
    fn default() -> Self { Self { max_size: 1000, overlap: 200, separators: Separator::DEFAULT.to_vec() } }
}

impl From<&RecursiveSettings> for RecursiveParams {
    fn from(s: &RecursiveSettings) -> Self { Self { max_size: s.max_size, overlap: s.overlap, separators: s.separators.clone() } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParams {
    pub max_tokens: usize,
    pub overlap: usize,
    pub separators: Vec<Separator>,
}

impl Default for TokenParams {
    fn default() -> Self { Self { max_tokens: 512, overlap: 50, separators: Separator::DEFAULT.to_vec() } }
}

impl From<&TokenSettings> for TokenParams {
    fn from(s: &TokenSettings) -> Self { Self { max_tokens: s.max_tokens, overlap: s.overlap, ..Self::default() } }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticParams {
    /// Low-similarity boundaries are ignored until a chunk reaches this many characters.
    pub min_size: usize,
    pub max_size: usize,
    pub similarity_threshold: f32,
}

impl Default for SemanticParams {
    fn default() -> Self { Self { min_size: 500, max_size: 1500, similarity_threshold: 0.5 } }
}

impl From<&SemanticSettings> for SemanticParams {
    fn from(s: &SemanticSettings) -> Self {
        Self { min_size: s.min_size, max_size: s.max_size, similarity_threshold: s.similarity_threshold }
    }
}

/// Size used when a section is re-chunked recursively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionParams {
    pub max_size: usize,
    pub overlap: usize,
}

impl Default for SectionParams {
    fn default() -> Self { Self { max_size: 1000, overlap: 200 } }
}

impl From<&SectionSettings> for SectionParams {
    fn from(s: &SectionSettings) -> Self { Self { max_size: s.max_size, overlap: s.overlap } }
}

/// Injected capabilities, needed only by the strategies that use them.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub embedder: Option<Arc<dyn Embedder>>,
    pub tokenizer: Option<Arc<dyn TokenCounter>>,
}

#[derive(Clone)]
pub enum StrategyConfig {
    Recursive(RecursiveParams),
    Semantic { params: SemanticParams, embedder: Arc<dyn Embedder> },
    Token { params: TokenParams, tokenizer: Arc<dyn TokenCounter> },
    Section(SectionParams),
    /// Section-based chunks, each refined by semantic boundaries.
    Hybrid { params: SemanticParams, section: SectionParams, embedder: Arc<dyn Embedder> },
}

impl StrategyConfig {
    pub fn recursive(max_size: usize, overlap: usize) -> Self {
        Self::Recursive(RecursiveParams { max_size, overlap, ..RecursiveParams::default() })
    }

    pub fn semantic(embedder: Arc<dyn Embedder>) -> Self { Self::Semantic { params: SemanticParams::default(), embedder } }

    pub fn token(tokenizer: Arc<dyn TokenCounter>) -> Self { Self::Token { params: TokenParams::default(), tokenizer } }

    pub fn section() -> Self { Self::Section(SectionParams::default()) }

    pub fn hybrid(embedder: Arc<dyn Embedder>) -> Self {
        Self::Hybrid { params: SemanticParams::default(), section: SectionParams::default(), embedder }
    }

    /// Build the config for `kind` from settings, taking collaborators from `with`.
    pub fn from_settings(kind: StrategyKind, settings: &ChunkingSettings, with: &Collaborators) -> Result<Self> {
        let embedder = || with.embedder.clone().ok_or_else(|| Error::Config(format!("{kind} strategy needs an embedder")));
        let config = match kind {
            StrategyKind::Recursive => Self::Recursive((&settings.recursive).into()),
            StrategyKind::Semantic => Self::Semantic { params: (&settings.semantic).into(), embedder: embedder()? },
            StrategyKind::Token => Self::Token {
                params: TokenParams { separators: settings.recursive.separators.clone(), ..TokenParams::from(&settings.token) },
                tokenizer: with
                    .tokenizer
                    .clone()
                    .ok_or_else(|| Error::Config("token strategy needs a tokenizer".to_string()))?,
            },
            StrategyKind::Section => Self::Section((&settings.section).into()),
            StrategyKind::Hybrid => Self::Hybrid {
                params: (&settings.semantic).into(),
                section: (&settings.section).into(),
                embedder: embedder()?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Recursive(_) => StrategyKind::Recursive,
            Self::Semantic { .. } => StrategyKind::Semantic,
            Self::Token { .. } => StrategyKind::Token,
            Self::Section(_) => StrategyKind::Section,
            Self::Hybrid { .. } => StrategyKind::Hybrid,
        }
    }

    /// Reject parameter combinations before any text is touched.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Recursive(p) => check_window(p.max_size, p.overlap),
            Self::Token { params, .. } => check_window(params.max_tokens, params.overlap),
            Self::Section(p) => check_window(p.max_size, p.overlap),
            Self::Semantic { params, .. } => check_semantic(params),
            Self::Hybrid { params, section, .. } => {
                check_window(section.max_size, section.overlap)?;
                check_semantic(params)
            }
        }
    }
}

fn check_semantic(params: &SemanticParams) -> Result<()> {
    if params.max_size == 0 {
        return Err(Error::Config("max_size must be positive".to_string()));
    }
    if params.min_size > params.max_size {
        return Err(Error::Config(format!("min_size {} exceeds max_size {}", params.min_size, params.max_size)));
    }
    if !(0.0..=1.0).contains(&params.similarity_threshold) {
        return Err(Error::Config(format!(
            "similarity_threshold must be in [0,1], got {}",
            params.similarity_threshold
        )));
    }
    Ok(())
}

fn check_window(max_size: usize, overlap: usize) -> Result<()> {
    if max_size == 0 {
        return Err(Error::Config("max_size must be positive".to_string()));
    }
    if overlap >= max_size {
        return Err(Error::Config(format!("overlap {overlap} must be smaller than max_size {max_size}")));
    }
    Ok(())
}

impl fmt::Debug for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recursive(p) => f.debug_tuple("Recursive").field(p).finish(),
            Self::Semantic { params, .. } => f.debug_tuple("Semantic").field(params).finish(),
            Self::Token { params, .. } => f.debug_tuple("Token").field(params).finish(),
            Self::Section(p) => f.debug_tuple("Section").field(p).finish(),
            Self::Hybrid { params, section, .. } => f.debug_tuple("Hybrid").field(params).field(section).finish(),
        }
    }
}
