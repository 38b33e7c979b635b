//! Domain types shared by the loader, the strategies and the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type Meta = BTreeMap<String, String>;

/// Structural label of a document section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionLabel {
    Abstract,
    Introduction,
    RelatedWork,
    Methods,
    Experiments,
    Results,
    Discussion,
    Conclusion,
    References,
    Other(String),
}

impl SectionLabel {
    /// Parse a heading or metadata name. Leading numbering such as "2." is ignored.
    pub fn parse(name: &str) -> Self {
        let trimmed = name
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c.is_whitespace());
        let key = trimmed.to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "abstract" => Self::Abstract,
            "introduction" => Self::Introduction,
            "related_work" => Self::RelatedWork,
            "methods" | "method" | "methodology" | "approach" => Self::Methods,
            "experiments" | "experiment" | "experimental_results" => Self::Experiments,
            "results" => Self::Results,
            "discussion" => Self::Discussion,
            "conclusion" | "conclusions" => Self::Conclusion,
            "references" | "bibliography" => Self::References,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Abstract => "abstract",
            Self::Introduction => "introduction",
            Self::RelatedWork => "related_work",
            Self::Methods => "methods",
            Self::Experiments => "experiments",
            Self::Results => "results",
            Self::Discussion => "discussion",
            Self::Conclusion => "conclusion",
            Self::References => "references",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl From<String> for SectionLabel {
    fn from(value: String) -> Self { Self::parse(&value) }
}

impl From<SectionLabel> for String {
    fn from(value: SectionLabel) -> Self { value.as_str().to_string() }
}

/// Start of a labeled section. The span runs to the next marker or the end of text.
///
/// `start` is a character offset into `Document::text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarker {
    pub label: SectionLabel,
    pub start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SectionMarker {
    pub fn new(label: SectionLabel, start: usize) -> Self { Self { label, start, page: None } }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Extracted document text plus metadata, as handed over by a parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Meta,
    #[serde(default)]
    pub sections: Vec<SectionMarker>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Meta::new(), sections: Vec::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_sections(mut self, sections: Vec<SectionMarker>) -> Self {
        self.sections = sections;
        self
    }

    pub fn has_structure(&self) -> bool { !self.sections.is_empty() }

    /// Page number from the `page` metadata field, if it parses.
    pub fn page(&self) -> Option<u32> { self.metadata.get("page").and_then(|p| p.trim().parse().ok()) }

    pub fn char_len(&self) -> usize { self.text.chars().count() }
}

/// Chunking method tag carried by every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Recursive,
    Semantic,
    Token,
    Section,
    Hybrid,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [Self::Recursive, Self::Semantic, Self::Token, Self::Section, Self::Hybrid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Semantic => "semantic",
            Self::Token => "token",
            Self::Section => "section",
            Self::Hybrid => "hybrid",
        }
    }

    /// Strategies that read section markers and set `section`/`page` on chunks.
    pub fn is_structure_aware(self) -> bool { matches!(self, Self::Section | Self::Hybrid) }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "semantic" => Ok(Self::Semantic),
            "token" | "token_based" => Ok(Self::Token),
            "section" | "section_based" => Ok(Self::Section),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(Error::Config(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Split points tried by the recursive and token strategies, coarsest first.
/// Raw character splitting always follows the configured list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    Paragraph,
    Line,
    Sentence,
    Word,
}

impl Separator {
    pub const DEFAULT: [Separator; 3] = [Self::Paragraph, Self::Line, Self::Sentence];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkFlag {
    /// One indivisible unit larger than the configured maximum, kept whole.
    Oversized,
    /// Semantic chunk closed by the maximum bound instead of a similarity drop.
    ForcedSplit,
}

/// A contiguous span of a document prepared for independent retrieval.
///
/// - `text` is exactly the document characters `char_start..char_end`
/// - `overlap_len` leading characters are shared with the previous chunk
/// - identity is `(source_document_id, strategy, chunk_index)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub chunk_index: usize,
    pub source_document_id: String,
    pub strategy: StrategyKind,
    pub section: Option<SectionLabel>,
    pub page: Option<u32>,
    pub char_start: usize,
    pub char_end: usize,
    pub overlap_len: usize,
    pub flags: Vec<ChunkFlag>,
}

impl Chunk {
    pub fn id(&self) -> String { format!("{}:{}:{}", self.source_document_id, self.strategy, self.chunk_index) }

    pub fn has_flag(&self, flag: ChunkFlag) -> bool { self.flags.contains(&flag) }

    pub fn is_oversized(&self) -> bool { self.has_flag(ChunkFlag::Oversized) }

    /// Reference lists are kept as chunks but left out of semantic search indexes.
    pub fn is_indexable(&self) -> bool { self.section != Some(SectionLabel::References) }

    pub fn char_len(&self) -> usize { self.char_end - self.char_start }

    /// Text after the overlap shared with the previous chunk.
    pub fn body(&self) -> &str {
        match self.text.char_indices().nth(self.overlap_len) {
            Some((byte, _)) => &self.text[byte..],
            None => "",
        }
    }
}
