mod common;

use std::sync::Arc;

use common::{reconstruct, sentence, FailingEmbedder, KeywordEmbedder, ShortEmbedder};
use ragchunk_core::traits::Embedder;
use ragchunk_core::{ChunkFlag, Document, Error, StrategyKind};
use ragchunk_split::{chunk, SemanticParams, StrategyConfig};

fn semantic(min_size: usize, max_size: usize, embedder: Arc<dyn Embedder>) -> StrategyConfig {
    StrategyConfig::Semantic { params: SemanticParams { min_size, max_size, similarity_threshold: 0.5 }, embedder }
}

fn ranges(doc: &Document, config: &StrategyConfig) -> Vec<(usize, usize)> {
    chunk(doc, config).expect("chunk").iter().map(|c| (c.char_start, c.char_end)).collect()
}

#[test]
fn topic_shift_below_min_size_is_ignored() {
    let text = [sentence("cat", 30), sentence("rocket", 30), sentence("rocket", 30), sentence("cat", 60), sentence("cat", 30)].concat();
    let doc = Document::new("s", text.clone());
    let config = semantic(50, 1000, Arc::new(KeywordEmbedder));

    assert_eq!(ranges(&doc, &config), vec![(0, 90), (90, 180)], "first drop at 30 chars is inside min_size");
    let chunks = chunk(&doc, &config).expect("chunk");
    assert!(chunks.iter().all(|c| c.flags.is_empty() && c.overlap_len == 0));
    assert!(chunks.iter().all(|c| c.strategy == StrategyKind::Semantic));
    assert_eq!(reconstruct(&chunks), text);
}

#[test]
fn max_size_forces_a_split_at_the_last_sentence_that_fits() {
    let text = sentence("cat", 40).repeat(5);
    let doc = Document::new("f", text);
    let chunks = chunk(&doc, &semantic(10, 100, Arc::new(KeywordEmbedder))).expect("chunk");

    let got: Vec<_> = chunks.iter().map(|c| (c.char_start, c.char_end, c.has_flag(ChunkFlag::ForcedSplit))).collect();
    assert_eq!(got, vec![(0, 80, true), (80, 160, true), (160, 200, false)]);
    assert!(chunks.iter().all(|c| c.char_len() <= 100));
}

#[test]
fn semantic_boundary_wins_when_both_bounds_apply() {
    let text = [sentence("cat", 60), sentence("rocket", 60)].concat();
    let chunks = chunk(&Document::new("b", text), &semantic(10, 100, Arc::new(KeywordEmbedder))).expect("chunk");

    assert_eq!(chunks.len(), 2);
    assert!(!chunks[0].has_flag(ChunkFlag::ForcedSplit));
}

#[test]
fn long_sentence_is_kept_whole_and_flagged() {
    let text = [sentence("cat", 30), sentence("cat", 150), sentence("cat", 30)].concat();
    let chunks = chunk(&Document::new("o", text), &semantic(10, 100, Arc::new(KeywordEmbedder))).expect("chunk");

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1].char_len(), 150);
    assert!(chunks[1].is_oversized());
    assert!(!chunks[0].is_oversized() && !chunks[2].is_oversized());
    assert!(chunks.iter().filter(|c| !c.is_oversized()).all(|c| c.char_len() <= 100));
}

#[test]
fn single_sentence_never_reaches_the_embedder() {
    let doc = Document::new("one", "Only one sentence here.");
    let chunks = chunk(&doc, &semantic(10, 100, Arc::new(FailingEmbedder))).expect("no embedding needed");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "Only one sentence here.");
}

#[test]
fn embedder_failures_fail_the_whole_call() {
    let doc = Document::new("x", "First sentence. Second sentence.");
    for embedder in [Arc::new(FailingEmbedder) as Arc<dyn Embedder>, Arc::new(ShortEmbedder) as Arc<dyn Embedder>] {
        let err = chunk(&doc, &semantic(10, 100, embedder)).unwrap_err();
        assert!(matches!(err, Error::Collaborator(_)), "got {err:?}");
    }
}

#[test]
fn invalid_semantic_params_are_config_errors() {
    let doc = Document::new("c", "Some text.");
    let bad = [
        SemanticParams { min_size: 200, max_size: 100, similarity_threshold: 0.5 },
        SemanticParams { min_size: 0, max_size: 0, similarity_threshold: 0.5 },
        SemanticParams { min_size: 10, max_size: 100, similarity_threshold: 1.5 },
        SemanticParams { min_size: 10, max_size: 100, similarity_threshold: f32::NAN },
    ];
    for params in bad {
        let config = StrategyConfig::Semantic { params, embedder: Arc::new(KeywordEmbedder) };
        assert!(matches!(chunk(&doc, &config), Err(Error::Config(_))), "{params:?} accepted");
    }
}
