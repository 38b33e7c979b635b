mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{reconstruct, sentence, FailingEmbedder, KeywordEmbedder};
use ragchunk_core::traits::Embedder;
use ragchunk_core::{Chunk, Document, Error, SectionLabel, SectionMarker, StrategyKind};
use ragchunk_split::{chunk, chunk_with_fallback, SectionParams, SemanticParams, StrategyConfig};

const PARAMS: SemanticParams = SemanticParams { min_size: 10, max_size: 1000, similarity_threshold: 0.5 };

fn hybrid(embedder: Arc<dyn Embedder>) -> StrategyConfig {
    StrategyConfig::Hybrid { params: PARAMS, section: SectionParams::default(), embedder }
}

/// Abstract ends on a rocket sentence and Methods opens with two more, so
/// similarity alone would merge across the section start.
fn two_sections() -> Document {
    let text = [
        sentence("cat", 30),
        sentence("cat", 30),
        sentence("rocket", 30),
        sentence("rocket", 30),
        sentence("rocket", 30),
        sentence("cat", 30),
    ]
    .concat();
    Document::new("h", text).with_sections(vec![
        SectionMarker::new(SectionLabel::Abstract, 0).with_page(1),
        SectionMarker::new(SectionLabel::Methods, 90).with_page(2),
    ])
}

fn spans(chunks: &[Chunk]) -> Vec<(usize, usize)> { chunks.iter().map(|c| (c.char_start, c.char_end)).collect() }

/// Where each chunk's new text begins, past the overlap it repeats.
fn body_starts(chunks: &[Chunk]) -> Vec<usize> { chunks.iter().map(|c| c.char_start + c.overlap_len).collect() }

/// A 2500-character introduction and a Methods section with two numbered subsections.
fn subsectioned_paper() -> Document {
    let intro = sentence("cat", 50).repeat(50);
    let methods = format!(
        "Methods\n3.1 Data\n{}\n3.2 Model\n{}\n",
        sentence("cat", 40).repeat(2),
        sentence("rocket", 40).repeat(2)
    );
    let methods_at = intro.chars().count();
    Document::new("sub", format!("{intro}{methods}")).with_sections(vec![
        SectionMarker::new(SectionLabel::Introduction, 0),
        SectionMarker::new(SectionLabel::Methods, methods_at),
    ])
}

#[test]
fn semantic_boundaries_inside_each_section() {
    let chunks = chunk(&two_sections(), &hybrid(Arc::new(KeywordEmbedder))).expect("chunk");

    assert_eq!(spans(&chunks), vec![(0, 60), (60, 90), (90, 150), (150, 180)]);
    let sections: Vec<_> = chunks.iter().map(|c| c.section.clone()).collect();
    assert_eq!(
        sections,
        vec![
            Some(SectionLabel::Abstract),
            Some(SectionLabel::Abstract),
            Some(SectionLabel::Methods),
            Some(SectionLabel::Methods)
        ]
    );
    assert_eq!(chunks.iter().map(|c| c.page).collect::<Vec<_>>(), vec![Some(1), Some(1), Some(2), Some(2)]);
    assert!(chunks.iter().all(|c| c.strategy == StrategyKind::Hybrid));
}

#[test]
fn plain_semantic_run_crosses_the_section_start() {
    let doc = two_sections();
    let config = StrategyConfig::Semantic { params: PARAMS, embedder: Arc::new(KeywordEmbedder) };
    let chunks = chunk(&doc, &config).expect("chunk");
    assert_eq!(spans(&chunks), vec![(0, 60), (60, 150), (150, 180)]);
}

#[test]
fn section_boundaries_are_hybrid_boundaries() {
    let doc = two_sections();
    let by_section = chunk(&doc, &StrategyConfig::section()).expect("section");
    let by_hybrid = chunk(&doc, &hybrid(Arc::new(KeywordEmbedder))).expect("hybrid");

    let hybrid_starts: BTreeSet<usize> = body_starts(&by_hybrid).into_iter().collect();
    for start in body_starts(&by_section) {
        assert!(hybrid_starts.contains(&start), "section boundary {start} is not a hybrid boundary");
    }
}

#[test]
fn subsection_and_long_section_cuts_are_hybrid_boundaries() {
    let doc = subsectioned_paper();
    let by_section = chunk(&doc, &StrategyConfig::section()).expect("section");
    let by_hybrid = chunk(&doc, &StrategyConfig::hybrid(Arc::new(KeywordEmbedder))).expect("hybrid");

    let section_starts = body_starts(&by_section);
    assert!(section_starts.iter().filter(|&&s| s < 2500).count() >= 3, "introduction is re-chunked: {section_starts:?}");
    assert!(section_starts.iter().filter(|&&s| s > 2500).count() >= 2, "methods is cut at 3.1 and 3.2: {section_starts:?}");

    let hybrid_starts: BTreeSet<usize> = body_starts(&by_hybrid).into_iter().collect();
    for start in &section_starts {
        assert!(hybrid_starts.contains(start), "section boundary {start} missing from hybrid");
    }

    assert!(by_hybrid.iter().all(|c| c.overlap_len == 0));
    assert_eq!(reconstruct(&by_hybrid), doc.text);
    for h in &by_hybrid {
        let outer = by_section
            .iter()
            .find(|s| s.char_start + s.overlap_len <= h.char_start && h.char_end <= s.char_end)
            .unwrap_or_else(|| panic!("hybrid chunk {}..{} crosses a section chunk", h.char_start, h.char_end));
        assert_eq!(h.section, outer.section);
    }
}

#[test]
fn unstructured_document_falls_back() {
    let doc = Document::new("plain", [sentence("cat", 30), sentence("rocket", 30)].concat());
    let err = chunk(&doc, &hybrid(Arc::new(KeywordEmbedder))).unwrap_err();
    assert!(matches!(err, Error::MissingStructure(_)));

    let semantic = StrategyConfig::Semantic { params: PARAMS, embedder: Arc::new(KeywordEmbedder) };
    let chunks = chunk_with_fallback(&doc, &hybrid(Arc::new(KeywordEmbedder)), &semantic).expect("fallback");
    assert!(chunks.iter().all(|c| c.strategy == StrategyKind::Semantic && c.section.is_none()));
}

#[test]
fn embedder_errors_propagate() {
    let err = chunk(&two_sections(), &hybrid(Arc::new(FailingEmbedder))).unwrap_err();
    assert!(matches!(err, Error::Collaborator(_)), "got {err:?}");
}
