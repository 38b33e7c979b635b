mod common;

use std::sync::Arc;

use common::{char_slice, prose, reconstruct};
use ragchunk_core::config::ChunkingSettings;
use ragchunk_core::traits::TokenCounter;
use ragchunk_core::{Document, Error, Separator, StrategyKind};
use ragchunk_split::{chunk, Collaborators, StrategyConfig, TokenParams};

fn word_counter() -> Arc<dyn TokenCounter> { Arc::new(|t: &str| t.split_whitespace().count()) }

fn token(max_tokens: usize, overlap: usize, tokenizer: Arc<dyn TokenCounter>) -> StrategyConfig {
    StrategyConfig::Token { params: TokenParams { max_tokens, overlap, separators: Separator::DEFAULT.to_vec() }, tokenizer }
}

#[test]
fn budgets_are_measured_in_tokens() {
    let text = (0..30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let doc = Document::new("t", text.clone());
    let counter = word_counter();
    let chunks = chunk(&doc, &token(10, 3, counter.clone())).expect("chunk");

    assert_eq!(chunks[0].text, "w0 w1 w2 w3 w4 w5 w6 w7 w8 w9 ");
    assert_eq!(&chunks[1].text[..chunks[1].overlap_len], " w7 w8 w9 ");
    assert!(chunks[1].body().starts_with("w10 "));
    for c in &chunks {
        assert!(counter.count_tokens(&c.text) <= 10, "{:?} is over budget", c.text);
        assert_eq!(c.strategy, StrategyKind::Token);
    }
    assert_eq!(reconstruct(&chunks), text);
}

#[test]
fn generated_documents_stay_within_the_token_budget() {
    let counter = word_counter();
    for seed in 1..=8 {
        let text = prose(seed, 300);
        let doc = Document::new(format!("tok{seed}"), text.clone());
        for (max_tokens, overlap) in [(20, 0), (20, 5), (64, 16), (2, 1)] {
            let chunks = chunk(&doc, &token(max_tokens, overlap, counter.clone())).expect("chunk");
            assert_eq!(reconstruct(&chunks), text, "seed {seed} max {max_tokens} overlap {overlap}");

            for (i, c) in chunks.iter().enumerate() {
                let tokens = counter.count_tokens(&c.text);
                assert!(tokens <= max_tokens, "chunk {i} of seed {seed} has {tokens} tokens");
                assert!(!c.is_oversized());
                assert!(c.overlap_len < c.char_len(), "chunk {i} has no new text");
                assert_eq!(c.text, char_slice(&text, c.char_start, c.char_end));
                if i == 0 {
                    assert_eq!(c.overlap_len, 0);
                    continue;
                }
                let prev = &chunks[i - 1];
                assert_eq!(c.char_start + c.overlap_len, prev.char_end, "bodies are contiguous");
                let head: String = c.text.chars().take(c.overlap_len).collect();
                assert!(counter.count_tokens(&head) <= overlap, "overlap {head:?} is over {overlap} tokens");
                assert_eq!(overlap == 0, c.overlap_len == 0);
            }
        }
    }
}

#[test]
fn unit_heavier_than_the_budget_is_kept_and_flagged() {
    let heavy: Arc<dyn TokenCounter> = Arc::new(|t: &str| t.chars().map(|c| if c == '#' { 5 } else { 1 }).sum());
    let doc = Document::new("h", "ab#cd");
    let chunks = chunk(&doc, &token(3, 0, heavy)).expect("chunk");

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["ab", "#", "cd"]);
    assert!(chunks[1].is_oversized());
    assert!(!chunks[0].is_oversized() && !chunks[2].is_oversized());
}

#[test]
fn token_window_is_validated() {
    let err = chunk(&Document::new("v", "text"), &token(50, 50, word_counter())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn settings_without_tokenizer_are_a_config_error() {
    let settings = ChunkingSettings::default();
    let err = StrategyConfig::from_settings(StrategyKind::Token, &settings, &Collaborators::default()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let with = Collaborators { tokenizer: Some(word_counter()), ..Collaborators::default() };
    let config = StrategyConfig::from_settings(StrategyKind::Token, &settings, &with).expect("token config");
    match config {
        StrategyConfig::Token { params, .. } => assert_eq!((params.max_tokens, params.overlap), (512, 50)),
        other => panic!("unexpected {other:?}"),
    }
}
