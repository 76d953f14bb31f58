use helpdesk_core::config::{EmbeddingSettings, RerankSettings};
use helpdesk_core::traits::{Embedder, PairScorer};
use helpdesk_embed::{get_default_embedder, FakeEmbedder, LexicalScorer, DEFAULT_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(DEFAULT_DIM);
    let texts = vec!["hello world".to_string(), "hello world".to_string(), "prune history".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(embs.len(), 3);
    assert_eq!(v1.len(), DEFAULT_DIM, "embedding dim is {DEFAULT_DIM}");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
    assert_ne!(v1, &embs[2]);
}

#[test]
fn default_embedder_honours_fake_flag() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = get_default_embedder(&EmbeddingSettings::default()).expect("embedder");
    assert_eq!(embedder.dim(), DEFAULT_DIM);
    assert!(embedder.model_id().starts_with("fake:"));
    assert_eq!(embedder.embed("erigon").expect("embed").len(), DEFAULT_DIM);
}

#[test]
fn lexical_scorer_prefers_overlapping_passages() {
    let scorer = LexicalScorer::new();
    let scores = scorer
        .score_pairs(
            "How do I configure pruning?",
            &["Pruning is configured with --prune.mode", "The RPC daemon listens on 8545", ""],
        )
        .expect("score");
    assert_eq!(scores.len(), 3);
    assert!(scores[0] > scores[1]);
    assert_eq!(scores[2], 0.0);
    assert_eq!(scorer.score("", "anything").expect("score"), 0.0);
}

/// Requires the MiniLM checkpoints under `models/`; run with `--ignored`.
#[test]
#[ignore]
fn real_models_load_and_score() {
    let embedder = helpdesk_embed::BertEmbedder::load(&EmbeddingSettings::default()).expect("embedder");
    let v = embedder.embed("How do I configure pruning?").expect("embed");
    assert_eq!(v.len(), DEFAULT_DIM);

    let scorer = helpdesk_embed::CrossEncoder::load(&RerankSettings::default()).expect("cross-encoder");
    let scores = scorer
        .score_pairs("How do I configure pruning?", &["Use --prune.mode=full to prune history.", "Bananas are yellow."])
        .expect("score");
    assert!(scores[0] > scores[1]);
}
