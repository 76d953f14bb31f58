use helpdesk_core::error::Error;
use helpdesk_core::traits::{Embedder, IndexClient, IndexWriter};
use helpdesk_core::types::{Chunk, Corpus, DocumentMeta, EmbeddingRecord};
use helpdesk_embed::{FakeEmbedder, DEFAULT_DIM};
use helpdesk_vector::LanceStore;
use tempfile::TempDir;

fn records(embedder: &FakeEmbedder, chunks: Vec<Chunk>) -> Vec<EmbeddingRecord> {
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).expect("embed");
    chunks.into_iter().zip(vectors).map(|(chunk, vector)| EmbeddingRecord { chunk, vector }).collect()
}

fn code_chunks() -> Vec<Chunk> {
    [
        ("prune.md", "Pruning modes control how much history the node keeps"),
        ("sync.md", "Staged sync downloads headers then bodies then executes blocks"),
        ("rpc.md", "The rpcdaemon serves JSON-RPC from a separate process"),
    ]
    .iter()
    .map(|(src, text)| Chunk::new(text.to_string(), DocumentMeta::CodeDoc { source: src.to_string() }, 0))
    .collect()
}

#[test]
fn lance_round_trip_and_upsert_by_id() {
    let tmp = TempDir::new().expect("tmp");
    let store = LanceStore::open(&tmp.path().join("lancedb")).expect("open");
    let embedder = FakeEmbedder::new(DEFAULT_DIM);
    let recs = records(&embedder, code_chunks());

    let writer = store.writer(Corpus::Code, "code_chunks", embedder.dim());
    assert_eq!(writer.upsert(&recs).expect("upsert"), 3);
    assert_eq!(store.row_count("code_chunks").expect("count"), Some(3));

    // Same ids again: replaced, not duplicated.
    writer.upsert(&recs).expect("re-upsert");
    assert_eq!(store.row_count("code_chunks").expect("count"), Some(3));

    let index = store.index("code", Corpus::Code, "code_chunks").expect("index");
    let q = embedder.embed("The rpcdaemon serves JSON-RPC from a separate process").expect("embed");
    let hits = index.query(&q, 2).expect("query");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].source(), "rpc.md");
    assert_eq!(hits[0].index, "code");
    assert!(hits[0].score > 0.99, "score {}", hits[0].score);
    assert!(hits[0].score >= hits[1].score);
    assert!(hits.iter().all(|h| h.meta.corpus() == Corpus::Code));
}

#[test]
fn chat_metadata_survives_storage() {
    let tmp = TempDir::new().expect("tmp");
    let store = LanceStore::open(tmp.path()).expect("open");
    let embedder = FakeEmbedder::new(DEFAULT_DIM);
    let chunk = Chunk::new(
        "try --prune.mode=minimal".to_string(),
        DocumentMeta::ChatMessage { author: "alice".into(), timestamp: "2024-03-01T10:00:00Z".into(), source: "#support".into() },
        0,
    );
    store.writer(Corpus::Chat, "chat_chunks", DEFAULT_DIM).upsert(&records(&embedder, vec![chunk.clone()])).expect("upsert");

    let index = store.index("chat", Corpus::Chat, "chat_chunks").expect("index");
    let hits = index.query(&embedder.embed("prune mode").expect("embed"), 5).expect("query");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].meta, chunk.meta);
    assert_eq!(hits[0].text, chunk.text);
}

#[test]
fn same_text_from_two_authors_stores_two_rows() {
    let tmp = TempDir::new().expect("tmp");
    let store = LanceStore::open(tmp.path()).expect("open");
    let embedder = FakeEmbedder::new(DEFAULT_DIM);
    let chat = |author: &str, ts: &str| {
        Chunk::new("thanks!".to_string(), DocumentMeta::ChatMessage { author: author.into(), timestamp: ts.into(), source: "#help".into() }, 0)
    };
    let writer = store.writer(Corpus::Chat, "chat_chunks", embedder.dim());

    let recs = records(&embedder, vec![chat("alice", "2024-03-01T10:00:00Z"), chat("bob", "2024-03-01T10:05:00Z")]);
    assert_eq!(writer.upsert(&recs).expect("upsert"), 2);
    assert_eq!(store.row_count("chat_chunks").expect("count"), Some(2));

    // An exact repeat inside one upsert collapses to a single row.
    let repeated = records(&embedder, vec![chat("carol", "2024-03-02T09:00:00Z"), chat("carol", "2024-03-02T09:00:00Z")]);
    assert_eq!(writer.upsert(&repeated).expect("upsert repeat"), 1);
    assert_eq!(store.row_count("chat_chunks").expect("count"), Some(3));
}

#[test]
fn missing_table_is_not_found_and_clear_is_scoped() {
    let tmp = TempDir::new().expect("tmp");
    let store = LanceStore::open(tmp.path()).expect("open");
    let err = store.index("chat", Corpus::Chat, "chat_chunks").err().expect("missing table");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    assert_eq!(store.row_count("chat_chunks").expect("count"), None);

    let embedder = FakeEmbedder::new(DEFAULT_DIM);
    store.writer(Corpus::Code, "code_chunks", DEFAULT_DIM).upsert(&records(&embedder, code_chunks())).expect("upsert");
    assert_eq!(store.clear("code_chunks").expect("clear"), 3);
    assert_eq!(store.row_count("code_chunks").expect("count"), Some(0));
    assert_eq!(store.clear("chat_chunks").expect("clear missing"), 0);
}

#[test]
fn writer_rejects_wrong_dimension_and_corpus() {
    let tmp = TempDir::new().expect("tmp");
    let store = LanceStore::open(tmp.path()).expect("open");
    let recs = records(&FakeEmbedder::new(16), code_chunks());
    assert!(store.writer(Corpus::Code, "code_chunks", DEFAULT_DIM).upsert(&recs).is_err());

    let recs = records(&FakeEmbedder::new(DEFAULT_DIM), code_chunks());
    assert!(store.writer(Corpus::Chat, "chat_chunks", DEFAULT_DIM).upsert(&recs).is_err());
    assert_eq!(store.row_count("chat_chunks").expect("count"), None);
}

#[tokio::test]
async fn table_helpers_on_an_empty_database() {
    let tmp = TempDir::new().expect("tmp");
    let conn = helpdesk_vector::table::open_db(&tmp.path().to_string_lossy()).await.expect("open");
    assert!(!helpdesk_vector::table::table_exists(&conn, "code_chunks").await.expect("exists"));
    assert_eq!(helpdesk_vector::table::count_rows(&conn, "code_chunks").await.expect("count"), None);
    assert_eq!(helpdesk_vector::table::clear_table(&conn, "code_chunks").await.expect("clear"), 0);
}
