use std::fs;
use std::sync::Arc;

use helpdesk_core::chunker::{Chunker, ChunkingConfig};
use helpdesk_core::error::Error;
use helpdesk_core::traits::{Embedder, IndexClient};
use helpdesk_core::types::{Corpus, Document};
use helpdesk_embed::{FakeEmbedder, DEFAULT_DIM};
use helpdesk_rag::Ingestor;
use helpdesk_vector::MemoryIndex;
use tempfile::TempDir;

fn ingestor() -> Ingestor {
    Ingestor::new(Chunker::new(ChunkingConfig::default()).unwrap(), Arc::new(FakeEmbedder::new(DEFAULT_DIM)), 2)
}

fn long_doc() -> Document {
    Document::code("The node syncs blocks quickly. ".repeat(81)[..2500].to_string(), "README.md")
}

#[test]
fn long_document_becomes_three_searchable_chunks() {
    let index = MemoryIndex::new("code", Corpus::Code);
    let report = ingestor().ingest(Corpus::Code, &[long_doc()], &index).unwrap();
    assert_eq!((report.documents, report.chunks, report.records), (1, 3, 3));
    assert_eq!(index.len(), 3);

    let q = FakeEmbedder::new(DEFAULT_DIM).embed("node syncs blocks").unwrap();
    let hits = index.query(&q, 6).unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.source() == "README.md"));
}

#[test]
fn reingesting_the_same_content_upserts_in_place() {
    let index = MemoryIndex::new("code", Corpus::Code);
    let ingestor = ingestor();
    ingestor.ingest(Corpus::Code, &[long_doc()], &index).unwrap();
    ingestor.ingest(Corpus::Code, &[long_doc()], &index).unwrap();
    assert_eq!(index.len(), 3);
}

#[test]
fn identical_messages_from_different_authors_are_both_indexed() {
    let index = MemoryIndex::new("chat", Corpus::Chat);
    let docs = [
        Document::chat("same here", "alice", "2024-05-01T10:00:00Z", "#help"),
        Document::chat("same here", "bob", "2024-05-01T10:02:00Z", "#help"),
        Document::chat("same here", "bob", "2024-05-01T10:02:00Z", "#help"),
    ];
    let report = ingestor().ingest(Corpus::Chat, &docs, &index).unwrap();
    assert_eq!((report.documents, report.chunks, report.records), (3, 3, 2));
    assert_eq!(index.len(), 2);
}

#[test]
fn ingest_file_reads_chat_export_and_skips_missing_files() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("discord_cleaned.json");
    fs::write(
        &path,
        r#"[{"author": "dave", "timestamp": "2024-05-01", "content": "disk full after sync", "source": "#help"}, 7]"#,
    )
    .unwrap();
    let index = MemoryIndex::new("chat", Corpus::Chat);
    let report = ingestor().ingest_file(Corpus::Chat, &path, &index).unwrap();
    assert_eq!((report.documents, report.records), (1, 1));

    let missing = ingestor().ingest_file(Corpus::Chat, &tmp.path().join("nope.json"), &index).unwrap();
    assert_eq!((missing.documents, missing.chunks, missing.records), (0, 0, 0));
    assert_eq!(index.len(), 1);
}

#[test]
fn corpus_mismatch_is_an_ingestion_error() {
    let index = MemoryIndex::new("chat", Corpus::Chat);
    let err = ingestor().ingest(Corpus::Code, &[long_doc()], &index).unwrap_err();
    assert!(matches!(err, Error::Ingestion { .. }));

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("github_cleaned.json");
    fs::write(&path, r#"{"content": "not an array"}"#).unwrap();
    let code = MemoryIndex::new("code", Corpus::Code);
    let err = ingestor().ingest_file(Corpus::Code, &path, &code).unwrap_err();
    assert!(err.to_string().contains("code corpus"));
}
