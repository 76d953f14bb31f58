//! Offline ingestion: load, chunk, embed, upsert.
//!
//! Each corpus goes into its own writer. A corpus whose export is missing
//! yields an empty report; any other failure is an `Error::Ingestion` for that
//! corpus only.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use helpdesk_core::chunker::Chunker;
use helpdesk_core::error::{Error, Result};
use helpdesk_core::loaders::load_corpus;
use helpdesk_core::traits::{Embedder, IndexWriter};
use helpdesk_core::types::{Chunk, Corpus, Document, EmbeddingRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub corpus: Corpus,
    pub documents: usize,
    pub chunks: usize,
    pub records: usize,
}

pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self { chunker, embedder, batch_size: batch_size.max(1) }
    }

    pub fn ingest_file(&self, corpus: Corpus, path: &Path, writer: &dyn IndexWriter) -> Result<IngestReport> {
        let documents = load_corpus(corpus, path).map_err(|e| Error::ingestion(corpus, e))?;
        self.ingest(corpus, &documents, writer)
    }

    pub fn ingest(&self, corpus: Corpus, documents: &[Document], writer: &dyn IndexWriter) -> Result<IngestReport> {
        if writer.corpus() != corpus {
            return Err(Error::ingestion(corpus, anyhow::anyhow!("writer targets the {} corpus", writer.corpus())));
        }
        if let Some(stray) = documents.iter().find(|d| d.meta.corpus() != corpus) {
            return Err(Error::ingestion(corpus, anyhow::anyhow!("document from {} is tagged {}", stray.meta.source(), stray.meta.type_tag())));
        }

        let chunks = self.chunker.split_documents(documents);
        let unique = dedup_by_id(&chunks);
        if unique.len() < chunks.len() {
            tracing::info!("Skipping {} duplicate chunks in the {} corpus", chunks.len() - unique.len(), corpus);
        }
        let dim = self.embedder.dim();
        let mut records = Vec::with_capacity(unique.len());
        for batch in unique.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).map_err(|e| Error::ingestion(corpus, e))?;
            if vectors.len() != batch.len() {
                return Err(Error::ingestion(corpus, anyhow::anyhow!("embedder returned {} vectors for {} chunks", vectors.len(), batch.len())));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                if vector.len() != dim {
                    return Err(Error::ingestion(corpus, anyhow::anyhow!("embedding dimension {} != {}", vector.len(), dim)));
                }
                records.push(EmbeddingRecord { chunk: (*chunk).clone(), vector });
            }
        }
        tracing::debug!("Embedded {} chunks with {}", records.len(), self.embedder.model_id());

        let written = writer.upsert(&records).map_err(|e| Error::ingestion(corpus, e))?;
        let report = IngestReport { corpus, documents: documents.len(), chunks: chunks.len(), records: written };
        tracing::info!("Ingested {} corpus: {} documents, {} chunks, {} records", corpus, report.documents, report.chunks, report.records);
        Ok(report)
    }
}

/// Exact repeats (same metadata, offset and text) share an id; keep the first.
fn dedup_by_id(chunks: &[Chunk]) -> Vec<&Chunk> {
    let mut seen = HashSet::new();
    chunks.iter().filter(|c| seen.insert(c.id.as_str())).collect()
}
