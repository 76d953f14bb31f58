//! In-process index with exact cosine search.
//!
//! Used in tests and for small corpora that do not warrant a LanceDB table.
//! Implements both sides of the index so ingestion and querying can share
//! one instance.

use anyhow::{ensure, Result};
use std::sync::RwLock;

use helpdesk_core::traits::{IndexClient, IndexWriter};
use helpdesk_core::types::{Candidate, Corpus, EmbeddingRecord};

pub struct MemoryIndex {
    name: String,
    corpus: Corpus,
    records: RwLock<Vec<EmbeddingRecord>>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>, corpus: Corpus) -> Self {
        Self { name: name.into(), corpus, records: RwLock::new(Vec::new()) }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

impl IndexClient for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn corpus(&self) -> Corpus {
        self.corpus
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Candidate>> {
        let records = self.records.read().map_err(|_| anyhow::anyhow!("index '{}' lock poisoned", self.name))?;
        let mut scored: Vec<(f32, &EmbeddingRecord)> = records
            .iter()
            .filter(|r| r.vector.len() == vector.len())
            .map(|r| (cosine(vector, &r.vector), r))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, r)| Candidate {
                text: r.chunk.text.clone(),
                meta: r.chunk.meta.clone(),
                start_index: r.chunk.start_index,
                score,
                index: self.name.clone(),
            })
            .collect())
    }
}

impl IndexWriter for MemoryIndex {
    fn corpus(&self) -> Corpus {
        self.corpus
    }

    fn upsert(&self, batch: &[EmbeddingRecord]) -> Result<usize> {
        let mut records = self.records.write().map_err(|_| anyhow::anyhow!("index '{}' lock poisoned", self.name))?;
        for r in batch {
            ensure!(r.chunk.meta.corpus() == self.corpus, "record {} belongs to the {} corpus", r.chunk.id, r.chunk.meta.corpus());
            match records.iter_mut().find(|e| e.chunk.id == r.chunk.id) {
                Some(existing) => *existing = r.clone(),
                None => records.push(r.clone()),
            }
        }
        Ok(batch.len())
    }
}
