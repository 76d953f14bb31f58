use std::sync::Arc;

use helpdesk_core::traits::IndexClient;
use helpdesk_core::types::Candidate;

/// One named index and its own result cap.
#[derive(Clone)]
pub struct RetrievalSource {
    pub index: Arc<dyn IndexClient>,
    pub top_k: usize,
}

impl RetrievalSource {
    pub fn new(index: Arc<dyn IndexClient>, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

/// Queries every configured index with the same vector and concatenates the
/// per-index lists in configuration order. Duplicates across indexes are kept.
pub struct MultiSourceRetriever {
    sources: Vec<RetrievalSource>,
    parallel: bool,
}

impl MultiSourceRetriever {
    pub fn new(sources: Vec<RetrievalSource>) -> Self {
        Self { sources, parallel: false }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn sources(&self) -> &[RetrievalSource] {
        &self.sources
    }

    pub fn retrieve(&self, vector: &[f32]) -> Vec<Candidate> {
        let per_source: Vec<Vec<Candidate>> = if self.parallel && self.sources.len() > 1 {
            std::thread::scope(|s| {
                let handles: Vec<_> = self.sources.iter().map(|src| s.spawn(move || query_source(src, vector))).collect();
                handles
                    .into_iter()
                    .zip(&self.sources)
                    .map(|(h, src)| {
                        h.join().unwrap_or_else(|_| {
                            tracing::warn!("Query against index '{}' panicked; skipping it", src.index.name());
                            Vec::new()
                        })
                    })
                    .collect()
            })
        } else {
            self.sources.iter().map(|src| query_source(src, vector)).collect()
        };

        let combined: Vec<Candidate> = per_source.into_iter().flatten().collect();
        tracing::info!("Retrieved {} candidates from {} indexes", combined.len(), self.sources.len());
        combined
    }
}

/// An unavailable index contributes nothing.
fn query_source(source: &RetrievalSource, vector: &[f32]) -> Vec<Candidate> {
    let name = source.index.name();
    match source.index.query(vector, source.top_k) {
        Ok(mut hits) => {
            hits.truncate(source.top_k);
            tracing::info!("Retrieved {} documents from {}", hits.len(), name);
            hits
        }
        Err(e) => {
            tracing::warn!("Index '{}' unavailable, contributing no candidates: {:#}", name, e);
            Vec::new()
        }
    }
}
