use crate::types::{Candidate, Corpus, EmbeddingRecord};

pub trait Embedder: Send + Sync {
    /// Stable model identifier; vectors are only comparable within one id.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder {} returned no vector", self.model_id()))
    }
}

/// Read side of one corpus's vector index.
pub trait IndexClient: Send + Sync {
    fn name(&self) -> &str;
    fn corpus(&self) -> Corpus;
    /// Nearest neighbours of `vector`, best first, at most `k`.
    fn query(&self, vector: &[f32], k: usize) -> anyhow::Result<Vec<Candidate>>;
}

/// Write side of one corpus's vector index. Single writer, offline.
pub trait IndexWriter {
    fn corpus(&self) -> Corpus;
    /// Insert or replace records by chunk id; returns the number written.
    fn upsert(&self, records: &[EmbeddingRecord]) -> anyhow::Result<usize>;
}

/// Cross-encoder: scores (question, passage) jointly, higher is more relevant.
pub trait PairScorer: Send + Sync {
    fn model_id(&self) -> &str;
    fn score_pairs(&self, question: &str, passages: &[&str]) -> anyhow::Result<Vec<f32>>;

    fn score(&self, question: &str, passage: &str) -> anyhow::Result<f32> {
        self.score_pairs(question, &[passage])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("scorer {} returned no score", self.model_id()))
    }
}

/// Text-in/text-out language model, no tools, no session memory.
pub trait Generator: Send + Sync {
    fn model_id(&self) -> &str;
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
