#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use helpdesk_core::traits::{Generator, IndexClient, PairScorer};
use helpdesk_core::types::{Candidate, Corpus, DocumentMeta};

pub fn code_hit(text: &str, source: &str, score: f32) -> Candidate {
    Candidate { text: text.into(), meta: DocumentMeta::CodeDoc { source: source.into() }, start_index: 0, score, index: "code".into() }
}

pub fn chat_hit(text: &str, author: &str, score: f32) -> Candidate {
    Candidate {
        text: text.into(),
        meta: DocumentMeta::ChatMessage { author: author.into(), timestamp: "2024-01-01T00:00:00Z".into(), source: "#support".into() },
        start_index: 0,
        score,
        index: "chat".into(),
    }
}

/// Returns its fixed hits (capped at k), or fails when `hits` is `None`.
pub struct StubIndex {
    pub name: String,
    pub corpus: Corpus,
    pub hits: Option<Vec<Candidate>>,
}

impl StubIndex {
    pub fn new(name: &str, corpus: Corpus, hits: Vec<Candidate>) -> Self {
        Self { name: name.into(), corpus, hits: Some(hits) }
    }

    pub fn unavailable(name: &str, corpus: Corpus) -> Self {
        Self { name: name.into(), corpus, hits: None }
    }
}

impl IndexClient for StubIndex {
    fn name(&self) -> &str {
        &self.name
    }
    fn corpus(&self) -> Corpus {
        self.corpus
    }
    fn query(&self, _vector: &[f32], k: usize) -> Result<Vec<Candidate>> {
        match &self.hits {
            Some(h) => Ok(h.iter().take(k).cloned().collect()),
            None => Err(anyhow!("table {} not found", self.name)),
        }
    }
}

/// Scores passages from a lookup table; unknown passages score 0.
#[derive(Default)]
pub struct TableScorer(pub HashMap<String, f32>);

impl TableScorer {
    pub fn with(pairs: &[(&str, f32)]) -> Self {
        Self(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

impl PairScorer for TableScorer {
    fn model_id(&self) -> &str {
        "table"
    }
    fn score_pairs(&self, _q: &str, passages: &[&str]) -> Result<Vec<f32>> {
        Ok(passages.iter().map(|p| self.0.get(*p).copied().unwrap_or(0.0)).collect())
    }
}

pub struct FailingScorer;

impl PairScorer for FailingScorer {
    fn model_id(&self) -> &str {
        "failing"
    }
    fn score_pairs(&self, _q: &str, _p: &[&str]) -> Result<Vec<f32>> {
        Err(anyhow!("scorer offline"))
    }
}

/// Answers with a fixed string, or fails.
pub struct CannedGenerator(pub Option<String>);

impl Generator for CannedGenerator {
    fn model_id(&self) -> &str {
        "canned"
    }
    fn generate(&self, _prompt: &str) -> Result<String> {
        self.0.clone().ok_or_else(|| anyhow!("connection refused"))
    }
}
