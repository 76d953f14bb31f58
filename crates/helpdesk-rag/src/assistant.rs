use std::sync::Arc;
use std::time::Instant;

use helpdesk_core::error::{Error, Result, Stage};
use helpdesk_core::traits::{Embedder, Generator};
use helpdesk_core::types::{QueryRecord, RankedCandidate};

use crate::audit::AuditLog;
use crate::context::{assemble_context, log_context};
use crate::prompt::render_prompt;
use crate::rerank::Ranker;
use crate::retriever::MultiSourceRetriever;

/// Result of one question. `answer` is the generator's text, unmodified.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub context: String,
    pub passages: Vec<RankedCandidate>,
}

/// Query pipeline: embed, retrieve, rank, assemble, generate, audit.
pub struct Assistant {
    embedder: Arc<dyn Embedder>,
    retriever: MultiSourceRetriever,
    ranker: Box<dyn Ranker>,
    generator: Arc<dyn Generator>,
    project: String,
    audit: Option<AuditLog>,
}

impl Assistant {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: MultiSourceRetriever,
        ranker: Box<dyn Ranker>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self { embedder, retriever, ranker, generator, project: "Erigon".to_string(), audit: None }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn ask(&self, question: &str) -> Result<Answer> {
        let started = Instant::now();
        let vector = self.embedder.embed(question).map_err(|e| Error::stage(Stage::Embedding, e))?;

        let candidates = self.retriever.retrieve(&vector);
        let ranked = self
            .ranker
            .rank(question, candidates)
            .map_err(|e| Error::stage(Stage::Reranking, e))?;
        log_context(&ranked);

        let context = assemble_context(&ranked);
        let prompt = render_prompt(&self.project, &context, question);
        tracing::info!("Invoking {} with {} passages", self.generator.model_id(), ranked.len());
        let answer = self.generator.generate(&prompt).map_err(|e| Error::stage(Stage::Generation, e))?;
        tracing::info!("Answered in {:?}", started.elapsed());

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.append(&QueryRecord::now(question, answer.as_str())) {
                tracing::warn!("Audit log write failed: {:#}", e);
            }
        }

        Ok(Answer { question: question.to_string(), answer, context, passages: ranked })
    }
}
