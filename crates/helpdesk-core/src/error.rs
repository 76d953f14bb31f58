use std::fmt;

use thiserror::Error;

/// Query-path stage a collaborator failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    /// For index clients that need to fail a whole query. The multi-source
    /// retriever never raises it: a failing index is logged and skipped.
    Retrieval,
    Reranking,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Embedding => "embedding",
            Stage::Retrieval => "retrieval",
            Stage::Reranking => "re-ranking",
            Stage::Generation => "generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ingestion of the {corpus} corpus failed: {source}")]
    Ingestion {
        corpus: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub fn stage(stage: Stage, source: impl Into<anyhow::Error>) -> Self {
        Self::Stage { stage, source: source.into() }
    }

    pub fn ingestion(corpus: impl fmt::Display, source: impl Into<anyhow::Error>) -> Self {
        Self::Ingestion { corpus: corpus.to_string(), source: source.into() }
    }

    /// The failing stage, if this error came from the query path.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
