//! Retrieval-augmented answering over the code and chat corpora.

pub mod assistant;
pub mod audit;
pub mod context;
pub mod generator;
pub mod ingest;
pub mod prompt;
pub mod rerank;
pub mod retriever;

pub use assistant::{Answer, Assistant};
pub use audit::AuditLog;
pub use context::assemble_context;
pub use generator::OllamaGenerator;
pub use ingest::{IngestReport, Ingestor};
pub use rerank::{build_ranker, CrossEncoderRanker, PassthroughRanker, Ranker};
pub use retriever::{MultiSourceRetriever, RetrievalSource};
