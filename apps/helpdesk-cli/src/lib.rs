//! Wiring shared by the `helpdesk-ingest` and `helpdesk-ask` binaries.

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

use helpdesk_core::config::Settings;
use helpdesk_core::traits::{Embedder, PairScorer};
use helpdesk_core::types::Corpus;
use helpdesk_embed::{get_default_embedder, get_default_scorer};
use helpdesk_rag::{build_ranker, Assistant, AuditLog, MultiSourceRetriever, OllamaGenerator, RetrievalSource};
use helpdesk_vector::LanceStore;

/// Logs go to stderr so stdout carries only answers. `RUST_LOG` overrides `info`.
pub fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestArgs {
    pub rebuild: bool,
    pub corpora: Vec<Corpus>,
}

pub fn parse_ingest_args(args: &[String]) -> Result<IngestArgs> {
    let mut rebuild = false;
    let mut corpora = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--rebuild" | "-r" => rebuild = true,
            a if a.starts_with('-') => bail!("unknown flag '{a}'"),
            a => {
                let corpus: Corpus = a.parse()?;
                if !corpora.contains(&corpus) {
                    corpora.push(corpus);
                }
            }
        }
    }
    if corpora.is_empty() {
        corpora = Corpus::ALL.to_vec();
    }
    Ok(IngestArgs { rebuild, corpora })
}

/// Exactly one quoted, non-blank argument; flags are not questions.
pub fn parse_question(args: &[String]) -> Result<String> {
    match args {
        [] => bail!("missing question"),
        [q] if q.starts_with('-') => bail!("unknown flag '{q}'"),
        [q] if q.trim().is_empty() => bail!("question is empty"),
        [q] => Ok(q.trim().to_string()),
        _ => bail!("expected one quoted question, got {} arguments", args.len()),
    }
}

pub fn load_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::from(get_default_embedder(&settings.embedding)?))
}

/// Configured indexes whose tables exist; missing ones are logged and skipped.
pub fn open_sources(settings: &Settings, store: &LanceStore) -> Result<Vec<RetrievalSource>> {
    let mut sources = Vec::new();
    for source in &settings.retrieval.sources {
        if !store.has_table(&source.table)? {
            tracing::warn!("Index '{}' has no table {} in {}; skipping it", source.name, source.table, store.uri().display());
            continue;
        }
        let index = store.index(&source.name, source.corpus, &source.table)?;
        sources.push(RetrievalSource::new(Arc::new(index), source.top_k));
    }
    Ok(sources)
}

pub fn build_assistant(settings: &Settings, store: &LanceStore) -> Result<Assistant> {
    let sources = open_sources(settings, store)?;
    if sources.is_empty() {
        bail!(
            "no vector index found in {}; run helpdesk-ingest first",
            Path::new(&settings.data.lancedb_dir).display()
        );
    }
    let embedder = load_embedder(settings)?;
    let ranker = build_ranker(&settings.rerank, || -> Result<Arc<dyn PairScorer>> {
        Ok(Arc::from(get_default_scorer(&settings.rerank)?))
    })?;
    let generator = Arc::new(OllamaGenerator::new(&settings.generator)?);
    let retriever = MultiSourceRetriever::new(sources).with_parallel(settings.retrieval.parallel);
    Ok(Assistant::new(embedder, retriever, ranker, generator)
        .with_project(settings.generator.project_name.clone())
        .with_audit(AuditLog::new(&settings.audit.path)))
}
