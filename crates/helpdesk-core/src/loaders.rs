//! Loaders for the cleaned JSON exports.
//!
//! A missing export is not an error: the corpus is skipped with a warning.
//! Individual records that cannot be read are dropped; only a file that is
//! not a JSON array fails the corpus.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::types::{Corpus, Document};

const UNKNOWN: &str = "unknown";

pub fn load_corpus(corpus: Corpus, path: &Path) -> Result<Vec<Document>> {
    match corpus {
        Corpus::Code => load_code_docs(path),
        Corpus::Chat => load_chat_messages(path),
    }
}

/// `[{ "content": ..., "source": ... }]`
pub fn load_code_docs(path: &Path) -> Result<Vec<Document>> {
    load_records(Corpus::Code, path, |record, default_source| {
        let content = content_of(record)?;
        let source = string_or(record, "source", default_source);
        Some(Document::code(content, source))
    })
}

/// `[{ "author": ..., "timestamp": ..., "content": ..., "source": ... }]`
pub fn load_chat_messages(path: &Path) -> Result<Vec<Document>> {
    load_records(Corpus::Chat, path, |record, default_source| {
        let content = content_of(record)?;
        Some(Document::chat(
            content,
            string_or(record, "author", UNKNOWN),
            string_or(record, "timestamp", UNKNOWN),
            string_or(record, "source", default_source),
        ))
    })
}

fn load_records<F>(corpus: Corpus, path: &Path, parse: F) -> Result<Vec<Document>>
where
    F: Fn(&Map<String, Value>, &str) -> Option<Document>,
{
    if !path.exists() {
        tracing::warn!("{} export not found: {}. Skipping {} ingestion.", corpus, path.display(), corpus);
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let Value::Array(records) = value else {
        anyhow::bail!("{} must contain a JSON array of records", path.display());
    };

    let default_source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut documents = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for (position, record) in records.iter().enumerate() {
        let parsed = record.as_object().and_then(|obj| parse(obj, &default_source));
        match parsed {
            Some(doc) => documents.push(doc),
            None => {
                dropped += 1;
                tracing::warn!("Dropping malformed {} record #{} in {}", corpus, position, path.display());
            }
        }
    }
    tracing::info!("Loaded {} documents from {} ({} dropped)", documents.len(), path.display(), dropped);
    Ok(documents)
}

fn content_of(record: &Map<String, Value>) -> Option<String> {
    record.get("content").and_then(Value::as_str).map(str::to_string)
}

fn string_or(record: &Map<String, Value>, key: &str, default: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}
