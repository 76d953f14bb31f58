//! Domain types shared by ingestion and the query pipeline.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type ChunkId = String;

/// One logical source of documents; each corpus owns its own vector index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    Code,
    Chat,
}

impl Corpus {
    pub const ALL: [Corpus; 2] = [Corpus::Code, Corpus::Chat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Corpus::Code => "code",
            Corpus::Chat => "chat",
        }
    }

    /// The `type` tag stored with every record of this corpus.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Corpus::Code => "github_code_doc",
            Corpus::Chat => "discord_message",
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corpus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" | "github" | "github_code_doc" => Ok(Corpus::Code),
            "chat" | "discord" | "discord_message" => Ok(Corpus::Chat),
            other => Err(Error::InvalidConfig(format!("unknown corpus '{other}'"))),
        }
    }
}

/// Closed per-corpus metadata record, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocumentMeta {
    #[serde(rename = "github_code_doc")]
    CodeDoc { source: String },
    #[serde(rename = "discord_message")]
    ChatMessage { author: String, timestamp: String, source: String },
}

impl DocumentMeta {
    pub fn source(&self) -> &str {
        match self {
            DocumentMeta::CodeDoc { source } | DocumentMeta::ChatMessage { source, .. } => source,
        }
    }

    pub fn corpus(&self) -> Corpus {
        match self {
            DocumentMeta::CodeDoc { .. } => Corpus::Code,
            DocumentMeta::ChatMessage { .. } => Corpus::Chat,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        self.corpus().type_tag()
    }

    pub fn author(&self) -> Option<&str> {
        match self {
            DocumentMeta::ChatMessage { author, .. } => Some(author),
            DocumentMeta::CodeDoc { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            DocumentMeta::ChatMessage { timestamp, .. } => Some(timestamp),
            DocumentMeta::CodeDoc { .. } => None,
        }
    }
}

/// A unit of ingested content, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub meta: DocumentMeta,
}

impl Document {
    pub fn new(content: impl Into<String>, meta: DocumentMeta) -> Self {
        Self { content: content.into(), meta }
    }

    pub fn code(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(content, DocumentMeta::CodeDoc { source: source.into() })
    }

    pub fn chat(
        content: impl Into<String>,
        author: impl Into<String>,
        timestamp: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(
            content,
            DocumentMeta::ChatMessage { author: author.into(), timestamp: timestamp.into(), source: source.into() },
        )
    }
}

/// A window of a document's content.
///
/// - `id`: blake3 of every metadata field, the start offset and the text, so
///   re-ingesting identical content upserts the same record while equal text
///   from different authors or times stays distinct
/// - `start_index`: character (not byte) offset inside the parent document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub meta: DocumentMeta,
    pub start_index: usize,
}

impl Chunk {
    pub fn new(text: String, meta: DocumentMeta, start_index: usize) -> Self {
        let id = chunk_id(&meta, start_index, &text);
        Self { id, text, meta, start_index }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Exclusive end offset in the parent's character stream.
    pub fn end_index(&self) -> usize {
        self.start_index + self.char_len()
    }
}

fn chunk_id(meta: &DocumentMeta, start_index: usize, text: &str) -> ChunkId {
    let mut hasher = blake3::Hasher::new();
    let mut field = |bytes: &[u8]| {
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };
    field(meta.type_tag().as_bytes());
    field(meta.source().as_bytes());
    if let DocumentMeta::ChatMessage { author, timestamp, .. } = meta {
        field(author.as_bytes());
        field(timestamp.as_bytes());
    }
    field(&(start_index as u64).to_le_bytes());
    field(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// What a vector index persists for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A retrieval hit. `score` is native to the index that produced it and is
/// not comparable across indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub meta: DocumentMeta,
    pub start_index: usize,
    pub score: f32,
    /// Name of the index that returned this hit.
    pub index: String,
}

impl Candidate {
    pub fn source(&self) -> &str {
        self.meta.source()
    }
}

/// A candidate placed in the cross-source total order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub rank_score: f32,
}

/// One audited question/answer pair.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub timestamp: DateTime<Local>,
    pub question: String,
    pub answer: String,
}

impl QueryRecord {
    pub fn now(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { timestamp: Local::now(), question: question.into(), answer: answer.into() }
    }
}
