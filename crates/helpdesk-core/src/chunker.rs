//! Overlapping fixed-size windows with natural-boundary preference.
//!
//! Offsets and lengths are measured in characters. Every character of the
//! document lands in at least one chunk; chunk ends strictly increase, so
//! dropping each chunk's overlap with its predecessor rebuilds the content.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Break candidates, highest priority first: paragraph, line, sentence, word.
/// Raw character splitting is the final fallback.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

pub struct Chunker {
    config: ChunkingConfig,
    separators: Vec<Vec<char>>,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { config: ChunkingConfig::default(), separators: default_separators() }
    }
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, separators: default_separators() })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents.iter().flat_map(|d| self.split(d)).collect();
        tracing::info!("Split {} documents into {} chunks", documents.len(), chunks.len());
        chunks
    }

    /// Chunks of one document in order; empty content yields none.
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let chars: Vec<char> = document.content.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        if total == 0 {
            return chunks;
        }

        let mut start = 0usize;
        let mut prev_end = 0usize;
        loop {
            let limit = (start + self.config.chunk_size).min(total);
            let end = if limit == total { total } else { self.break_point(&chars, prev_end, limit) };
            let text: String = chars[start..end].iter().collect();
            chunks.push(Chunk::new(text, document.meta.clone(), start));
            if end == total {
                break;
            }
            let next = self.overlap_start(&chars, start, end);
            prev_end = end;
            start = next;
        }
        chunks
    }

    /// End of the current window: the last break of the best available
    /// separator in the upper half of `(prev_end, limit]`, else `limit` itself.
    /// Breaks closer to `prev_end` would leave a sliver of new text.
    fn break_point(&self, chars: &[char], prev_end: usize, limit: usize) -> usize {
        let floor = prev_end + (limit - prev_end) / 2;
        self.separators
            .iter()
            .find_map(|sep| last_break(chars, floor, limit, sep))
            .unwrap_or(limit)
    }

    /// Start of the next window: earliest word start in `[end - overlap, end)`.
    fn overlap_start(&self, chars: &[char], start: usize, end: usize) -> usize {
        if self.config.chunk_overlap == 0 {
            return end;
        }
        let lo = end.saturating_sub(self.config.chunk_overlap).max(start + 1);
        (lo..end)
            .find(|&p| chars[p - 1].is_whitespace() && !chars[p].is_whitespace())
            .unwrap_or(lo)
    }
}

fn default_separators() -> Vec<Vec<char>> {
    SEPARATORS.iter().map(|s| s.chars().collect()).collect()
}

fn last_break(chars: &[char], floor: usize, limit: usize, sep: &[char]) -> Option<usize> {
    (floor + 1..=limit)
        .rev()
        .find(|&p| p >= sep.len() && chars[p - sep.len()..p] == *sep)
}
