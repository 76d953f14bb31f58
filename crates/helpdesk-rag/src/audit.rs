use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use helpdesk_core::types::QueryRecord;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Append-only plain-text log of answered questions.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &QueryRecord) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open audit log {}", self.path.display()))?;
        let block = format!(
            "Timestamp: {}\nQuestion: {}\nAnswer: {}\n{}\n",
            record.timestamp.format(TIMESTAMP_FORMAT),
            record.question,
            record.answer,
            "=".repeat(50)
        );
        f.write_all(block.as_bytes())
            .with_context(|| format!("Failed to write audit log {}", self.path.display()))?;
        Ok(())
    }
}
