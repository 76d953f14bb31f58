//! Per-corpus vector indexes.
//!
//! `LanceStore` owns one LanceDB database and a tokio runtime; it hands out
//! synchronous `LanceIndex` readers and `LanceIndexWriter` writers, one table
//! per corpus. `MemoryIndex` is the in-process equivalent.

use anyhow::{Context, Result};
use lancedb::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

use helpdesk_core::error::Error;
use helpdesk_core::types::Corpus;

pub mod memory;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use memory::MemoryIndex;
pub use search::LanceIndex;
pub use writer::LanceIndexWriter;

pub struct LanceStore {
	rt: Arc<Runtime>,
	db: Connection,
	uri: PathBuf,
}

impl LanceStore {
	pub fn open(dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
		let rt = Arc::new(Runtime::new()?);
		let db = rt.block_on(table::open_db(&dir.to_string_lossy()))?;
		tracing::debug!("Opened LanceDB at {}", dir.display());
		Ok(Self { rt, db, uri: dir.to_path_buf() })
	}

	pub fn uri(&self) -> &Path { &self.uri }

	pub fn table_names(&self) -> Result<Vec<String>> {
		Ok(self.rt.block_on(self.db.table_names().execute())?)
	}

	pub fn has_table(&self, table: &str) -> Result<bool> {
		self.rt.block_on(table::table_exists(&self.db, table))
	}

	/// Rows in `table`, `None` when it has not been built.
	pub fn row_count(&self, table: &str) -> Result<Option<usize>> {
		self.rt.block_on(table::count_rows(&self.db, table))
	}

	/// Reader for an existing table; `Error::NotFound` if it was never built.
	pub fn index(&self, name: &str, corpus: Corpus, table: &str) -> Result<LanceIndex> {
		if !self.has_table(table)? {
			return Err(Error::NotFound(format!("index '{name}' (table {table} in {})", self.uri.display())).into());
		}
		Ok(LanceIndex { rt: self.rt.clone(), db: self.db.clone(), name: name.to_string(), table_name: table.to_string(), corpus })
	}

	pub fn writer(&self, corpus: Corpus, table: &str, dim: usize) -> LanceIndexWriter {
		LanceIndexWriter { rt: self.rt.clone(), db: self.db.clone(), table_name: table.to_string(), corpus, dim }
	}

	/// Remove every row of `table`; returns rows removed.
	pub fn clear(&self, table: &str) -> Result<usize> {
		let removed = self.rt.block_on(table::clear_table(&self.db, table))?;
		if removed > 0 { tracing::info!("Cleared {} rows from {}", removed, table); }
		Ok(removed)
	}
}
