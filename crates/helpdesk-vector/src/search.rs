use anyhow::{anyhow, Context, Result};
use arrow_array::{Array, Float32Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use std::sync::Arc;
use tokio::runtime::Runtime;

use helpdesk_core::traits::IndexClient;
use helpdesk_core::types::{Candidate, Corpus, DocumentMeta};

/// Read handle on one corpus table. Scores are cosine similarity.
pub struct LanceIndex {
	pub(crate) rt: Arc<Runtime>,
	pub(crate) db: Connection,
	pub(crate) name: String,
	pub(crate) table_name: String,
	pub(crate) corpus: Corpus,
}

impl LanceIndex {
	pub fn table_name(&self) -> &str { &self.table_name }

	pub async fn query_async(&self, vector: &[f32], k: usize) -> Result<Vec<Candidate>> {
		if k == 0 { return Ok(Vec::new()); }
		let table = self.db.open_table(&self.table_name).execute().await
			.with_context(|| format!("index '{}' is unavailable (table {})", self.name, self.table_name))?;
		let mut stream = table.vector_search(vector.to_vec())?.distance_type(DistanceType::Cosine).limit(k).execute().await?;
		let mut hits = Vec::new();
		while let Some(batch) = stream.try_next().await? {
			hits.extend(self.batch_to_candidates(&batch)?);
		}
		hits.truncate(k);
		tracing::debug!("{} returned {} hits", self.name, hits.len());
		Ok(hits)
	}

	fn batch_to_candidates(&self, batch: &RecordBatch) -> Result<Vec<Candidate>> {
		let contents = string_column(batch, "content")?;
		let sources = string_column(batch, "source")?;
		let authors = string_column(batch, "author")?;
		let timestamps = string_column(batch, "timestamp")?;
		let starts = batch.column_by_name("start_index").and_then(|c| c.as_any().downcast_ref::<Int32Array>())
			.ok_or_else(|| anyhow!("column 'start_index' missing from {}", self.table_name))?;
		let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
		let mut out = Vec::with_capacity(batch.num_rows());
		for i in 0..batch.num_rows() {
			let source = sources.value(i).to_string();
			let meta = match self.corpus {
				Corpus::Code => DocumentMeta::CodeDoc { source },
				Corpus::Chat => DocumentMeta::ChatMessage {
					author: optional_value(authors, i).unwrap_or("unknown").to_string(),
					timestamp: optional_value(timestamps, i).unwrap_or("unknown").to_string(),
					source,
				},
			};
			let score = distances.map(|d| 1.0 - d.value(i)).unwrap_or(0.0);
			out.push(Candidate {
				text: contents.value(i).to_string(),
				meta,
				start_index: usize::try_from(starts.value(i)).unwrap_or(0),
				score,
				index: self.name.clone(),
			});
		}
		Ok(out)
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("column '{name}' missing or not utf8"))
}

fn optional_value(col: &StringArray, i: usize) -> Option<&str> {
	if col.is_null(i) { None } else { Some(col.value(i)) }
}

impl IndexClient for LanceIndex {
	fn name(&self) -> &str { &self.name }
	fn corpus(&self) -> Corpus { self.corpus }

	fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Candidate>> {
		self.rt.block_on(self.query_async(vector, k))
	}
}
