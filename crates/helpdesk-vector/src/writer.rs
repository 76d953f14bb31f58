use anyhow::{ensure, Result};
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

use helpdesk_core::traits::IndexWriter;
use helpdesk_core::types::{Corpus, EmbeddingRecord};

use crate::schema::build_arrow_schema;
use crate::table::table_exists;

const BATCH_SIZE: usize = 1000;

/// Upserts one corpus's records into its own table, keyed by chunk id.
pub struct LanceIndexWriter {
	pub(crate) rt: Arc<Runtime>,
	pub(crate) db: Connection,
	pub(crate) table_name: String,
	pub(crate) corpus: Corpus,
	pub(crate) dim: usize,
}

impl LanceIndexWriter {
	pub async fn upsert_async(&self, records: &[EmbeddingRecord]) -> Result<usize> {
		if records.is_empty() { tracing::info!("No records to index into {}", self.table_name); return Ok(0); }
		for r in records {
			ensure!(r.vector.len() == self.dim, "record {} has {} dims, table {} expects {}", r.chunk.id, r.vector.len(), self.table_name, self.dim);
			ensure!(r.chunk.meta.corpus() == self.corpus, "record {} belongs to the {} corpus, not {}", r.chunk.id, r.chunk.meta.corpus(), self.corpus);
		}
		let records = last_per_id(records);
		tracing::info!("Indexing {} records into LanceDB table: {}", records.len(), self.table_name);
		let pb = ProgressBar::new(records.len() as u64);
		if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}") {
			pb.set_style(style.progress_chars("#>-"));
		}
		let mut processed = 0usize;
		for batch in records.chunks(BATCH_SIZE) {
			self.insert_batch(batch).await?;
			processed += batch.len();
			pb.set_position(processed as u64);
		}
		pb.finish_with_message("done");
		tracing::info!("Indexed {} records into {}", processed, self.table_name);
		Ok(processed)
	}

	async fn insert_batch(&self, records: &[&EmbeddingRecord]) -> Result<()> {
		let record_batch = self.records_to_batch(records)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if table_exists(&self.db, &self.table_name).await? {
			let t = self.db.open_table(&self.table_name).execute().await?;
			let mut mi = t.merge_insert(&["id"]);
			mi.when_matched_update_all(None).when_not_matched_insert_all();
			let _ = mi.execute(reader).await?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await?;
		}
		Ok(())
	}

	fn records_to_batch(&self, records: &[&EmbeddingRecord]) -> Result<RecordBatch> {
		let dim = i32::try_from(self.dim)?;
		let schema = build_arrow_schema(dim);
		let mut ids = Vec::new(); let mut corpora = Vec::new(); let mut sources = Vec::new(); let mut authors = Vec::new(); let mut timestamps = Vec::new(); let mut contents = Vec::new(); let mut starts = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
		for r in records {
			let meta = &r.chunk.meta;
			ids.push(r.chunk.id.clone()); corpora.push(meta.corpus().as_str()); sources.push(meta.source().to_string());
			authors.push(meta.author().map(str::to_string)); timestamps.push(meta.timestamp().map(str::to_string));
			contents.push(r.chunk.text.clone()); starts.push(i32::try_from(r.chunk.start_index)?);
			vectors.push(Some(r.vector.iter().map(|&x| Some(x)).collect()));
		}
		let record_batch = RecordBatch::try_new(schema, vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(corpora)),
			Arc::new(StringArray::from(sources)),
			Arc::new(StringArray::from(authors)),
			Arc::new(StringArray::from(timestamps)),
			Arc::new(StringArray::from(contents)),
			Arc::new(Int32Array::from(starts)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
		])?;
		Ok(record_batch)
	}
}

/// merge_insert rejects a source with repeated keys; the later record wins.
fn last_per_id(records: &[EmbeddingRecord]) -> Vec<&EmbeddingRecord> {
	let last: HashMap<&str, usize> = records.iter().enumerate().map(|(i, r)| (r.chunk.id.as_str(), i)).collect();
	records.iter().enumerate().filter(|(i, r)| last.get(r.chunk.id.as_str()) == Some(i)).map(|(_, r)| r).collect()
}

impl IndexWriter for LanceIndexWriter {
	fn corpus(&self) -> Corpus { self.corpus }

	fn upsert(&self, records: &[EmbeddingRecord]) -> Result<usize> {
		self.rt.block_on(self.upsert_async(records))
	}
}
