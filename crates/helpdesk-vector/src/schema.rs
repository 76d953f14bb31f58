use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// One row per chunk. `author`/`timestamp` are only set for chat records.
pub fn build_arrow_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("corpus", DataType::Utf8, false),
		Field::new("source", DataType::Utf8, false),
		Field::new("author", DataType::Utf8, true),
		Field::new("timestamp", DataType::Utf8, true),
		Field::new("content", DataType::Utf8, false),
		Field::new("start_index", DataType::Int32, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
