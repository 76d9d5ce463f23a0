use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const VECTOR_TABLE: &str = "vectors";

pub fn build_vector_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("position", DataType::Int32, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}
