//! LanceDB helpers for the `(position, vector)` table.
use anyhow::{anyhow, Result};
use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::schema::build_vector_schema;

const WRITE_BATCH_ROWS: usize = 1000;

pub async fn open_db(dir: &Path) -> Result<Connection> {
	Ok(connect(dir.to_string_lossy().as_ref()).execute().await?)
}

/// Create `table` holding `vectors`, row `n` tagged with position `n`.
pub async fn write_vectors(conn: &Connection, table: &str, dim: usize, vectors: &[Vec<f32>]) -> Result<()> {
	let dim_i32 = i32::try_from(dim).map_err(|_| anyhow!("vector dimension {dim} is too large"))?;
	let schema = build_vector_schema(dim_i32);
	let mut batches = Vec::with_capacity(vectors.len().div_ceil(WRITE_BATCH_ROWS));
	for (b, rows) in vectors.chunks(WRITE_BATCH_ROWS).enumerate() {
		let start = b * WRITE_BATCH_ROWS;
		let positions = (start..start + rows.len())
			.map(|p| i32::try_from(p).map_err(|_| anyhow!("position {p} does not fit the index")))
			.collect::<Result<Vec<i32>>>()?;
		let list = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
			rows.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>())),
			dim_i32,
		);
		let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(Int32Array::from(positions)), Arc::new(list)])?;
		batches.push(Ok(batch));
	}
	let reader = Box::new(RecordBatchIterator::new(batches.into_iter(), schema));
	conn.create_table(table, reader).execute().await?;
	Ok(())
}

pub async fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
	let t = conn.open_table(table).execute().await?;
	Ok(t.count_rows(None).await?)
}

/// Read every `(position, vector)` row. Row order in the result is storage
/// order; callers place rows by `position`.
pub async fn read_vectors(conn: &Connection, table: &str, rows: usize) -> Result<Vec<(usize, Vec<f32>)>> {
	let t = conn.open_table(table).execute().await?;
	let mut stream = t.query().limit(rows.max(1)).execute().await?;
	let mut out = Vec::with_capacity(rows);
	while let Some(batch) = stream.try_next().await? {
		let positions = batch
			.column_by_name("position")
			.and_then(|c| c.as_any().downcast_ref::<Int32Array>())
			.ok_or_else(|| anyhow!("vectors.position column missing"))?;
		let vectors = batch
			.column_by_name("vector")
			.and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
			.ok_or_else(|| anyhow!("vectors.vector column missing"))?;
		for i in 0..batch.num_rows() {
			if vectors.is_null(i) {
				return Err(anyhow!("vector at row {i} is null"));
			}
			let values = vectors.value(i);
			let values = values
				.as_any()
				.downcast_ref::<Float32Array>()
				.ok_or_else(|| anyhow!("vectors.vector items are not f32"))?;
			let position = usize::try_from(positions.value(i)).map_err(|_| anyhow!("negative position at row {i}"))?;
			out.push((position, values.values().to_vec()));
		}
	}
	Ok(out)
}
