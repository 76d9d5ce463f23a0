//! Ingestion: embed an ordered chunk sequence and persist the vector index
//! together with its metadata.
//!
//! The new index is staged next to the target directory and swapped in by
//! rename, and the metadata is written to a temp file and persisted after
//! the swap, so a failed run leaves any previous index readable.
use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use shoprag_core::error::Error;
use shoprag_core::traits::Embedder;
use shoprag_core::types::ChunkRecord;
use shoprag_core::vecmath::l2_normalize;

use crate::manifest::IndexManifest;
use crate::meta::{digest, encode_meta};
use crate::schema::VECTOR_TABLE;
use crate::table::{open_db, write_vectors};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub chunks: usize,
    pub dim: usize,
    pub embedder_id: String,
}

pub struct IndexWriter {
    index_dir: PathBuf,
    meta_path: PathBuf,
    batch_size: usize,
}

impl IndexWriter {
    pub fn new(index_dir: &Path, meta_path: &Path) -> Self {
        Self { index_dir: index_dir.to_path_buf(), meta_path: meta_path.to_path_buf(), batch_size: 64 }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed `records` in order; vector `n` belongs to record `n`.
    pub fn embed_records(&self, records: &[ChunkRecord], embedder: &dyn Embedder) -> Result<Vec<Vec<f32>>> {
        let dim = embedder.dim();
        let pb = ProgressBar::new(records.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks {msg}") {
            pb.set_style(style.progress_chars("#>-"));
        }
        let mut vectors = Vec::with_capacity(records.len());
        for batch in records.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|r| r.text.clone()).collect();
            let embedded = embedder.embed_batch(&texts)?;
            if embedded.len() != texts.len() {
                return Err(Error::Embedding(format!("embedder returned {} vectors for {} texts", embedded.len(), texts.len())).into());
            }
            for mut v in embedded {
                if v.len() != dim {
                    return Err(Error::Embedding(format!("embedder returned dimension {} (expected {dim})", v.len())).into());
                }
                if v.iter().any(|x| !x.is_finite()) {
                    return Err(Error::Embedding(format!("non-finite embedding for chunk {}", vectors.len())).into());
                }
                l2_normalize(&mut v);
                vectors.push(v);
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_with_message("embedded");
        Ok(vectors)
    }

    /// Run one ingestion: the index and metadata produced here replace any
    /// previous pair as a unit.
    pub async fn build(&self, records: &[ChunkRecord], embedder: &dyn Embedder) -> Result<BuildReport> {
        if records.is_empty() {
            return Err(Error::InvalidConfig("ingestion produced no chunks; refusing to write an empty index".to_string()).into());
        }
        let vectors = self.embed_records(records, embedder)?;
        let dim = embedder.dim();
        let meta_bytes = encode_meta(records)?;
        let manifest = IndexManifest::new(records.len(), dim, embedder.embedder_id(), digest(&meta_bytes));

        let index_parent = parent_dir(&self.index_dir);
        fs::create_dir_all(&index_parent)?;
        let staging = tempfile::Builder::new().prefix(".index-staging-").tempdir_in(&index_parent)?;
        {
            let conn = open_db(staging.path()).await?;
            write_vectors(&conn, VECTOR_TABLE, dim, &vectors).await?;
        }
        manifest.write(staging.path())?;
        debug!(staging = %staging.path().display(), rows = records.len(), "staged vector index");

        let meta_parent = parent_dir(&self.meta_path);
        fs::create_dir_all(&meta_parent)?;
        let mut meta_tmp = tempfile::NamedTempFile::new_in(&meta_parent)?;
        meta_tmp.write_all(&meta_bytes)?;
        meta_tmp.as_file().sync_all()?;

        swap_in(staging.path(), &self.index_dir, &index_parent)?;
        meta_tmp.persist(&self.meta_path).map_err(|e| anyhow!("failed to persist {}: {}", self.meta_path.display(), e.error))?;

        info!(
            chunks = records.len(),
            dim,
            embedder = embedder.embedder_id(),
            index = %self.index_dir.display(),
            meta = %self.meta_path.display(),
            "index built"
        );
        Ok(BuildReport { chunks: records.len(), dim, embedder_id: embedder.embedder_id().to_string() })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replace `target` with `staged`. The previous directory is moved aside
/// first and restored if the final rename fails.
fn swap_in(staged: &Path, target: &Path, parent: &Path) -> Result<()> {
    let backup = tempfile::Builder::new().prefix(".index-previous-").tempdir_in(parent)?;
    let previous = backup.path().join("index");
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, &previous)?;
    }
    if let Err(e) = fs::rename(staged, target) {
        if had_previous {
            fs::rename(&previous, target)?;
        }
        return Err(e.into());
    }
    Ok(())
}
