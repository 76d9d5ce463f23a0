use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use shoprag_core::error::{Error, Result};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const FORMAT_VERSION: u32 = 1;

/// Facts about one ingestion run, stored next to the vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub rows: usize,
    pub dim: usize,
    pub embedder_id: String,
    pub meta_digest: String,
    pub built_at: String,
}

impl IndexManifest {
    pub fn new(rows: usize, dim: usize, embedder_id: &str, meta_digest: String) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            rows,
            dim,
            embedder_id: embedder_id.to_string(),
            meta_digest,
            built_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn read(index_dir: &Path) -> Result<Self> {
        let path = index_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(Error::NotFound(format!("index manifest {}", path.display())));
        }
        let manifest: Self = serde_json::from_slice(&fs::read(&path)?)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::IndexMismatch(format!("unsupported index format version {}", manifest.format_version)));
        }
        Ok(manifest)
    }

    pub fn write(&self, index_dir: &Path) -> Result<()> {
        fs::write(index_dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Check that metadata with `meta_digest` and `meta_rows` lines belongs to this index.
    pub fn verify_meta(&self, meta_digest: &str, meta_rows: usize) -> Result<()> {
        if self.meta_digest != meta_digest {
            return Err(Error::IndexMismatch("metadata file was not produced by the same ingestion run as the index".to_string()));
        }
        if self.rows != meta_rows {
            return Err(Error::IndexMismatch(format!("index has {} vectors but metadata has {} records", self.rows, meta_rows)));
        }
        Ok(())
    }

    pub fn verify_embedder(&self, embedder_id: &str, dim: usize) -> Result<()> {
        if self.embedder_id != embedder_id || self.dim != dim {
            return Err(Error::IndexMismatch(format!(
                "index was built with {} (d{}), query embedder is {} (d{})",
                self.embedder_id, self.dim, embedder_id, dim
            )));
        }
        Ok(())
    }
}
