use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use shoprag_core::error::Error;
use shoprag_core::traits::{Embedder, Retrieve};
use shoprag_core::types::{ChunkRecord, SearchHit};
use shoprag_core::vecmath::l2_normalize;

use crate::flat::FlatIpIndex;
use crate::manifest::IndexManifest;
use crate::meta::{digest, parse_meta};
use crate::schema::VECTOR_TABLE;
use crate::table::{count_rows, open_db, read_vectors};

/// Loaded index plus metadata, ready to answer similarity queries.
///
/// Opening checks that the vector table, the manifest, the metadata file
/// and the query embedder all belong together; any disagreement is an
/// `Error::IndexMismatch`.
pub struct Retriever {
    index: FlatIpIndex,
    records: Vec<ChunkRecord>,
    embedder: Box<dyn Embedder>,
    manifest: IndexManifest,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("rows", &self.records.len())
            .field("dim", &self.index.dim())
            .field("embedder", &self.manifest.embedder_id)
            .finish()
    }
}

impl Retriever {
    pub async fn open(index_dir: &Path, meta_path: &Path, embedder: Box<dyn Embedder>) -> Result<Self> {
        let manifest = IndexManifest::read(index_dir)?;
        manifest.verify_embedder(embedder.embedder_id(), embedder.dim())?;

        if !meta_path.is_file() {
            return Err(Error::NotFound(format!("metadata file {}", meta_path.display())).into());
        }
        let meta_bytes = fs::read(meta_path)?;
        let records = parse_meta(&meta_bytes)?;
        manifest.verify_meta(&digest(&meta_bytes), records.len())?;

        let conn = open_db(index_dir).await?;
        let stored = count_rows(&conn, VECTOR_TABLE).await?;
        if stored != manifest.rows {
            return Err(Error::IndexMismatch(format!("vector table has {stored} rows, manifest says {}", manifest.rows)).into());
        }
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; stored];
        for (position, vector) in read_vectors(&conn, VECTOR_TABLE, stored).await? {
            if vector.len() != manifest.dim {
                return Err(Error::IndexMismatch(format!("vector at position {position} has dimension {}", vector.len())).into());
            }
            let slot = slots
                .get_mut(position)
                .ok_or_else(|| Error::IndexMismatch(format!("vector position {position} out of range")))?;
            if slot.is_some() {
                return Err(Error::IndexMismatch(format!("duplicate vector position {position}")).into());
            }
            *slot = Some(vector);
        }
        let mut index = FlatIpIndex::with_capacity(manifest.dim, stored);
        for (position, slot) in slots.into_iter().enumerate() {
            let vector = slot.ok_or_else(|| Error::IndexMismatch(format!("missing vector for position {position}")))?;
            index.add(&vector)?;
        }

        info!(rows = index.len(), dim = index.dim(), embedder = %manifest.embedder_id, built_at = %manifest.built_at, "index loaded");
        Ok(Self { index, records, embedder, manifest })
    }

    /// Top-`top_k` chunks by cosine similarity, best first. Ties keep index
    /// order. A blank query yields no hits.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument("top_k must be at least 1".to_string()).into());
        }
        if query.trim().is_empty() || self.index.is_empty() {
            return Ok(Vec::new());
        }
        let mut q = self.embedder.embed_one(query)?;
        if q.len() != self.index.dim() {
            return Err(Error::IndexMismatch(format!("query embedding has dimension {}, index has {}", q.len(), self.index.dim())).into());
        }
        l2_normalize(&mut q);
        let hits = self
            .index
            .search(&q, top_k)?
            .into_iter()
            .filter_map(|(position, score)| {
                self.records.get(position).map(|record| SearchHit {
                    record: record.clone(),
                    score: score.clamp(-1.0, 1.0),
                    position,
                })
            })
            .collect::<Vec<_>>();
        debug!(query, top_k, hits = hits.len(), "retrieved");
        Ok(hits)
    }

    pub fn len(&self) -> usize { self.index.len() }

    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    pub fn manifest(&self) -> &IndexManifest { &self.manifest }

    pub fn records(&self) -> &[ChunkRecord] { &self.records }
}

impl Retrieve for Retriever {
    fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.search(query, top_k)
    }
}
