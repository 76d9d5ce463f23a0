use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::chunker::Chunker;
use crate::error::{Error, Result};
use crate::types::{ChunkRecord, SourceKind};

pub const FAQ_ID: &str = "faqs";
pub const FAQ_TITLE: &str = "FAQs";

/// One row of the product catalogue. Extra CSV columns are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
}

impl ProductRow {
    /// The text that gets chunked for this product.
    pub fn body(&self) -> String {
        format!("{} | {} | {} | {}", self.title, self.categories, self.brand, self.description)
    }
}

/// Read the product catalogue. The catalogue is required: a missing file
/// fails the ingestion run.
pub fn load_products(path: &Path) -> Result<Vec<ProductRow>> {
    if !path.is_file() {
        return Err(Error::NotFound(format!("product catalogue {}", path.display())));
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<ProductRow>, _>>()?;
    info!(rows = rows.len(), path = %path.display(), "loaded product catalogue");
    Ok(rows)
}

/// Read the FAQ document. It is optional: a missing file yields `None`.
pub fn load_faqs(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        warn!(path = %path.display(), "FAQ document not found, skipping");
        return Ok(None);
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => String::from_utf8_lossy(&fs::read(path)?).to_string(),
    };
    Ok(Some(content))
}

/// Chunk every product body, then the FAQ document, in that order.
pub fn collect_chunks(products: &[ProductRow], faqs: Option<&str>, chunker: &Chunker) -> Vec<ChunkRecord> {
    let mut records = Vec::new();
    for row in products {
        for text in chunker.chunks(&row.body()) {
            records.push(ChunkRecord { text, source: SourceKind::Product, id: row.id.clone(), title: row.title.clone() });
        }
    }
    if let Some(faqs) = faqs {
        for text in chunker.chunks(faqs) {
            records.push(ChunkRecord {
                text,
                source: SourceKind::Faqs,
                id: FAQ_ID.to_string(),
                title: FAQ_TITLE.to_string(),
            });
        }
    }
    records
}

#[derive(Default)]
pub struct DataProcessor {
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(chunker: Chunker) -> Self { Self { chunker } }

    pub fn chunker(&self) -> &Chunker { &self.chunker }

    /// Load both sources and return the ordered chunk sequence for one
    /// ingestion run.
    pub fn process_sources(&self, products_csv: &Path, faqs_path: &Path) -> Result<Vec<ChunkRecord>> {
        let products = load_products(products_csv)?;
        let faqs = load_faqs(faqs_path)?;
        let records = collect_chunks(&products, faqs.as_deref(), &self.chunker);
        info!(
            products = products.len(),
            faqs = faqs.is_some(),
            chunks = records.len(),
            "chunked sources"
        );
        Ok(records)
    }
}
