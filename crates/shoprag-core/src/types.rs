//! Domain types shared by the indexer, the retriever and the answer generator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of source document a chunk was cut from.
///
/// Serialized as `"product"` / `"faqs"` in the metadata file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Product,
    Faqs,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Faqs => "faqs",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One indexed chunk of text.
///
/// Records carry no explicit slot number: the n-th record of the metadata
/// sequence belongs to the n-th vector of the index.
///
/// - `text`: the chunk payload that gets embedded and shown as context
/// - `source`: product row or FAQ document
/// - `id`: product id, or `"faqs"` for the FAQ document
/// - `title`: product title, or `"FAQs"`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkRecord {
    pub text: String,
    pub source: SourceKind,
    pub id: String,
    pub title: String,
}

/// A retrieved chunk with its cosine similarity to the query.
///
/// `score` lies in `[-1, 1]`; higher is better. `position` is the slot of
/// the chunk in the index and breaks ties (lower first).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub record: ChunkRecord,
    pub score: f32,
    pub position: usize,
}
