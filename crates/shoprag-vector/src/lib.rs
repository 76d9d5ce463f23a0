//! Vector index and metadata persistence plus exact inner-product retrieval.
//!
//! An index directory holds a LanceDB table of `(position, vector)` rows and
//! a `manifest.json`; the chunk metadata lives in a separate JSONL file whose
//! line `n` belongs to position `n`. The manifest pins the metadata digest so
//! a mismatched pair is refused at load time.

pub mod flat;
pub mod manifest;
pub mod meta;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use flat::FlatIpIndex;
pub use manifest::IndexManifest;
pub use search::Retriever;
pub use writer::{BuildReport, IndexWriter};
