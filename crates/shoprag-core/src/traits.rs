use crate::error::Error;
use crate::types::SearchHit;

/// Text to fixed-length vector capability.
///
/// The same embedder must be used to build an index and to query it;
/// `embedder_id` is recorded at build time and checked at load time.
pub trait Embedder: Send + Sync {
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Embedding("embedder returned no vector".to_string()).into())
    }
}

/// Anything that can turn a query into ranked hits.
pub trait Retrieve: Send + Sync {
    fn retrieve(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SearchHit>>;
}
