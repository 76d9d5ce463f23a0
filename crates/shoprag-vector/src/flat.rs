use shoprag_core::error::{Error, Result};
use shoprag_core::vecmath::dot;

/// Exact inner-product index over a contiguous block of vectors.
///
/// Slot `i` is the `i`-th vector added. Search scores every slot and orders
/// by descending score, then ascending slot, so equal scores come back in
/// insertion order.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    pub fn new(dim: usize) -> Self { Self { dim, data: Vec::new() } }

    pub fn with_capacity(dim: usize, rows: usize) -> Self { Self { dim, data: Vec::with_capacity(dim * rows) } }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { if self.dim == 0 { 0 } else { self.data.len() / self.dim } }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Append a vector and return its slot.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dim {
            return Err(Error::InvalidArgument(format!("vector has {} dims, index has {}", vector.len(), self.dim)));
        }
        let slot = self.len();
        self.data.extend_from_slice(vector);
        Ok(slot)
    }

    /// Up to `k` `(slot, score)` pairs, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(Error::InvalidArgument(format!("query has {} dims, index has {}", query.len(), self.dim)));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, f32)> = self.data.chunks_exact(self.dim).map(|v| dot(query, v)).enumerate().collect();
        let order = |a: &(usize, f32), b: &(usize, f32)| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0));
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(order);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(rows: &[[f32; 2]]) -> FlatIpIndex {
        let mut idx = FlatIpIndex::new(2);
        for r in rows { idx.add(r).expect("add"); }
        idx
    }

    #[test]
    fn orders_by_score_then_slot() {
        let idx = index(&[[0.0, 1.0], [1.0, 0.0], [0.6, 0.8], [1.0, 0.0]]);
        let hits = idx.search(&[1.0, 0.0], 3).expect("search");
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![1, 3, 2]);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
        assert!((hits[2].1 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn returns_everything_when_k_exceeds_len() {
        let idx = index(&[[0.0, 1.0], [1.0, 0.0]]);
        let hits = idx.search(&[0.0, 1.0], 10).expect("search");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 0);
    }

    #[test]
    fn ties_keep_insertion_order_across_the_cut() {
        let idx = index(&[[1.0, 0.0]; 6]);
        let hits = idx.search(&[1.0, 0.0], 4).expect("search");
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut idx = FlatIpIndex::new(3);
        assert!(idx.add(&[1.0, 0.0]).is_err());
        assert!(idx.search(&[1.0], 1).is_err());
        assert!(idx.search(&[1.0, 0.0, 0.0], 1).expect("empty ok").is_empty());
    }
}
