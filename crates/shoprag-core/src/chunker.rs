//! Word-window chunking with overlap.
//!
//! Text is split on whitespace. Each chunk holds up to `max_tokens` words
//! joined by single spaces, and the window advances by
//! `max_tokens - overlap` words until a chunk reaches the last word.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_tokens: 50, overlap: 10 }
    }
}

/// A validated chunking configuration. `overlap < max_tokens` always holds,
/// so the window always moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_tokens: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(max_tokens: usize, overlap: usize) -> Result<Self> {
        if max_tokens == 0 {
            return Err(Error::InvalidConfig("chunking.max_tokens must be at least 1".to_string()));
        }
        if overlap >= max_tokens {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({overlap}) must be smaller than chunking.max_tokens ({max_tokens})"
            )));
        }
        Ok(Self { max_tokens, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.max_tokens, config.overlap)
    }

    pub fn max_tokens(&self) -> usize { self.max_tokens }

    pub fn overlap(&self) -> usize { self.overlap }

    /// Words the window advances between consecutive chunks.
    pub fn step(&self) -> usize { self.max_tokens - self.overlap }

    /// Lazily chunk `text`. Calling this again (or cloning the iterator)
    /// restarts from the first chunk.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            words: text.split_whitespace().collect(),
            size: self.max_tokens,
            step: self.step(),
            offset: 0,
            finished: false,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.chunks(text).collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        let ChunkingConfig { max_tokens, overlap } = ChunkingConfig::default();
        Self { max_tokens, overlap }
    }
}

#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    words: Vec<&'a str>,
    size: usize,
    step: usize,
    offset: usize,
    finished: bool,
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished || self.offset >= self.words.len() {
            return None;
        }
        let end = (self.offset + self.size).min(self.words.len());
        let chunk = self.words[self.offset..end].join(" ");
        if end == self.words.len() {
            self.finished = true;
        } else {
            self.offset += self.step;
        }
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.finished || self.offset >= self.words.len() {
            0
        } else {
            let rest = self.words.len() - self.offset;
            if rest <= self.size { 1 } else { 1 + (rest - self.size).div_ceil(self.step) }
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn size_hint_matches_emitted_chunks() {
        let chunker = Chunker::new(5, 2).expect("valid");
        for n in 0..40 {
            let text = words(n);
            let it = chunker.chunks(&text);
            let hinted = it.len();
            assert_eq!(hinted, it.count(), "n={n}");
        }
    }

    #[test]
    fn window_advances_by_step() {
        let chunker = Chunker::new(4, 1).expect("valid");
        let chunks = chunker.split(&words(10));
        assert_eq!(chunks, vec!["w0 w1 w2 w3", "w3 w4 w5 w6", "w6 w7 w8 w9"]);
    }

    #[test]
    fn zero_overlap_partitions_words() {
        let chunker = Chunker::new(3, 0).expect("valid");
        assert_eq!(chunker.split(&words(7)), vec!["w0 w1 w2", "w3 w4 w5", "w6"]);
    }
}
