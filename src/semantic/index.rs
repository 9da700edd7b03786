//! In-memory similarity index over corpus chunks.
//!
//! Stores (chunk, embedding) pairs in insertion order and answers
//! nearest-neighbor queries by cosine similarity. The index is immutable
//! after build; a rebuild produces a whole new value so readers never
//! observe a partially-built index.

use crate::semantic::{Embedder, EmbeddingError};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot store or search with zero-norm vector")]
    ZeroNormVector,

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

struct IndexEntry {
    chunk: String,
    embedding: Vec<f32>,
}

/// Immutable similarity index built from an ordered sequence of chunks.
pub struct CorpusIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl CorpusIndex {
    /// Embed each chunk and build the index.
    ///
    /// Chunk order is preserved; similarity ties at query time break by
    /// insertion order.
    pub fn build(chunks: Vec<String>, embedder: &dyn Embedder) -> Result<Self, IndexError> {
        let dimensions = embedder.dimensions();
        let embeddings = embedder.embed_batch(&chunks)?;

        let mut entries = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    got: embedding.len(),
                });
            }

            if l2_norm(&embedding) < f32::EPSILON {
                return Err(IndexError::ZeroNormVector);
            }

            entries.push(IndexEntry { chunk, embedding });
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Build directly from precomputed (chunk, embedding) pairs.
    pub fn from_embeddings(
        pairs: Vec<(String, Vec<f32>)>,
        dimensions: usize,
    ) -> Result<Self, IndexError> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (chunk, embedding) in pairs {
            if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    got: embedding.len(),
                });
            }

            if l2_norm(&embedding) < f32::EPSILON {
                return Err(IndexError::ZeroNormVector);
            }

            entries.push(IndexEntry { chunk, embedding });
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return up to `k` chunks ranked by cosine similarity to the query,
    /// highest first. Never returns more chunks than the index holds.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<&str>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: query.len(),
            });
        }

        let query_norm = l2_norm(query);
        if query_norm < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding, query_norm)))
            .collect();

        // Stable sort keeps insertion order on equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, _)| self.entries[i].chunk.as_str())
            .collect())
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Assumes query_norm is precomputed for efficiency.
fn cosine_similarity(query: &[f32], target: &[f32], query_norm: f32) -> f32 {
    let target_norm = l2_norm(target);
    if target_norm < f32::EPSILON {
        return 0.0;
    }

    let dot_product: f32 = query.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    dot_product / (query_norm * target_norm)
}
