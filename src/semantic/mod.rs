//! Embedding generation and similarity search over corpus chunks.
//!
//! - `embeddings`: wraps fastembed for local embedding generation
//! - `index`: insertion-ordered chunk index with cosine similarity search

pub mod embeddings;
pub mod index;

pub use embeddings::{EmbeddingError, EmbeddingModel};
pub use index::{CorpusIndex, IndexError};

/// The embedding boundary: an ordered sequence of strings in, a parallel
/// sequence of fixed-dimension vectors out.
///
/// Implemented by [`EmbeddingModel`]; tests substitute stubs.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
    fn dimensions(&self) -> usize;
}
