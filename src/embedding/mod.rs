//! Text embedding backends
//!
//! The semantic tier and the seeding command both go through [`Embedder`], so
//! the vectors written at provisioning time and the query vectors share one
//! model and one dimensionality.

pub mod engine;
pub mod hash;

pub use engine::EmbeddingEngine;
pub use hash::HashEmbedder;

use crate::Result;

/// Deterministic text-to-vector function with a fixed output length
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. Output order follows input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Length of every vector this embedder produces
    fn dimensions(&self) -> usize;
}
