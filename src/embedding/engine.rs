use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::Embedder;
use crate::{Error, Result};

/// Output size of all-MiniLM-L6-v2
pub const MINILM_DIMENSIONS: usize = 384;

/// Engine for generating text embeddings using local transformer models
pub struct EmbeddingEngine {
    model: TextEmbedding,
}

impl EmbeddingEngine {
    /// Create the engine, caching downloaded model files under `cache_dir`
    pub fn with_cache_dir(cache_dir: Option<PathBuf>) -> Result<Self> {
        let mut options = InitOptions::default();
        options.model_name = EmbeddingModel::AllMiniLML6V2;
        options.show_download_progress = console::Term::stderr().is_term();
        if let Some(dir) = cache_dir {
            options.cache_dir = dir;
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Embedding(format!("Failed to load embedding model: {}", e)))?;

        Ok(Self { model })
    }
}

impl Embedder for EmbeddingEngine {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| Error::Embedding(format!("Query embedding failed: {}", e)))?;

        if embeddings.is_empty() {
            return Err(Error::Embedding("model returned no embedding".to_string()));
        }
        Ok(embeddings.remove(0))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::Embedding(format!("Embedding generation failed: {}", e)))
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }
}
