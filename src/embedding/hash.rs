use super::Embedder;
use crate::Result;

/// Bag-of-words embedder hashing lowercase tokens into buckets (FNV-1a).
///
/// No model download, fully deterministic. Useful offline and in tests.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub const MIN_DIMENSIONS: usize = 8;

    pub fn new(dim: usize) -> Self {
        Self {
            dim: dim.max(Self::MIN_DIMENSIONS),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dim: 384 }
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut h: u64 = 0xcbf29ce484222325;
            for b in token.as_bytes() {
                h ^= *b as u64;
                h = h.wrapping_mul(0x100000001b3);
            }
            v[(h % self.dim as u64) as usize] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }

        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("What is the currency in Dubai?").unwrap();
        let b = embedder.embed("What is the currency in Dubai?").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Dubai Metro!").unwrap();
        let b = embedder.embed("dubai metro").unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_minimum_dimensions() {
        let embedder = HashEmbedder::new(2);
        assert_eq!(embedder.dimensions(), HashEmbedder::MIN_DIMENSIONS);
        assert_eq!(embedder.embed("").unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = HashEmbedder::new(32);
        let texts = vec!["Is Uber available?".to_string(), "Dubai Frame".to_string()];
        let batch = embedder.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], embedder.embed("Dubai Frame").unwrap());
    }
}
