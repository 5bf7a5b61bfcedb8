//! Text embedding collaborators.

use crate::defaults;
use crate::error::{LecternError, Result};
use async_trait::async_trait;

/// Trait for turning text into a fixed-dimension vector.
///
/// Implementations must be deterministic for identical input within a
/// recording's lifetime: the retriever embeds queries with the same
/// instance the indexer used, and a drifting embedding space silently
/// breaks ranking.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Dimension of the vectors this embedder produces.
    fn dimension(&self) -> usize;
}

/// Deterministic feature-hashing embedder.
///
/// Lowercased alphanumeric tokens are hashed into a fixed number of
/// buckets and the bucket counts are L2-normalized. No model, no network;
/// good enough for lexical-overlap retrieval in the CLI and in tests.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(defaults::HASH_EMBEDDING_DIM)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let bucket = (seahash::hash(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Lowercase alphanumeric tokens of the input.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Mock embedder for testing
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
    should_fail: bool,
    delay: Option<std::time::Duration>,
}

impl MockEmbedder {
    /// Create a new mock embedder with default settings
    pub fn new() -> Self {
        Self {
            dimension: 4,
            should_fail: false,
            delay: None,
        }
    }

    /// Configure the vector dimension
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Configure the mock to fail on embed
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to sleep before responding (for timeout tests)
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            return Err(LecternError::Embedding {
                message: "mock embedding failure".to_string(),
            });
        }
        // Length-derived vector: deterministic and distinct enough for tests
        let mut vector = vec![0.0f32; self.dimension];
        vector[text.len() % self.dimension] = 1.0;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::similarity::cosine_similarity;

    #[tokio::test]
    async fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("entropy of a closed system").await.unwrap();
        let b = embedder.embed("entropy of a closed system").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedder_output_is_normalized() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("some lecture text here").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
        assert_eq!(v.len(), 16);
    }

    #[tokio::test]
    async fn test_hash_embedder_overlap_scores_higher_than_disjoint() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("what is entropy").await.unwrap();
        let relevant = embedder
            .embed("entropy measures disorder in a system")
            .await
            .unwrap();
        let unrelated = embedder
            .embed("the midterm will be next tuesday")
            .await
            .unwrap();

        let relevant_score = cosine_similarity(&query, &relevant);
        let unrelated_score = cosine_similarity(&query, &unrelated);
        assert!(
            relevant_score > unrelated_score,
            "expected {} > {}",
            relevant_score,
            unrelated_score
        );
    }

    #[tokio::test]
    async fn test_hash_embedder_is_case_insensitive() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("Entropy Measures Disorder").await.unwrap();
        let b = embedder.embed("entropy measures disorder").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embedder_failure() {
        let embedder = MockEmbedder::new().with_failure();
        let result = embedder.embed("anything").await;

        match result {
            Err(LecternError::Embedding { message }) => {
                assert_eq!(message, "mock embedding failure");
            }
            _ => panic!("Expected Embedding error"),
        }
    }

    #[tokio::test]
    async fn test_mock_embedder_dimension() {
        let embedder = MockEmbedder::new().with_dimension(8);
        let v = embedder.embed("hi").await.unwrap();
        assert_eq!(v.len(), 8);
        assert_eq!(embedder.dimension(), 8);
    }
}
