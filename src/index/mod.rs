//! Transcript indexing and retrieval.
//!
//! The indexer partitions segments into chunks, embeds them, and publishes
//! the chunk set atomically; the retriever answers top-k similarity queries
//! against published chunks. Both sides share one embedder instance so the
//! embedding space is identical at index and query time.

pub mod chunker;
pub mod embedder;
pub mod indexer;
pub mod retriever;
pub mod similarity;

pub use chunker::{partition, ChunkDraft};
pub use embedder::{Embedder, HashEmbedder, MockEmbedder};
pub use indexer::Indexer;
pub use retriever::{Retriever, SearchHit};
pub use similarity::{cosine_similarity, relevance_score};
