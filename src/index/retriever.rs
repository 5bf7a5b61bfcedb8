//! Top-k similarity search over a recording's published chunks.

use crate::error::{LecternError, Result};
use crate::index::embedder::Embedder;
use crate::index::similarity::relevance_score;
use crate::store::{Chunk, RecordingId, RecordingState, TranscriptStore};
use std::sync::Arc;
use tracing::debug;

/// One retrieval result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Relevance in [0, 1], higher is better.
    pub score: f32,
}

/// Read-only retrieval over the store.
///
/// Holds the same embedder instance the indexer used — query and chunk
/// vectors must live in one embedding space.
pub struct Retriever {
    store: Arc<TranscriptStore>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(store: Arc<TranscriptStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Returns the top `k` chunks of `id` ranked by similarity to the query.
    ///
    /// Ordering is descending score with ties broken by earlier start time,
    /// so identical inputs always rank identically. `k` larger than the
    /// chunk count returns every chunk. Recordings that are not Ready yield
    /// a NotReady error rather than stale or empty results.
    pub async fn search(
        &self,
        id: RecordingId,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let state = self.store.state(id)?;
        if state != RecordingState::Ready {
            return Err(LecternError::NotReady {
                id: id.to_string(),
                state: state.to_string(),
            });
        }

        let query =
            self.embedder
                .embed(query_text)
                .await
                .map_err(|e| LecternError::ServiceUnavailable {
                    message: format!("query embedding failed: {}", e),
                })?;

        let chunks = self.store.chunks(id)?;
        let mut hits: Vec<SearchHit> = chunks
            .iter()
            .map(|chunk| SearchHit {
                score: relevance_score(&query, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.start.total_cmp(&b.chunk.start))
        });
        hits.truncate(k);

        debug!(%id, k, returned = hits.len(), "search complete");
        Ok(hits)
    }
}
