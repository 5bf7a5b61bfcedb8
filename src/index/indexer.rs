//! Index construction: chunk, embed, publish.

use crate::config::IndexConfig;
use crate::error::{LecternError, Result};
use crate::index::chunker::partition;
use crate::index::embedder::Embedder;
use crate::store::{Chunk, Segment};
use std::sync::Arc;
use tracing::debug;

/// Builds the full chunk set for a recording.
///
/// The indexer never writes a partial result: it returns the complete
/// embedded chunk list, and the caller publishes it to the store in one
/// atomic operation. Any embedding failure fails the whole build.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    config: IndexConfig,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>, config: IndexConfig) -> Self {
        Self { embedder, config }
    }

    /// Partition `segments` into chunks and embed each chunk's text.
    ///
    /// `progress` is called with 0-100 as chunks finish embedding.
    pub async fn build_index(
        &self,
        segments: &[Segment],
        mut progress: impl FnMut(u8) + Send,
    ) -> Result<Vec<Chunk>> {
        let drafts = partition(
            segments,
            self.config.max_chunk_seconds,
            self.config.max_chunk_chars,
        );
        debug!(
            segments = segments.len(),
            chunks = drafts.len(),
            "partitioned transcript"
        );

        let total = drafts.len();
        let mut chunks = Vec::with_capacity(total);

        for (chunk_id, draft) in drafts.into_iter().enumerate() {
            let embedding =
                self.embedder
                    .embed(&draft.text)
                    .await
                    .map_err(|e| LecternError::Embedding {
                        message: format!("chunk {}: {}", chunk_id, e),
                    })?;

            chunks.push(Chunk {
                chunk_id,
                start: draft.start,
                end: draft.end,
                text: draft.text,
                embedding,
            });

            progress((((chunk_id + 1) * 100) / total) as u8);
        }

        Ok(chunks)
    }
}
