//! Composition root tying the store, pipeline, and answer engine together.

use crate::answer::composer::{AnswerComposer, GroundedAnswer, LectureSummary};
use crate::answer::generator::AnswerGenerator;
use crate::config::Config;
use crate::defaults;
use crate::error::{LecternError, Result};
use crate::index::embedder::Embedder;
use crate::index::indexer::Indexer;
use crate::index::retriever::{Retriever, SearchHit};
use crate::media::extractor::AudioExtractor;
use crate::pipeline::orchestrator::Orchestrator;
use crate::store::{RecordingId, StatusSnapshot, TranscriptStore};
use crate::stt::transcriber::Transcriber;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The lecture question-answering engine.
///
/// Owns the store and wires one embedder instance into both the indexer
/// and the retriever, so index-time and query-time vectors share one
/// embedding space. External collaborators come in as trait objects.
pub struct LectureEngine {
    store: Arc<TranscriptStore>,
    orchestrator: Arc<Orchestrator>,
    retriever: Arc<Retriever>,
    composer: AnswerComposer,
}

impl LectureEngine {
    pub fn new(
        config: Config,
        extractor: Arc<dyn AudioExtractor>,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(TranscriptStore::new());
        let indexer = Arc::new(Indexer::new(embedder.clone(), config.index.clone()));
        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            extractor,
            transcriber,
            indexer,
            Duration::from_secs(config.pipeline.step_timeout_secs),
        ));
        let retriever = Arc::new(Retriever::new(store.clone(), embedder));
        let composer = AnswerComposer::new(
            retriever.clone(),
            generator,
            config.retrieval.clone(),
            config.answer.clone(),
        );

        Ok(Self {
            store,
            orchestrator,
            retriever,
            composer,
        })
    }

    /// Registers a new recording and returns its id.
    ///
    /// The media reference is validated up front; an unsupported reference
    /// is rejected here and no recording is created.
    pub fn submit(&self, media_ref: &str) -> Result<RecordingId> {
        validate_media_ref(media_ref)?;
        let id = self.store.create_recording(media_ref);
        info!(%id, media_ref, "recording submitted");
        Ok(id)
    }

    /// Current status of a recording, for pollers.
    pub fn get_status(&self, id: RecordingId) -> Result<StatusSnapshot> {
        self.store.status(id)
    }

    /// Performs at most one pipeline step and returns the status.
    pub async fn advance(&self, id: RecordingId) -> Result<StatusSnapshot> {
        self.orchestrator.advance(id).await
    }

    /// Drives a recording until it reaches Ready or Failed.
    pub async fn process(&self, id: RecordingId) -> Result<StatusSnapshot> {
        loop {
            let status = self.advance(id).await?;
            if status.state.is_terminal() {
                return Ok(status);
            }
        }
    }

    /// Answers a question about a Ready recording.
    pub async fn ask(&self, id: RecordingId, question: &str) -> Result<GroundedAnswer> {
        self.composer.answer(id, question).await
    }

    /// Raw top-k retrieval, without answer composition.
    pub async fn search(&self, id: RecordingId, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.retriever.search(id, query, k).await
    }

    /// Summarizes a Ready recording.
    pub async fn summarize(&self, id: RecordingId) -> Result<LectureSummary> {
        self.composer.summarize(id).await
    }

    /// All recordings currently answerable.
    pub fn list_ready(&self) -> Vec<StatusSnapshot> {
        self.store.list_ready()
    }

    /// The underlying store, for status listings.
    pub fn store(&self) -> &Arc<TranscriptStore> {
        &self.store
    }
}

/// Accepts non-empty references to a supported media container.
fn validate_media_ref(media_ref: &str) -> Result<()> {
    if media_ref.trim().is_empty() {
        return Err(LecternError::InvalidMedia {
            media_ref: media_ref.to_string(),
            message: "empty media reference".to_string(),
        });
    }

    let extension = Path::new(media_ref)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension {
        Some(ext) if defaults::SUPPORTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(LecternError::InvalidMedia {
            media_ref: media_ref.to_string(),
            message: format!("unsupported container '.{}'", ext),
        }),
        None => Err(LecternError::InvalidMedia {
            media_ref: media_ref.to_string(),
            message: "missing file extension".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::generator::MockGenerator;
    use crate::index::embedder::HashEmbedder;
    use crate::media::extractor::MockExtractor;
    use crate::stt::transcriber::MockTranscriber;

    fn engine() -> LectureEngine {
        LectureEngine::new(
            Config::default(),
            Arc::new(MockExtractor::new()),
            Arc::new(MockTranscriber::new("mock")),
            Arc::new(HashEmbedder::new(32)),
            Arc::new(MockGenerator::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_submit_accepts_supported_containers() {
        let engine = engine();
        for name in ["a.mp4", "b.MOV", "c.webm", "d.wav"] {
            assert!(engine.submit(name).is_ok(), "rejected {}", name);
        }
    }

    #[test]
    fn test_submit_rejects_unsupported_extension() {
        let engine = engine();
        let result = engine.submit("slides.pdf");

        match result {
            Err(LecternError::InvalidMedia { message, .. }) => {
                assert!(message.contains(".pdf"));
            }
            _ => panic!("Expected InvalidMedia error"),
        }
        // No recording was created
        assert!(engine.store().list().is_empty());
    }

    #[test]
    fn test_submit_rejects_empty_and_extensionless_refs() {
        let engine = engine();
        assert!(engine.submit("").is_err());
        assert!(engine.submit("   ").is_err());
        assert!(engine.submit("noextension").is_err());
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;

        let result = LectureEngine::new(
            config,
            Arc::new(MockExtractor::new()),
            Arc::new(MockTranscriber::new("mock")),
            Arc::new(HashEmbedder::new(32)),
            Arc::new(MockGenerator::new()),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_process_reaches_ready() {
        let engine = engine();
        let id = engine.submit("lecture.mp4").unwrap();

        let status = engine.process(id).await.unwrap();
        assert_eq!(status.state, crate::store::RecordingState::Ready);
        assert_eq!(engine.list_ready().len(), 1);
    }
}
