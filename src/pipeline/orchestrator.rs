//! State machine driving recordings from Uploaded to Ready or Failed.

use crate::error::{LecternError, Result};
use crate::index::indexer::Indexer;
use crate::media::extractor::{AudioExtractor, AudioTrack};
use crate::store::{RecordingId, RecordingState, StatusSnapshot, TranscriptStore};
use crate::stt::transcriber::Transcriber;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as StepMutex;
use tracing::{info, warn};

/// Single owner of recording state transitions.
///
/// `advance` serializes per recording: at most one step runs at a time for
/// a given id, while different recordings proceed independently. Store
/// locks are never held across the external calls; only the per-recording
/// step mutex spans a step, which is exactly the "one step in flight"
/// guarantee.
pub struct Orchestrator {
    store: Arc<TranscriptStore>,
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
    indexer: Arc<Indexer>,
    step_timeout: Duration,
    step_locks: Mutex<HashMap<RecordingId, Arc<StepMutex<()>>>>,
    audio_tracks: Mutex<HashMap<RecordingId, AudioTrack>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<TranscriptStore>,
        extractor: Arc<dyn AudioExtractor>,
        transcriber: Arc<dyn Transcriber>,
        indexer: Arc<Indexer>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            store,
            extractor,
            transcriber,
            indexer,
            step_timeout,
            step_locks: Mutex::new(HashMap::new()),
            audio_tracks: Mutex::new(HashMap::new()),
        }
    }

    /// Performs at most one step of work for a recording and returns its
    /// current status.
    ///
    /// Safe to call repeatedly from pollers: terminal states do no work,
    /// and a call racing an in-flight step returns the live snapshot
    /// without starting a second step. A step failure or timeout moves the
    /// recording to Failed with a reason; nothing is retried or rolled
    /// back.
    pub async fn advance(&self, id: RecordingId) -> Result<StatusSnapshot> {
        // Existence check before anything else
        let state = self.store.state(id)?;
        if state.is_terminal() {
            return self.store.status(id);
        }

        let lock = self.step_lock(id);
        let Ok(_guard) = lock.try_lock() else {
            // A step is already in flight for this recording
            return self.store.status(id);
        };

        // Re-read under the lock; the state may have moved
        let state = self.store.state(id)?;
        let step = match state {
            RecordingState::Uploaded => {
                self.store
                    .begin_state(id, RecordingState::ExtractingAudio)?;
                self.run_extraction(id).await
            }
            // Resumed after a dropped advance call: the state's work never
            // completed, so run it now.
            RecordingState::ExtractingAudio => self.run_extraction(id).await,
            RecordingState::Transcribing => self.run_transcription(id).await,
            RecordingState::Indexing => self.run_indexing(id).await,
            RecordingState::Ready | RecordingState::Failed => Ok(()),
        };

        if let Err(e) = step {
            warn!(%id, state = %state, error = %e, "pipeline step failed");
            self.store.fail(id, &e.to_string())?;
        }

        self.store.status(id)
    }

    async fn run_extraction(&self, id: RecordingId) -> Result<()> {
        let media_ref = self.store.recording(id)?.media_ref;
        let extractor = self.extractor.clone();

        let track = self
            .with_timeout(RecordingState::ExtractingAudio, async move {
                extractor.extract(&media_ref).await
            })
            .await?;

        self.audio_tracks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, track);
        self.store.set_progress(id, 100)?;
        self.store.begin_state(id, RecordingState::Transcribing)?;
        info!(%id, "audio extracted");
        Ok(())
    }

    async fn run_transcription(&self, id: RecordingId) -> Result<()> {
        let track = self
            .audio_tracks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
            .ok_or_else(|| LecternError::Transcription {
                message: "extracted audio is no longer available".to_string(),
            })?;

        let transcriber = self.transcriber.clone();
        let transcript = self
            .with_timeout(RecordingState::Transcribing, async move {
                transcriber.transcribe(&track).await
            })
            .await?;

        let count = self
            .store
            .write_segments(id, transcript.segments, transcript.language)?;
        self.store.set_progress(id, 100)?;
        self.store.begin_state(id, RecordingState::Indexing)?;

        // The extracted audio has served its purpose
        self.discard_audio(id);
        info!(%id, segments = count, "transcription complete");
        Ok(())
    }

    async fn run_indexing(&self, id: RecordingId) -> Result<()> {
        let segments = self.store.segments(id)?;
        let indexer = self.indexer.clone();

        let store = self.store.clone();
        let chunks = self
            .with_timeout(RecordingState::Indexing, async move {
                indexer
                    .build_index(&segments, |pct| {
                        // Progress write failures only mean the recording
                        // vanished mid-step; the step itself will notice.
                        let _ignored = store.set_progress(id, pct);
                    })
                    .await
            })
            .await?;

        let count = chunks.len();
        self.store.publish_chunks(id, chunks)?;
        self.store.begin_state(id, RecordingState::Ready)?;
        self.store.set_progress(id, 100)?;
        info!(%id, chunks = count, "recording ready");
        Ok(())
    }

    /// Runs an external call under the configured step timeout.
    async fn with_timeout<T, F>(&self, state: RecordingState, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.step_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LecternError::StepTimeout {
                state: state.to_string(),
                seconds: self.step_timeout.as_secs(),
            }),
        }
    }

    fn step_lock(&self, id: RecordingId) -> Arc<StepMutex<()>> {
        self.step_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(id)
            .or_default()
            .clone()
    }

    fn discard_audio(&self, id: RecordingId) {
        let removed = self
            .audio_tracks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        if let Some(track) = removed {
            if let Err(e) = std::fs::remove_file(&track.path) {
                tracing::debug!(%id, path = %track.path.display(), error = %e, "audio cleanup skipped");
            }
        }
    }
}
