//! In-memory store for recordings, segments, and chunks.
//!
//! Lock discipline: every method takes a lock only long enough to read or
//! mutate the map it guards. External calls (extraction, transcription,
//! embedding, generation) never run while a store lock is held.

use crate::error::{LecternError, Result};
use crate::store::types::{Chunk, Recording, RecordingId, RecordingState, Segment, StatusSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Shared store for all recording state.
///
/// Segments and chunks are stored behind `Arc` so readers get a cheap
/// snapshot that stays valid even if the index is rebuilt underneath them.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    recordings: RwLock<HashMap<RecordingId, Recording>>,
    segments: RwLock<HashMap<RecordingId, Arc<Vec<Segment>>>>,
    chunks: RwLock<HashMap<RecordingId, Arc<Vec<Chunk>>>>,
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recording in the Uploaded state and returns its id.
    pub fn create_recording(&self, media_ref: &str) -> RecordingId {
        let recording = Recording::new(media_ref);
        let id = recording.id;
        write_lock(&self.recordings).insert(id, recording);
        debug!(%id, media_ref, "recording created");
        id
    }

    /// Returns a copy of the recording, or RecordingNotFound.
    pub fn recording(&self, id: RecordingId) -> Result<Recording> {
        read_lock(&self.recordings)
            .get(&id)
            .cloned()
            .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })
    }

    /// Current client-visible status of a recording.
    pub fn status(&self, id: RecordingId) -> Result<StatusSnapshot> {
        Ok(self.recording(id)?.status())
    }

    /// Current state of a recording.
    pub fn state(&self, id: RecordingId) -> Result<RecordingState> {
        Ok(self.recording(id)?.state)
    }

    /// All recordings, unordered.
    pub fn list(&self) -> Vec<StatusSnapshot> {
        read_lock(&self.recordings)
            .values()
            .map(Recording::status)
            .collect()
    }

    /// Recordings that have reached Ready.
    pub fn list_ready(&self) -> Vec<StatusSnapshot> {
        read_lock(&self.recordings)
            .values()
            .filter(|r| r.state == RecordingState::Ready)
            .map(Recording::status)
            .collect()
    }

    /// Moves a recording into the next pipeline state.
    ///
    /// Only the immediate successor of the current state is accepted, and
    /// terminal states accept nothing. Progress resets to 0 and the fixed
    /// message for the new state is set.
    pub fn begin_state(&self, id: RecordingId, next: RecordingState) -> Result<()> {
        let mut recordings = write_lock(&self.recordings);
        let recording = recordings
            .get_mut(&id)
            .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })?;

        if recording.state.next() != Some(next) {
            return Err(LecternError::Other(format!(
                "invalid state transition for {}: {} -> {}",
                id, recording.state, next
            )));
        }

        debug!(%id, from = %recording.state, to = %next, "state transition");
        recording.state = next;
        recording.progress = 0;
        recording.message = next.message().to_string();
        Ok(())
    }

    /// Marks a recording Failed with a reason.
    ///
    /// Terminal states are immutable; failing an already-terminal recording
    /// is an invariant violation in the caller.
    pub fn fail(&self, id: RecordingId, reason: &str) -> Result<()> {
        let mut recordings = write_lock(&self.recordings);
        let recording = recordings
            .get_mut(&id)
            .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })?;

        if recording.state.is_terminal() {
            return Err(LecternError::Other(format!(
                "cannot fail recording {} in terminal state {}",
                id, recording.state
            )));
        }

        warn!(%id, state = %recording.state, reason, "recording failed");
        recording.state = RecordingState::Failed;
        recording.progress = 0;
        recording.message = RecordingState::Failed.message().to_string();
        recording.failure_reason = Some(reason.to_string());
        Ok(())
    }

    /// Updates step progress, clamped to 0-100 and monotonic within a state.
    ///
    /// A lower value than the current progress is ignored so pollers never
    /// observe progress moving backward.
    pub fn set_progress(&self, id: RecordingId, progress: u8) -> Result<()> {
        let mut recordings = write_lock(&self.recordings);
        let recording = recordings
            .get_mut(&id)
            .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })?;

        let progress = progress.min(100);
        if progress > recording.progress {
            recording.progress = progress;
        }
        Ok(())
    }

    /// Writes the full segment list for a recording, exactly once.
    ///
    /// Segments are sorted by start and clipped to non-overlap (earliest
    /// wins); spans emptied by clipping are dropped. Sets the recording's
    /// duration to the end of the last segment and records the language.
    pub fn write_segments(
        &self,
        id: RecordingId,
        raw: Vec<Segment>,
        language: Option<String>,
    ) -> Result<usize> {
        {
            let segments = read_lock(&self.segments);
            if segments.contains_key(&id) {
                return Err(LecternError::Other(format!(
                    "segments already written for recording {}",
                    id
                )));
            }
        }

        let cleaned = clip_to_non_overlap(raw);
        let duration = cleaned.last().map(|s| s.end);
        let count = cleaned.len();

        {
            let mut recordings = write_lock(&self.recordings);
            let recording = recordings
                .get_mut(&id)
                .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })?;
            recording.duration_seconds = duration;
            recording.language = language;
        }

        write_lock(&self.segments).insert(id, Arc::new(cleaned));
        debug!(%id, count, "segments written");
        Ok(count)
    }

    /// Ordered segment list for a recording.
    pub fn segments(&self, id: RecordingId) -> Result<Arc<Vec<Segment>>> {
        read_lock(&self.segments)
            .get(&id)
            .cloned()
            .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })
    }

    /// Publishes the full chunk set for a recording atomically.
    ///
    /// A rerun of the indexer replaces the whole set; readers holding the
    /// previous `Arc` keep a consistent snapshot.
    pub fn publish_chunks(&self, id: RecordingId, chunks: Vec<Chunk>) -> Result<()> {
        if !read_lock(&self.recordings).contains_key(&id) {
            return Err(LecternError::RecordingNotFound { id: id.to_string() });
        }
        let count = chunks.len();
        write_lock(&self.chunks).insert(id, Arc::new(chunks));
        debug!(%id, count, "chunks published");
        Ok(())
    }

    /// Chunk set for a recording, if published.
    pub fn chunks(&self, id: RecordingId) -> Result<Arc<Vec<Chunk>>> {
        read_lock(&self.chunks)
            .get(&id)
            .cloned()
            .ok_or_else(|| LecternError::RecordingNotFound { id: id.to_string() })
    }
}

/// Sorts segments by start and clips overlaps so earlier segments win.
///
/// The transcriber contract says segments are non-overlapping; when that is
/// violated the later segment's start is pushed to the previous end, and
/// segments left with no span are dropped.
fn clip_to_non_overlap(mut raw: Vec<Segment>) -> Vec<Segment> {
    raw.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut cleaned: Vec<Segment> = Vec::with_capacity(raw.len());
    for mut segment in raw {
        if let Some(prev) = cleaned.last() {
            if segment.start < prev.end {
                segment.start = prev.end;
            }
        }
        if segment.start < segment.end {
            cleaned.push(segment);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> Segment {
        Segment::new(start, end, text)
    }

    #[test]
    fn test_create_and_status() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        let status = store.status(id).unwrap();
        assert_eq!(status.state, RecordingState::Uploaded);
        assert_eq!(status.progress, 0);
        assert!(status.failure_reason.is_none());
    }

    #[test]
    fn test_unknown_recording_is_not_found() {
        let store = TranscriptStore::new();
        let missing = RecordingId::new();

        match store.status(missing) {
            Err(LecternError::RecordingNotFound { .. }) => {}
            other => panic!("expected RecordingNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_linear_transitions_accepted() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        store
            .begin_state(id, RecordingState::ExtractingAudio)
            .unwrap();
        store.begin_state(id, RecordingState::Transcribing).unwrap();
        store.begin_state(id, RecordingState::Indexing).unwrap();
        store.begin_state(id, RecordingState::Ready).unwrap();

        assert_eq!(store.state(id).unwrap(), RecordingState::Ready);
    }

    #[test]
    fn test_skipping_a_state_rejected() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        let result = store.begin_state(id, RecordingState::Transcribing);
        assert!(result.is_err());
        assert_eq!(store.state(id).unwrap(), RecordingState::Uploaded);
    }

    #[test]
    fn test_terminal_state_accepts_no_transition() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");
        store.fail(id, "boom").unwrap();

        assert!(store
            .begin_state(id, RecordingState::ExtractingAudio)
            .is_err());
        assert!(store.fail(id, "again").is_err());
        assert_eq!(store.state(id).unwrap(), RecordingState::Failed);
    }

    #[test]
    fn test_transition_resets_progress_and_message() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        store
            .begin_state(id, RecordingState::ExtractingAudio)
            .unwrap();
        store.set_progress(id, 80).unwrap();
        store.begin_state(id, RecordingState::Transcribing).unwrap();

        let status = store.status(id).unwrap();
        assert_eq!(status.progress, 0);
        assert_eq!(status.message, RecordingState::Transcribing.message());
    }

    #[test]
    fn test_progress_is_monotonic_within_state() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");
        store
            .begin_state(id, RecordingState::ExtractingAudio)
            .unwrap();

        store.set_progress(id, 60).unwrap();
        store.set_progress(id, 30).unwrap();
        assert_eq!(store.status(id).unwrap().progress, 60);

        store.set_progress(id, 90).unwrap();
        assert_eq!(store.status(id).unwrap().progress, 90);
    }

    #[test]
    fn test_progress_clamped_to_100() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");
        store
            .begin_state(id, RecordingState::ExtractingAudio)
            .unwrap();

        store.set_progress(id, 250).unwrap();
        assert_eq!(store.status(id).unwrap().progress, 100);
    }

    #[test]
    fn test_fail_records_reason() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");
        store
            .begin_state(id, RecordingState::ExtractingAudio)
            .unwrap();

        store.fail(id, "ffmpeg exploded").unwrap();

        let status = store.status(id).unwrap();
        assert_eq!(status.state, RecordingState::Failed);
        assert_eq!(status.failure_reason.as_deref(), Some("ffmpeg exploded"));
    }

    #[test]
    fn test_write_segments_sets_duration_and_language() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        let count = store
            .write_segments(
                id,
                vec![seg(0.0, 2.0, "hello"), seg(2.0, 4.5, "world")],
                Some("en".to_string()),
            )
            .unwrap();

        assert_eq!(count, 2);
        let recording = store.recording(id).unwrap();
        assert_eq!(recording.duration_seconds, Some(4.5));
        assert_eq!(recording.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_write_segments_is_write_once() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        store
            .write_segments(id, vec![seg(0.0, 1.0, "a")], None)
            .unwrap();
        let second = store.write_segments(id, vec![seg(0.0, 1.0, "b")], None);
        assert!(second.is_err());
    }

    #[test]
    fn test_overlapping_segments_clipped_earliest_wins() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        store
            .write_segments(
                id,
                vec![
                    seg(0.0, 3.0, "first"),
                    seg(2.0, 5.0, "second"),
                    seg(4.0, 4.5, "third"),
                ],
                None,
            )
            .unwrap();

        let segments = store.segments(id).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].end, 3.0);
        assert_eq!(segments[1].start, 3.0); // clipped forward
        assert_eq!(segments[2].start, 4.0); // untouched, no overlap left

        // No overlaps remain
        for pair in segments.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_segment_swallowed_by_clipping_is_dropped() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        store
            .write_segments(
                id,
                vec![seg(0.0, 5.0, "long"), seg(1.0, 4.0, "contained")],
                None,
            )
            .unwrap();

        let segments = store.segments(id).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "long");
    }

    #[test]
    fn test_unsorted_segments_are_sorted() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        store
            .write_segments(id, vec![seg(5.0, 6.0, "late"), seg(0.0, 1.0, "early")], None)
            .unwrap();

        let segments = store.segments(id).unwrap();
        assert_eq!(segments[0].text, "early");
        assert_eq!(segments[1].text, "late");
    }

    #[test]
    fn test_publish_chunks_replaces_previous_set() {
        let store = TranscriptStore::new();
        let id = store.create_recording("lecture.mp4");

        let chunk = |chunk_id| Chunk {
            chunk_id,
            start: 0.0,
            end: 1.0,
            text: "x".to_string(),
            embedding: vec![1.0],
        };

        store.publish_chunks(id, vec![chunk(0), chunk(1)]).unwrap();
        let first = store.chunks(id).unwrap();
        assert_eq!(first.len(), 2);

        store.publish_chunks(id, vec![chunk(0)]).unwrap();
        assert_eq!(store.chunks(id).unwrap().len(), 1);

        // The old snapshot is still intact for readers that held it
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_list_ready_filters_states() {
        let store = TranscriptStore::new();
        let a = store.create_recording("a.mp4");
        let _b = store.create_recording("b.mp4");

        store.begin_state(a, RecordingState::ExtractingAudio).unwrap();
        store.begin_state(a, RecordingState::Transcribing).unwrap();
        store.begin_state(a, RecordingState::Indexing).unwrap();
        store.begin_state(a, RecordingState::Ready).unwrap();

        let ready = store.list_ready();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, a);
        assert_eq!(store.list().len(), 2);
    }
}
