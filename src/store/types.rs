//! Data types for recordings, transcript segments, and retrieval chunks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use uuid::Uuid;

/// Opaque identifier for one uploaded recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(Uuid);

impl RecordingId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Processing state of a recording.
///
/// The order of variants is the pipeline order; `Ord` gives a total order
/// so callers can compare progress without string matching. `Failed` sorts
/// last but is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    Uploaded,
    ExtractingAudio,
    Transcribing,
    Indexing,
    Ready,
    Failed,
}

impl RecordingState {
    /// The state that follows this one in the linear pipeline.
    ///
    /// Terminal states have no successor.
    pub fn next(&self) -> Option<RecordingState> {
        match self {
            RecordingState::Uploaded => Some(RecordingState::ExtractingAudio),
            RecordingState::ExtractingAudio => Some(RecordingState::Transcribing),
            RecordingState::Transcribing => Some(RecordingState::Indexing),
            RecordingState::Indexing => Some(RecordingState::Ready),
            RecordingState::Ready | RecordingState::Failed => None,
        }
    }

    /// True for states that accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordingState::Ready | RecordingState::Failed)
    }

    /// Fixed human-readable description shown while in this state.
    pub fn message(&self) -> &'static str {
        match self {
            RecordingState::Uploaded => "Recording uploaded, waiting for processing",
            RecordingState::ExtractingAudio => "Extracting audio from media...",
            RecordingState::Transcribing => "Generating transcript with timestamps...",
            RecordingState::Indexing => "Building searchable index...",
            RecordingState::Ready => "Processing completed successfully",
            RecordingState::Failed => "Processing failed",
        }
    }

    /// Stable lowercase name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingState::Uploaded => "uploaded",
            RecordingState::ExtractingAudio => "extracting_audio",
            RecordingState::Transcribing => "transcribing",
            RecordingState::Indexing => "indexing",
            RecordingState::Ready => "ready",
            RecordingState::Failed => "failed",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded recording tracked through the pipeline.
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: RecordingId,
    /// Caller-supplied reference to the media (path or URL).
    pub media_ref: String,
    pub state: RecordingState,
    /// Percentage of the current step, 0-100, monotonic within a state.
    pub progress: u8,
    pub message: String,
    /// Present only when state is Failed.
    pub failure_reason: Option<String>,
    /// Known once transcription completes.
    pub duration_seconds: Option<f64>,
    /// Language reported by the transcriber, if any.
    pub language: Option<String>,
    pub created_at: SystemTime,
}

impl Recording {
    pub fn new(media_ref: &str) -> Self {
        Self {
            id: RecordingId::new(),
            media_ref: media_ref.to_string(),
            state: RecordingState::Uploaded,
            progress: 0,
            message: RecordingState::Uploaded.message().to_string(),
            failure_reason: None,
            duration_seconds: None,
            language: None,
            created_at: SystemTime::now(),
        }
    }

    /// Client-visible view of this recording.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            id: self.id,
            state: self.state,
            progress: self.progress,
            message: self.message.clone(),
            failure_reason: self.failure_reason.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}

/// Status payload returned by `get_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub id: RecordingId,
    pub state: RecordingState,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// One transcribed span of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds, always greater than start.
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: &str) -> Self {
        Self {
            start,
            end,
            text: text.to_string(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Retrieval unit derived from one or more contiguous segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub chunk_id: usize,
    /// Start of the earliest source segment.
    pub start: f64,
    /// End of the latest source segment.
    pub end: f64,
    /// Whitespace-normalized concatenation of the source segment texts.
    pub text: String,
    /// Embedding of `text`, fixed dimension per recording.
    pub embedding: Vec<f32>,
}
