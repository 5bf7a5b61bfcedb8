//! Default configuration constants for lectern.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default maximum chunk duration in seconds.
///
/// Duration is the primary limit when grouping transcript segments into
/// retrieval chunks. Two minutes keeps a cited span short enough to
/// scrub to in a player while giving the embedding enough context.
pub const MAX_CHUNK_SECONDS: f64 = 120.0;

/// Default maximum chunk text length in characters.
///
/// Secondary cap that closes a chunk early on dense speech, protecting
/// the embedding input length. A chunk closes on whichever limit the
/// next segment would cross first.
pub const MAX_CHUNK_CHARS: usize = 1000;

/// Default number of chunks retrieved per question.
pub const TOP_K: usize = 5;

/// Minimum relevance score for a retrieved chunk to ground an answer.
///
/// Hits below this floor are treated as noise. With cosine scores
/// clamped to [0, 1], 0.1 rejects near-orthogonal matches while
/// keeping genuinely weak-but-related passages.
pub const RELEVANCE_FLOOR: f32 = 0.1;

/// Maximum number of citations returned with an answer.
pub const CITATION_LIMIT: usize = 3;

/// Confidence reported for the fixed "not found in this recording" answer.
pub const NO_MATCH_CONFIDENCE: f32 = 0.0;

/// Confidence below which an answer is considered low-confidence.
///
/// Callers can use this threshold to render "unsure" answers
/// differently. The zero-grounding answer always falls below it.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Default timeout for one pipeline step in seconds.
///
/// Covers the slowest external call (transcribing a long lecture).
/// A step exceeding this moves the recording to Failed.
pub const STEP_TIMEOUT_SECS: u64 = 600;

/// Audio sample rate requested from the extraction tool, in Hz.
///
/// 16kHz mono is the standard input format for speech recognition.
pub const SAMPLE_RATE: u32 = 16000;

/// Dimension of the offline feature-hashing embedder.
pub const HASH_EMBEDDING_DIM: usize = 256;

/// Media container extensions accepted at submission.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "wav", "mp3"];
