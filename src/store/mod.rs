//! Recording, segment, and chunk storage.
//!
//! The store is an explicit object owned by the engine and shared with the
//! orchestrator, indexer, and retriever. All client-visible recording state
//! lives here; the orchestrator is the only writer of state transitions.

pub mod transcript_store;
pub mod types;

pub use transcript_store::TranscriptStore;
pub use types::{Chunk, Recording, RecordingId, RecordingState, Segment, StatusSnapshot};
