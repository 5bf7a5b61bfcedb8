//! Speech-to-text collaborators.
//!
//! The transcription engine is an external black box returning timed
//! segments; everything here is the trait seam plus offline implementations.

pub mod fixture;
pub mod transcriber;

pub use fixture::FixtureTranscriber;
pub use transcriber::{MockTranscriber, Transcriber, Transcript};
