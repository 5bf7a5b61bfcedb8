//! Grounded answer composition.
//!
//! The language model is an external black box given a prompt; citations
//! and confidence never come from generated text, only from retrieval.

pub mod composer;
pub mod generator;

pub use composer::{format_timestamp, AnswerComposer, Citation, GroundedAnswer, KeyPoint, LectureSummary};
pub use generator::{AnswerGenerator, ExtractiveGenerator, MockGenerator};
