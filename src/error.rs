//! Error types for lectern.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LecternError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Submission errors — the recording is never created
    #[error("Unsupported media reference '{media_ref}': {message}")]
    InvalidMedia { media_ref: String, message: String },

    #[error("Recording not found: {id}")]
    RecordingNotFound { id: String },

    // Pipeline step failures — recorded as the recording's failure_reason
    #[error("Audio extraction failed: {message}")]
    AudioExtraction { message: String },

    #[error("Extraction tool not found: {tool}")]
    ExtractionToolNotFound { tool: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Embedding failed: {message}")]
    Embedding { message: String },

    #[error("Step {state} timed out after {seconds}s")]
    StepTimeout { state: String, seconds: u64 },

    // Query-time errors
    #[error("Recording {id} is not ready for questions (state: {state})")]
    NotReady { id: String, state: String },

    #[error("Answer service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Answer generation failed: {message}")]
    Generation { message: String },

    // Transcript fixture errors
    #[error("Invalid transcript fixture: {message}")]
    InvalidTranscript { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LecternError>;
