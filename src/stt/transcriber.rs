use crate::error::{LecternError, Result};
use crate::media::AudioTrack;
use crate::store::Segment;
use async_trait::async_trait;

/// Output of one transcription call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// Detected language code, if the engine reports one.
    pub language: Option<String>,
    /// Timed segments ordered by start.
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// End of the last segment, i.e. the transcribed duration.
    pub fn duration(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end)
    }
}

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real engine vs mock).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio track into timed segments.
    ///
    /// # Arguments
    /// * `audio` - Decoded audio handle produced by the extractor
    ///
    /// # Returns
    /// Ordered segments with timestamps, or an error
    async fn transcribe(&self, audio: &AudioTrack) -> Result<Transcript>;

    /// Get the name of the transcription model
    fn model_name(&self) -> &str;
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    segments: Vec<Segment>,
    language: Option<String>,
    should_fail: bool,
    delay: Option<std::time::Duration>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            segments: vec![
                Segment::new(0.0, 2.0, "mock transcription"),
                Segment::new(2.0, 4.0, "second segment"),
            ],
            language: Some("en".to_string()),
            should_fail: false,
            delay: None,
        }
    }

    /// Configure the mock to return specific segments
    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the reported language
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to sleep before responding (for timeout tests)
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &AudioTrack) -> Result<Transcript> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            Err(LecternError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(Transcript {
                language: self.language.clone(),
                segments: self.segments.clone(),
            })
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
