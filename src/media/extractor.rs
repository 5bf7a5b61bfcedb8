//! Audio extraction from media containers.

use crate::defaults;
use crate::error::{LecternError, Result};
use crate::media::command::CommandExecutor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decoded audio ready for transcription.
///
/// The audio itself stays on disk; the track is a handle the transcriber
/// understands.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub path: PathBuf,
    pub sample_rate: u32,
}

impl AudioTrack {
    pub fn new(path: PathBuf, sample_rate: u32) -> Self {
        Self { path, sample_rate }
    }
}

/// Trait for media-to-audio extraction.
///
/// This trait allows swapping implementations (real ffmpeg vs mock).
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract the audio track from a media reference.
    ///
    /// # Arguments
    /// * `media_ref` - Path or URL of the uploaded media
    ///
    /// # Returns
    /// Handle to the decoded audio or a decode error
    async fn extract(&self, media_ref: &str) -> Result<AudioTrack>;
}

/// Extractor shelling out to ffmpeg through a `CommandExecutor`.
///
/// Produces 16kHz mono PCM, the standard input for speech recognition.
pub struct FfmpegExtractor<E: CommandExecutor> {
    executor: Arc<E>,
}

impl<E: CommandExecutor + 'static> FfmpegExtractor<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    fn audio_path(media_ref: &str) -> PathBuf {
        Path::new(media_ref).with_extension("wav")
    }
}

#[async_trait]
impl<E: CommandExecutor + 'static> AudioExtractor for FfmpegExtractor<E> {
    async fn extract(&self, media_ref: &str) -> Result<AudioTrack> {
        let output = Self::audio_path(media_ref);
        let output_str = output.to_string_lossy().to_string();
        let media_ref = media_ref.to_string();
        let executor = self.executor.clone();

        // ffmpeg can run for minutes on long recordings; keep it off the
        // async worker threads.
        tokio::task::spawn_blocking(move || {
            let rate = defaults::SAMPLE_RATE.to_string();
            executor.execute(
                "ffmpeg",
                &[
                    "-i",
                    &media_ref,
                    "-vn",
                    "-acodec",
                    "pcm_s16le",
                    "-ar",
                    &rate,
                    "-ac",
                    "1",
                    "-y",
                    &output_str,
                ],
            )
        })
        .await
        .map_err(|e| LecternError::AudioExtraction {
            message: format!("extraction task failed: {}", e),
        })??;

        Ok(AudioTrack::new(output, defaults::SAMPLE_RATE))
    }
}

/// Extractor for media that already is a bare audio file.
///
/// Hands the reference straight through as the audio track; used when the
/// upload is a wav/mp3 rather than a video container.
#[derive(Debug, Clone, Default)]
pub struct PassthroughExtractor;

impl PassthroughExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioExtractor for PassthroughExtractor {
    async fn extract(&self, media_ref: &str) -> Result<AudioTrack> {
        Ok(AudioTrack::new(
            PathBuf::from(media_ref),
            defaults::SAMPLE_RATE,
        ))
    }
}

/// Mock extractor for testing
pub struct MockExtractor {
    track: AudioTrack,
    failure: Option<String>,
    delay: Option<std::time::Duration>,
}

impl MockExtractor {
    /// Create a new mock extractor returning a fixed track
    pub fn new() -> Self {
        Self {
            track: AudioTrack::new(PathBuf::from("/tmp/mock-audio.wav"), defaults::SAMPLE_RATE),
            failure: None,
            delay: None,
        }
    }

    /// Configure the mock to return a specific track
    pub fn with_track(mut self, track: AudioTrack) -> Self {
        self.track = track;
        self
    }

    /// Configure the mock to fail on extract
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Configure the mock to sleep before responding (for timeout tests)
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioExtractor for MockExtractor {
    async fn extract(&self, _media_ref: &str) -> Result<AudioTrack> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(LecternError::AudioExtraction {
                message: message.clone(),
            }),
            None => Ok(self.track.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::command::testing::MockCommandExecutor;

    #[tokio::test]
    async fn test_mock_extractor_returns_track() {
        let extractor = MockExtractor::new();
        let track = extractor.extract("lecture.mp4").await.unwrap();

        assert_eq!(track.sample_rate, 16000);
        assert_eq!(track.path, PathBuf::from("/tmp/mock-audio.wav"));
    }

    #[tokio::test]
    async fn test_mock_extractor_failure() {
        let extractor = MockExtractor::new().with_failure("corrupt container");
        let result = extractor.extract("lecture.mp4").await;

        match result {
            Err(LecternError::AudioExtraction { message }) => {
                assert_eq!(message, "corrupt container");
            }
            _ => panic!("Expected AudioExtraction error"),
        }
    }

    #[tokio::test]
    async fn test_ffmpeg_extractor_invokes_ffmpeg_with_pcm_args() {
        let extractor = FfmpegExtractor::new(MockCommandExecutor::new());
        let track = extractor.extract("talks/lecture.mp4").await.unwrap();

        assert_eq!(track.path, PathBuf::from("talks/lecture.wav"));

        let executor = extractor.executor.clone();
        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffmpeg");
        let args = &calls[0].1;
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"pcm_s16le".to_string()));
        assert!(args.contains(&"16000".to_string()));
        assert!(args.contains(&"talks/lecture.wav".to_string()));
    }

    #[tokio::test]
    async fn test_ffmpeg_extractor_propagates_tool_failure() {
        let extractor = FfmpegExtractor::new(MockCommandExecutor::failing("decode error"));
        let result = extractor.extract("lecture.mp4").await;

        assert!(result.is_err());
    }

    #[test]
    fn test_extractor_trait_is_object_safe() {
        let _extractor: Box<dyn AudioExtractor> = Box::new(MockExtractor::new());
    }
}
