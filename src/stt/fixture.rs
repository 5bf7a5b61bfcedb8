//! Transcriber backed by a transcript file on disk.
//!
//! Lets the pipeline run end to end without a speech model: the fixture
//! carries the segments a real engine would have produced. Used by the CLI
//! and integration tests.

use crate::error::{LecternError, Result};
use crate::media::AudioTrack;
use crate::stt::transcriber::{Transcriber, Transcript};
use crate::store::Segment;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk transcript format: `{language, segments: [{start, end, text}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptFile {
    #[serde(default)]
    pub language: Option<String>,
    pub segments: Vec<Segment>,
}

/// Transcriber that reads a prepared transcript instead of running a model.
pub struct FixtureTranscriber {
    path: PathBuf,
}

impl FixtureTranscriber {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn load(&self) -> Result<TranscriptFile> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            LecternError::InvalidTranscript {
                message: format!("cannot read {}: {}", self.path.display(), e),
            }
        })?;
        let file: TranscriptFile =
            serde_json::from_str(&contents).map_err(|e| LecternError::InvalidTranscript {
                message: format!("cannot parse {}: {}", self.path.display(), e),
            })?;
        if file.segments.is_empty() {
            return Err(LecternError::InvalidTranscript {
                message: format!("{} contains no segments", self.path.display()),
            });
        }
        Ok(file)
    }
}

#[async_trait]
impl Transcriber for FixtureTranscriber {
    async fn transcribe(&self, _audio: &AudioTrack) -> Result<Transcript> {
        let file = self.load()?;
        Ok(Transcript {
            language: file.language,
            segments: file.segments,
        })
    }

    fn model_name(&self) -> &str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn track() -> AudioTrack {
        AudioTrack::new(PathBuf::from("/tmp/audio.wav"), 16000)
    }

    #[tokio::test]
    async fn test_fixture_loads_segments() {
        let json = r#"{
            "language": "en",
            "segments": [
                {"start": 0.0, "end": 2.5, "text": "welcome to the lecture"},
                {"start": 2.5, "end": 5.0, "text": "today we cover entropy"}
            ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let transcriber = FixtureTranscriber::new(file.path());
        let transcript = transcriber.transcribe(&track()).await.unwrap();

        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[1].text, "today we cover entropy");
    }

    #[tokio::test]
    async fn test_fixture_without_language_field() {
        let json = r#"{"segments": [{"start": 0.0, "end": 1.0, "text": "hi"}]}"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let transcriber = FixtureTranscriber::new(file.path());
        let transcript = transcriber.transcribe(&track()).await.unwrap();
        assert_eq!(transcript.language, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_transcript() {
        let transcriber = FixtureTranscriber::new(Path::new("/tmp/no-such-transcript-98765.json"));
        let result = transcriber.transcribe(&track()).await;

        match result {
            Err(LecternError::InvalidTranscript { message }) => {
                assert!(message.contains("cannot read"));
            }
            _ => panic!("Expected InvalidTranscript error"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_transcript() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();

        let transcriber = FixtureTranscriber::new(file.path());
        assert!(transcriber.transcribe(&track()).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_segment_list_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"segments": []}"#).unwrap();

        let transcriber = FixtureTranscriber::new(file.path());
        let result = transcriber.transcribe(&track()).await;

        match result {
            Err(LecternError::InvalidTranscript { message }) => {
                assert!(message.contains("no segments"));
            }
            _ => panic!("Expected InvalidTranscript error"),
        }
    }
}
