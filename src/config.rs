use crate::error::{LecternError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub answer: AnswerConfig,
    pub pipeline: PipelineConfig,
}

/// Chunking and embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Primary chunk limit: maximum chunk duration in seconds.
    pub max_chunk_seconds: f64,
    /// Secondary chunk limit: maximum chunk text length in characters.
    pub max_chunk_chars: usize,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Minimum relevance score for a hit to ground an answer.
    pub relevance_floor: f32,
}

/// Answer composition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnswerConfig {
    /// Maximum number of citations returned with an answer.
    pub citation_limit: usize,
    /// Confidence below which an answer counts as low-confidence.
    pub low_confidence_threshold: f32,
}

/// Pipeline execution configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Timeout for one pipeline step in seconds.
    pub step_timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_chunk_seconds: crate::defaults::MAX_CHUNK_SECONDS,
            max_chunk_chars: crate::defaults::MAX_CHUNK_CHARS,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: crate::defaults::TOP_K,
            relevance_floor: crate::defaults::RELEVANCE_FLOOR,
        }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            citation_limit: crate::defaults::CITATION_LIMIT,
            low_confidence_threshold: crate::defaults::LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            step_timeout_secs: crate::defaults::STEP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML or invalid values.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(LecternError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LECTERN_TOP_K → retrieval.top_k
    /// - LECTERN_MAX_CHUNK_SECONDS → index.max_chunk_seconds
    /// - LECTERN_STEP_TIMEOUT_SECS → pipeline.step_timeout_secs
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(k) = std::env::var("LECTERN_TOP_K") {
            if let Ok(k) = k.parse::<usize>() {
                self.retrieval.top_k = k;
            }
        }

        if let Ok(secs) = std::env::var("LECTERN_MAX_CHUNK_SECONDS") {
            if let Ok(secs) = secs.parse::<f64>() {
                self.index.max_chunk_seconds = secs;
            }
        }

        if let Ok(secs) = std::env::var("LECTERN_STEP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.pipeline.step_timeout_secs = secs;
            }
        }

        self
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.index.max_chunk_seconds <= 0.0 {
            return Err(LecternError::ConfigInvalidValue {
                key: "index.max_chunk_seconds".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.index.max_chunk_chars == 0 {
            return Err(LecternError::ConfigInvalidValue {
                key: "index.max_chunk_chars".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(LecternError::ConfigInvalidValue {
                key: "retrieval.top_k".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.retrieval.relevance_floor) {
            return Err(LecternError::ConfigInvalidValue {
                key: "retrieval.relevance_floor".to_string(),
                message: "must be within [0, 1]".to_string(),
            });
        }
        if self.pipeline.step_timeout_secs == 0 {
            return Err(LecternError::ConfigInvalidValue {
                key: "pipeline.step_timeout_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/lectern/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lectern")
            .join("config.toml")
    }
}
