//! Answer-generation collaborators.

use crate::error::{LecternError, Result};
use async_trait::async_trait;

/// Trait for the language-generation function.
///
/// Takes a fully grounded prompt and returns free text. May be slow or
/// fail; failures surface to the caller of `ask` as ServiceUnavailable and
/// are never retried internally.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Mock generator for testing
#[derive(Debug, Clone)]
pub struct MockGenerator {
    response: String,
    should_fail: bool,
    delay: Option<std::time::Duration>,
}

impl MockGenerator {
    /// Create a new mock generator with default settings
    pub fn new() -> Self {
        Self {
            response: "mock generated answer".to_string(),
            should_fail: false,
            delay: None,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on generate
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to sleep before responding
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            Err(LecternError::Generation {
                message: "mock generation failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }
}

/// Offline generator that answers by quoting the retrieved context.
///
/// Used by the CLI when no language model is wired in. Pulls the passage
/// lines out of the prompt's context block, so the answer is always a
/// direct quotation of transcript text.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveGenerator;

impl ExtractiveGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnswerGenerator for ExtractiveGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let context = prompt
            .split("LECTURE CONTEXT:")
            .nth(1)
            .and_then(|rest| rest.split("STUDENT QUESTION:").next())
            .unwrap_or("");

        let excerpt: Vec<&str> = context
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(4)
            .collect();

        if excerpt.is_empty() {
            return Err(LecternError::Generation {
                message: "prompt contains no context to quote".to_string(),
            });
        }

        Ok(format!(
            "The most relevant passages in the recording:\n{}",
            excerpt.join("\n")
        ))
    }
}
