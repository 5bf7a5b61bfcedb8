//! Testable command execution for the extraction tool.

use crate::error::{LecternError, Result};
use std::process::Command;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
/// Enables testability by allowing mock implementations.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments.
    ///
    /// Returns the stdout of the command on success.
    /// Returns an error if the command fails or is not found.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LecternError::ExtractionToolNotFound {
                    tool: command.to_string(),
                }
            } else {
                LecternError::AudioExtraction {
                    message: format!("Failed to execute {}: {}", command, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LecternError::AudioExtraction {
                message: format!(
                    "{} failed with status {:?}: {}",
                    command, output.status, stderr
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Mock executor recording invocations and returning canned results.
    #[derive(Default)]
    pub struct MockCommandExecutor {
        pub calls: Mutex<Vec<(String, Vec<String>)>>,
        pub fail_with: Option<String>,
    }

    impl MockCommandExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }
    }

    impl CommandExecutor for MockCommandExecutor {
        fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
            self.calls.lock().unwrap().push((
                command.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));
            match &self.fail_with {
                Some(message) => Err(LecternError::AudioExtraction {
                    message: message.clone(),
                }),
                None => Ok(String::new()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockCommandExecutor;
    use super::*;

    #[test]
    fn test_mock_executor_records_calls() {
        let executor = MockCommandExecutor::new();
        executor.execute("ffmpeg", &["-i", "in.mp4"]).unwrap();

        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffmpeg");
        assert_eq!(calls[0].1, vec!["-i", "in.mp4"]);
    }

    #[test]
    fn test_mock_executor_failure() {
        let executor = MockCommandExecutor::failing("no such stream");
        let result = executor.execute("ffmpeg", &[]);

        match result {
            Err(LecternError::AudioExtraction { message }) => {
                assert_eq!(message, "no such stream");
            }
            _ => panic!("Expected AudioExtraction error"),
        }
    }

    #[test]
    fn test_system_executor_missing_tool() {
        let executor = SystemCommandExecutor::new();
        let result = executor.execute("definitely-not-a-real-binary-12345", &[]);

        match result {
            Err(LecternError::ExtractionToolNotFound { tool }) => {
                assert_eq!(tool, "definitely-not-a-real-binary-12345");
            }
            _ => panic!("Expected ExtractionToolNotFound error"),
        }
    }
}
