//! Command-line interface for lectern
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ask timestamp-grounded questions about recorded lectures
#[derive(Parser, Debug)]
#[command(
    name = "lectern",
    version,
    about = "Ask timestamp-grounded questions about recorded lectures"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: pipeline progress, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a recording and answer a question about it
    Ask {
        /// Media file (mp4, mkv, webm, wav, ...)
        media: PathBuf,

        /// The question to ask
        question: String,

        /// Transcript fixture to use instead of a speech model
        #[arg(long, value_name = "JSON")]
        transcript: PathBuf,

        /// Number of passages to retrieve
        #[arg(long, short = 'k', value_name = "N")]
        top_k: Option<usize>,

        /// Pipeline step timeout. Examples: 30s, 5m, 1h30m
        #[arg(long, value_name = "DURATION", value_parser = parse_secs)]
        step_timeout: Option<u64>,
    },

    /// Process a recording and print a summary with key moments
    Summarize {
        /// Media file (mp4, mkv, webm, wav, ...)
        media: PathBuf,

        /// Transcript fixture to use instead of a speech model
        #[arg(long, value_name = "JSON")]
        transcript: PathBuf,
    },

    /// Show how a transcript would partition into retrieval chunks
    Inspect {
        /// Transcript fixture to partition
        transcript: PathBuf,
    },
}

/// Parse a duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`).
fn parse_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secs_bare_number() {
        assert_eq!(parse_secs("30"), Ok(30));
    }

    #[test]
    fn test_parse_secs_single_unit() {
        assert_eq!(parse_secs("30s"), Ok(30));
        assert_eq!(parse_secs("5m"), Ok(300));
        assert_eq!(parse_secs("2h"), Ok(7200));
    }

    #[test]
    fn test_parse_secs_compound() {
        assert_eq!(parse_secs("1h30m"), Ok(5400));
    }

    #[test]
    fn test_parse_secs_rejects_garbage() {
        assert!(parse_secs("soon").is_err());
    }

    #[test]
    fn test_cli_parses_ask_command() {
        let cli = Cli::try_parse_from([
            "lectern",
            "ask",
            "lecture.mp4",
            "what was said about entropy?",
            "--transcript",
            "lecture.json",
            "-k",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask {
                media,
                question,
                transcript,
                top_k,
                step_timeout,
            } => {
                assert_eq!(media, PathBuf::from("lecture.mp4"));
                assert_eq!(question, "what was said about entropy?");
                assert_eq!(transcript, PathBuf::from("lecture.json"));
                assert_eq!(top_k, Some(3));
                assert_eq!(step_timeout, None);
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_cli_parses_inspect_command() {
        let cli = Cli::try_parse_from(["lectern", "inspect", "lecture.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Inspect { .. }));
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["lectern"]).is_err());
    }
}
