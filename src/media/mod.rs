//! Media-to-audio extraction.
//!
//! The extraction tool (ffmpeg) is an external collaborator reached through
//! the `CommandExecutor` seam so the whole layer is testable without media
//! files on disk.

pub mod command;
pub mod extractor;

pub use command::{CommandExecutor, SystemCommandExecutor};
pub use extractor::{
    AudioExtractor, AudioTrack, FfmpegExtractor, MockExtractor, PassthroughExtractor,
};
