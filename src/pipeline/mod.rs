//! Processing pipeline for uploaded recordings.
//!
//! Poll-driven state machine: callers call `advance` repeatedly and read
//! progress from the store; each call performs at most one step of work.

pub mod orchestrator;

pub use orchestrator::Orchestrator;
