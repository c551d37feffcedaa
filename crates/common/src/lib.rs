//! bdclip Common Utilities
//!
//! Shared infrastructure for all bdclip crates:
//! - Error types and result aliases
//! - Timecode parsing for clip in-time offsets
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
