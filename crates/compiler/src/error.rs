//! Error types for compilation runs.
//!
//! A logical compile failure is not an error here; it is the `false` result
//! of a completed run. Channel faults are [`TransportError`]s.

use std::path::PathBuf;

use bdclip_clip_model::ModelError;

/// Failures of the channel to the compiling service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to launch compiler {path}: {source}")]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Compiler process exited before accepting connections ({status})")]
    CompilerExited { status: std::process::ExitStatus },

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Compiling service aborted: {message}")]
    RemoteAbort { message: String },

    #[error("Channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol {
            message: msg.into(),
        }
    }
}

/// Failures that abort an orchestration run.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Clip descriptor rejected: {0}")]
    InvalidClip(#[from] ModelError),

    #[error("Failed to create workspace {path}: {source}")]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures delivering artifacts after a successful compilation.
#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    #[error("Expected artifact missing from workspace: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("Stream and clip information destinations collide: {path}")]
    DestinationConflict { path: PathBuf },

    #[error("Failed to prepare destination {path}: {source}")]
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}
