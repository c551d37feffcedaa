//! Error types shared across bdclip crates.

/// Top-level error type for shared bdclip operations.
#[derive(Debug, thiserror::Error)]
pub enum BdclipError {
    #[error("Invalid timecode '{input}': {message}")]
    Timecode { input: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using BdclipError.
pub type BdclipResult<T> = Result<T, BdclipError>;

impl BdclipError {
    pub fn timecode(input: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Timecode {
            input: input.into(),
            message: msg.into(),
        }
    }
}
