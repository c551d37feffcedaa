//! Wire messages exchanged with the compiling service.
//!
//! Messages are JSON objects, one per line, tagged by `type`.

use std::path::PathBuf;

use bdclip_clip_model::ClipDescriptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client to service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start compiling `clip` into `workspace`.
    Compile {
        endpoint: String,
        project_id: Uuid,
        workspace: PathBuf,
        schema_dir: PathBuf,
        /// Cache bound in bytes.
        cache_size: u64,
        clip: ClipDescriptor,
    },
    /// Abort the running compilation.
    Cancel,
}

/// Service to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceMessage {
    Total { amount: u64 },
    Progress { value: u64 },
    Completed { success: bool },
    Fault { message: String },
}

/// Encode a message as a single newline-terminated line.
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}
