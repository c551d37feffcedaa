//! Artifact delivery after a successful compilation.

use std::path::{Path, PathBuf};

use bdclip_clip_model::ClipDescriptor;
use tokio::fs;

use crate::error::FinalizeError;

/// Extension given to the delivered clip information file.
pub const CLIP_INFO_EXTENSION: &str = "clpi";

/// Workspace-relative locations of the compiler's outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    pub stream: PathBuf,
    pub clip_info: PathBuf,
}

impl ArtifactLayout {
    pub fn for_clip(clip: &ClipDescriptor) -> Self {
        Self {
            stream: Path::new("STREAM").join(clip.stream_file_name()),
            clip_info: Path::new("CLIPINF").join(clip.clip_info_file_name()),
        }
    }
}

/// Where the clip information file lands for a given stream destination.
pub fn clip_info_destination(stream_destination: &Path) -> PathBuf {
    stream_destination.with_extension(CLIP_INFO_EXTENSION)
}

/// Files written by [`finalize_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedArtifacts {
    pub stream: PathBuf,
    pub clip_info: PathBuf,
    /// Total bytes copied.
    pub bytes: u64,
}

/// Copy both artifacts out of `workspace`, overwriting existing files.
///
/// Both sources are checked before anything is written.
pub async fn finalize_artifacts(
    workspace: &Path,
    layout: &ArtifactLayout,
    stream_destination: &Path,
) -> Result<FinalizedArtifacts, FinalizeError> {
    let clip_info_dest = clip_info_destination(stream_destination);
    if clip_info_dest == stream_destination {
        return Err(FinalizeError::DestinationConflict {
            path: stream_destination.to_path_buf(),
        });
    }

    let stream_src = workspace.join(&layout.stream);
    let clip_info_src = workspace.join(&layout.clip_info);
    for src in [&stream_src, &clip_info_src] {
        if !fs::try_exists(src).await.unwrap_or(false) {
            return Err(FinalizeError::MissingArtifact { path: src.clone() });
        }
    }

    ensure_parent_dir(stream_destination).await?;

    let mut bytes = copy_artifact(&stream_src, stream_destination).await?;
    bytes += copy_artifact(&clip_info_src, &clip_info_dest).await?;

    tracing::info!(
        stream = %stream_destination.display(),
        clip_info = %clip_info_dest.display(),
        bytes,
        "Artifacts delivered"
    );

    Ok(FinalizedArtifacts {
        stream: stream_destination.to_path_buf(),
        clip_info: clip_info_dest,
        bytes,
    })
}

async fn ensure_parent_dir(path: &Path) -> Result<(), FinalizeError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| FinalizeError::Destination {
                    path: parent.to_path_buf(),
                    source,
                })
        }
        _ => Ok(()),
    }
}

async fn copy_artifact(from: &Path, to: &Path) -> Result<u64, FinalizeError> {
    tracing::debug!(from = %from.display(), to = %to.display(), "Copying artifact");
    fs::copy(from, to).await.map_err(|source| FinalizeError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
