//! Compilation orchestration.
//!
//! One run: validate the clip, create a fresh workspace, connect, submit,
//! await the result, and (on success) deliver the artifacts. Every step
//! completes before the next one starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bdclip_clip_model::ClipDescriptor;
use bdclip_common::config::CompilingSettings;
use uuid::Uuid;

use crate::error::{FinalizeError, OrchestratorError};
use crate::finalize::{finalize_artifacts, ArtifactLayout, FinalizedArtifacts};
use crate::progress::ProgressSink;
use crate::remote::TcpConnector;
use crate::service::{CompileRequest, ServiceAddress, ServiceConnector};

/// Manifest written into each workspace for diagnosis.
pub const MANIFEST_FILE: &str = "clip.json";

/// Workspace directories are named `BDMV.<project id>`.
pub const WORKSPACE_PREFIX: &str = "BDMV.";

/// Result of a run that reached the compiling service and got an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub project_id: Uuid,
    pub workspace: PathBuf,
    pub success: bool,
}

/// Outcome of compiling and delivering a clip.
#[derive(Debug)]
pub enum RunOutcome {
    /// Compiled and copied to the destination.
    Delivered {
        compilation: Compilation,
        artifacts: FinalizedArtifacts,
    },
    /// The service completed and reported failure. Nothing was copied.
    CompileFailed { compilation: Compilation },
    /// Compiled, but the artifacts could not be delivered.
    FinalizeFailed {
        compilation: Compilation,
        error: FinalizeError,
    },
}

impl RunOutcome {
    pub fn compilation(&self) -> &Compilation {
        match self {
            RunOutcome::Delivered { compilation, .. }
            | RunOutcome::CompileFailed { compilation }
            | RunOutcome::FinalizeFailed { compilation, .. } => compilation,
        }
    }
}

/// Runs compilations against the configured service.
pub struct Orchestrator {
    settings: CompilingSettings,
    connector: Arc<dyn ServiceConnector>,
}

impl Orchestrator {
    pub fn new(settings: CompilingSettings, connector: Arc<dyn ServiceConnector>) -> Self {
        Self {
            settings,
            connector,
        }
    }

    /// Orchestrator using the TCP client for the configured settings.
    pub fn tcp(settings: CompilingSettings) -> Self {
        let connector = Arc::new(TcpConnector::new(settings.clone()));
        Self::new(settings, connector)
    }

    pub fn settings(&self) -> &CompilingSettings {
        &self.settings
    }

    /// Compile `clip` in a fresh workspace.
    ///
    /// The workspace is left in place whatever the outcome. `progress` is
    /// completed on every return path.
    pub async fn compile(
        &self,
        clip: &ClipDescriptor,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Compilation, OrchestratorError> {
        if let Err(err) = clip.validate() {
            progress.complete(false);
            return Err(err.into());
        }

        if !self.settings.schema_dir.is_dir() {
            tracing::warn!(
                schema_dir = %self.settings.schema_dir.display(),
                "Schema directory does not exist"
            );
        }

        let project_id = Uuid::new_v4();
        let workspace = match create_workspace(&self.settings.temp_dir, project_id).await {
            Ok(workspace) => workspace,
            Err(err) => {
                progress.complete(false);
                return Err(err);
            }
        };
        write_manifest(&workspace, project_id, clip).await;

        let address = ServiceAddress::from_settings(&self.settings);
        tracing::info!(
            project_id = %project_id,
            workspace = %workspace.display(),
            address = %address,
            connector = self.connector.name(),
            tracks = clip.tracks().len(),
            "Starting compilation"
        );

        let request = CompileRequest {
            project_id,
            workspace: &workspace,
            clip,
        };
        let result = match self.connector.connect(&address).await {
            Ok(mut service) => service.compile(request, progress.clone()).await,
            Err(err) => Err(err),
        };
        progress.complete(matches!(result, Ok(true)));

        let success = match result {
            Ok(success) => success,
            Err(err) => {
                tracing::error!(project_id = %project_id, error = %err, "Compiling service failed");
                return Err(err.into());
            }
        };

        tracing::info!(project_id = %project_id, success, "Compilation finished");
        Ok(Compilation {
            project_id,
            workspace,
            success,
        })
    }

    /// Compile `clip` and copy its artifacts next to `stream_destination`.
    pub async fn compile_and_deliver(
        &self,
        clip: &ClipDescriptor,
        stream_destination: &Path,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RunOutcome, OrchestratorError> {
        let compilation = self.compile(clip, progress).await?;
        if !compilation.success {
            return Ok(RunOutcome::CompileFailed { compilation });
        }

        let layout = ArtifactLayout::for_clip(clip);
        match finalize_artifacts(&compilation.workspace, &layout, stream_destination).await {
            Ok(artifacts) => Ok(RunOutcome::Delivered {
                compilation,
                artifacts,
            }),
            Err(error) => {
                tracing::error!(error = %error, "Failed to deliver artifacts");
                Ok(RunOutcome::FinalizeFailed { compilation, error })
            }
        }
    }
}

async fn create_workspace(root: &Path, project_id: Uuid) -> Result<PathBuf, OrchestratorError> {
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|source| OrchestratorError::Workspace {
            path: root.to_path_buf(),
            source,
        })?;

    let workspace = root.join(format!("{WORKSPACE_PREFIX}{project_id}"));
    tokio::fs::create_dir(&workspace)
        .await
        .map_err(|source| OrchestratorError::Workspace {
            path: workspace.clone(),
            source,
        })?;
    Ok(workspace)
}

async fn write_manifest(workspace: &Path, project_id: Uuid, clip: &ClipDescriptor) {
    let path = workspace.join(MANIFEST_FILE);
    let manifest = serde_json::json!({
        "project_id": project_id,
        "created_at": chrono::Utc::now().to_rfc3339(),
        "clip": clip,
    });
    let written = match serde_json::to_string_pretty(&manifest) {
        Ok(json) => tokio::fs::write(&path, json).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    if let Err(err) = written {
        tracing::warn!(error = %err, path = %path.display(), "Failed to write workspace manifest");
    }
}
