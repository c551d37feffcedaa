//! Process exit codes.

use bdclip_compiler::{OrchestratorError, RunOutcome};
use clap::error::ErrorKind;

pub const SUCCESS: i32 = 0;
/// Rejected input; nothing was started.
pub const INPUT_ERROR: i32 = -1;
/// The compiling service ran and reported failure.
pub const COMPILE_FAILED: i32 = 1;
/// Compiled, but the artifacts could not be delivered.
pub const FINALIZE_FAILED: i32 = 2;
/// Workspace or channel failure.
pub const RUN_FAILED: i32 = 3;

/// Code for a command line that failed to parse. Help and version
/// requests are not failures.
pub fn for_parse_error(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => SUCCESS,
        _ => INPUT_ERROR,
    }
}

pub fn for_run(result: &Result<RunOutcome, OrchestratorError>) -> i32 {
    match result {
        Ok(RunOutcome::Delivered { .. }) => SUCCESS,
        Ok(RunOutcome::CompileFailed { .. }) => COMPILE_FAILED,
        Ok(RunOutcome::FinalizeFailed { .. }) => FINALIZE_FAILED,
        Err(OrchestratorError::InvalidClip(_)) => INPUT_ERROR,
        Err(OrchestratorError::Workspace { .. } | OrchestratorError::Transport(_)) => RUN_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdclip_clip_model::ModelError;
    use bdclip_compiler::{Compilation, FinalizeError, TransportError};
    use std::path::PathBuf;

    fn compilation(success: bool) -> Compilation {
        Compilation {
            project_id: uuid::Uuid::nil(),
            workspace: PathBuf::from("/tmp/bdclip/ws"),
            success,
        }
    }

    #[test]
    fn test_outcomes_map_to_distinct_codes() {
        let failed = Ok(RunOutcome::CompileFailed {
            compilation: compilation(false),
        });
        assert_eq!(for_run(&failed), COMPILE_FAILED);

        let undelivered = Ok(RunOutcome::FinalizeFailed {
            compilation: compilation(true),
            error: FinalizeError::MissingArtifact {
                path: PathBuf::from("STREAM/00000.m2ts"),
            },
        });
        assert_eq!(for_run(&undelivered), FINALIZE_FAILED);

        let transport = Err(OrchestratorError::Transport(TransportError::protocol(
            "closed",
        )));
        assert_eq!(for_run(&transport), RUN_FAILED);

        let invalid = Err(OrchestratorError::InvalidClip(ModelError::UnknownFrameRate));
        assert_eq!(for_run(&invalid), INPUT_ERROR);
    }

    #[test]
    fn test_input_errors_are_negative_and_failures_positive() {
        assert!(INPUT_ERROR < 0);
        for code in [COMPILE_FAILED, FINALIZE_FAILED, RUN_FAILED] {
            assert!(code > 0);
        }
    }
}
