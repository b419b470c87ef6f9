//! Command execution policy: abort-or-continue and the error-marker check.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Result, RunError};
use crate::executor::{CommandExecutor, CommandSpec, ProcessOutput};

/// Marker searched for (case-insensitively) in captured output.
pub const ERROR_MARKER: &str = "error:";

/// What to do when a command fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Fail the whole run: nonzero exits, spawn failures and error markers
    /// in otherwise successful output become `Err`.
    Abort,

    /// Log the failure and report it through [`CommandOutcome::succeeded`].
    Continue,
}

/// Result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub succeeded: bool,
    pub captured_text: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl CommandOutcome {
    fn from_output(output: ProcessOutput, succeeded: bool) -> Self {
        Self {
            succeeded,
            captured_text: output.captured_text,
            exit_code: output.exit_code,
            duration_ms: output.duration_ms,
        }
    }

    fn not_started() -> Self {
        Self {
            succeeded: false,
            captured_text: String::new(),
            exit_code: None,
            duration_ms: 0,
        }
    }
}

/// Heuristic check for diagnostics printed by tools that still exit 0.
///
/// This is a plain case-insensitive substring search for `error:`. It can
/// match text that is not a diagnostic (e.g. a test name) and miss
/// diagnostics that use another spelling. It only ever adds failures on top
/// of the exit-status check.
pub fn contains_error_marker(text: &str) -> bool {
    text.to_lowercase().contains(ERROR_MARKER)
}

/// Runs commands through an executor and applies the failure policy.
///
/// This is the single place where a failure turns into an abort.
#[derive(Clone)]
pub struct CommandRunner {
    executor: Arc<dyn CommandExecutor>,
}

impl CommandRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    pub async fn run(&self, command: &CommandSpec, on_failure: OnFailure) -> Result<CommandOutcome> {
        info!(cwd = %command.cwd.display(), "{command}");

        let output = match self.executor.execute(command).await {
            Ok(output) => output,
            Err(err @ RunError::Spawn { .. }) if on_failure == OnFailure::Continue => {
                warn!(error = %err, "ignoring failure");
                return Ok(CommandOutcome::not_started());
            }
            Err(err) => return Err(err),
        };

        if !output.success {
            return match on_failure {
                OnFailure::Abort => Err(RunError::CommandFailed {
                    command: command.to_string(),
                    exit_code: output.exit_code,
                }),
                OnFailure::Continue => {
                    warn!(command = %command, exit_code = ?output.exit_code, "ignoring failure");
                    Ok(CommandOutcome::from_output(output, false))
                }
            };
        }

        if contains_error_marker(&output.captured_text) {
            match on_failure {
                OnFailure::Abort => {
                    return Err(RunError::ErrorMarker {
                        command: command.to_string(),
                    })
                }
                OnFailure::Continue => {
                    warn!(command = %command, "output contains \"{ERROR_MARKER}\"");
                }
            }
        }

        info!(duration_ms = output.duration_ms, "Done");
        Ok(CommandOutcome::from_output(output, true))
    }
}
