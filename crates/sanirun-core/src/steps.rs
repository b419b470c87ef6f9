//! Directory-scoped build steps shared by the unit-test and benchmark flows.
//!
//! Every flow walks the same phases:
//!
//! ```text
//! NotStarted -> DirectoryEnsured -> Configured -> Compiled -> Executed -> DirectoryRestored
//! ```
//!
//! A failed transition ends the flow with [`RunError::Aborted`], naming the
//! phase that was being entered. Commands receive their working directory
//! explicitly; the process-wide current directory is never changed, so
//! `DirectoryRestored` holds on every path, including aborts.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, RunError};
use crate::executor::CommandSpec;
use crate::runner::{CommandRunner, OnFailure};
use crate::toolchain::Toolchain;
use crate::variant::BuildType;

/// Progress of one directory-scoped flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    DirectoryEnsured,
    Configured,
    Compiled,
    Executed,
    DirectoryRestored,
}

impl Phase {
    /// Name of the step that leads into this phase.
    pub fn step_name(&self) -> &'static str {
        match self {
            Phase::NotStarted => "start",
            Phase::DirectoryEnsured => "create directory",
            Phase::Configured => "configure",
            Phase::Compiled => "compile",
            Phase::Executed => "execute",
            Phase::DirectoryRestored => "restore directory",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step_name())
    }
}

/// Tracks the current phase and wraps failures with their location.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    directory: PathBuf,
    current: Phase,
}

impl PhaseTracker {
    pub(crate) fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            current: Phase::NotStarted,
        }
    }

    pub(crate) fn current(&self) -> Phase {
        self.current
    }

    /// Move to `next` if `result` is `Ok`, otherwise abort in `next`.
    pub(crate) fn advance<T>(&mut self, next: Phase, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                debug!(
                    directory = %self.directory.display(),
                    from = ?self.current,
                    to = ?next,
                    "phase transition"
                );
                self.current = next;
                Ok(value)
            }
            Err(source) => {
                warn!(
                    directory = %self.directory.display(),
                    phase = %next,
                    error = %source,
                    "aborting"
                );
                Err(RunError::Aborted {
                    directory: self.directory.clone(),
                    phase: next,
                    source: Box::new(source),
                })
            }
        }
    }
}

/// Anchor `source_dir` to the current directory.
///
/// Commands run with their build directory as working directory, so a
/// relative executable path such as `build/unit_tests/x` would be resolved
/// against that directory a second time.
pub(crate) fn absolute_source_dir(source_dir: PathBuf) -> PathBuf {
    let source_dir = if source_dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        source_dir
    };
    std::path::absolute(&source_dir).unwrap_or(source_dir)
}

/// Create `dir` if missing. Never fails: an existing directory is fine, and
/// any other problem is logged and left for the next step to surface.
pub async fn ensure_build_dir(dir: &Path) -> bool {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => {
            debug!(directory = %dir.display(), "created build directory");
            true
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(directory = %dir.display(), "build directory already exists");
            true
        }
        Err(err) => {
            warn!(directory = %dir.display(), error = %err, "could not create build directory");
            false
        }
    }
}

/// Ensure, configure, compile, then run `executable` inside `build_dir`.
pub(crate) async fn run_build_steps(
    runner: &CommandRunner,
    toolchain: &Toolchain,
    build_dir: &Path,
    build_type: BuildType,
    compiler_flags: &str,
    executable: CommandSpec,
) -> Result<Phase> {
    let mut tracker = PhaseTracker::new(build_dir);

    ensure_build_dir(build_dir).await;
    tracker.advance(Phase::DirectoryEnsured, Ok(()))?;

    let configure = toolchain.configure_command(build_type, compiler_flags, build_dir);
    tracker.advance(Phase::Configured, runner.run(&configure, OnFailure::Abort).await)?;

    let compile = toolchain.compile_command(build_dir);
    tracker.advance(Phase::Compiled, runner.run(&compile, OnFailure::Abort).await)?;

    tracker.advance(Phase::Executed, runner.run(&executable, OnFailure::Abort).await)?;

    tracker.advance(Phase::DirectoryRestored, Ok(()))?;
    Ok(tracker.current())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_advances_on_ok() {
        let mut tracker = PhaseTracker::new(Path::new("build"));
        assert_eq!(tracker.current(), Phase::NotStarted);
        tracker.advance(Phase::DirectoryEnsured, Ok(())).unwrap();
        assert_eq!(tracker.current(), Phase::DirectoryEnsured);
    }

    #[test]
    fn test_tracker_wraps_failure_with_phase() {
        let mut tracker = PhaseTracker::new(Path::new("tsan_build"));
        tracker.advance(Phase::DirectoryEnsured, Ok(())).unwrap();

        let err = tracker
            .advance::<()>(
                Phase::Configured,
                Err(RunError::CommandFailed {
                    command: "cmake".to_string(),
                    exit_code: Some(1),
                }),
            )
            .unwrap_err();

        match err {
            RunError::Aborted {
                directory, phase, ..
            } => {
                assert_eq!(directory, PathBuf::from("tsan_build"));
                assert_eq!(phase, Phase::Configured);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(tracker.current(), Phase::DirectoryEnsured);
    }

    #[test]
    fn test_absolute_source_dir_anchors_relative_paths() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_source_dir(PathBuf::from("project")), cwd.join("project"));
        assert!(absolute_source_dir(PathBuf::from(".")).is_absolute());
        assert!(absolute_source_dir(PathBuf::new()).is_absolute());
        assert_eq!(absolute_source_dir(PathBuf::from("/src")), PathBuf::from("/src"));
    }

    #[tokio::test]
    async fn test_ensure_build_dir_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("build");

        assert!(ensure_build_dir(&dir).await);
        assert!(ensure_build_dir(&dir).await);
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_build_dir_reports_missing_parent() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("missing").join("build");
        assert!(!ensure_build_dir(&dir).await);
    }
}
