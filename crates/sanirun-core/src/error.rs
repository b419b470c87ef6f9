//! Error types for build orchestration

use std::path::PathBuf;

use thiserror::Error;

use crate::steps::Phase;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", describe_exit(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("`{command}` exited successfully but its output contains \"error:\"")]
    ErrorMarker { command: String },

    #[error("output capture failed: {0}")]
    Capture(#[from] std::io::Error),

    #[error("{phase} step failed in {}: {source}", .directory.display())]
    Aborted {
        directory: PathBuf,
        phase: Phase,
        #[source]
        source: Box<RunError>,
    },
}

impl RunError {
    /// The innermost error, looking through `Aborted` wrappers.
    pub fn root(&self) -> &RunError {
        match self {
            RunError::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Errors raised while loading toolchain configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("jobs must be at least 1")]
    InvalidJobs,
}

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message_includes_code() {
        let err = RunError::CommandFailed {
            command: "make -j4".to_string(),
            exit_code: Some(2),
        };
        assert_eq!(err.to_string(), "`make -j4` exited with exit code 2");
    }

    #[test]
    fn test_command_failed_without_code() {
        let err = RunError::CommandFailed {
            command: "make".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_root_unwraps_aborted() {
        let err = RunError::Aborted {
            directory: PathBuf::from("asan_build"),
            phase: Phase::Compiled,
            source: Box::new(RunError::ErrorMarker {
                command: "make".to_string(),
            }),
        };
        assert!(matches!(err.root(), RunError::ErrorMarker { .. }));
        assert!(err.to_string().starts_with("compile step failed in asan_build"));
    }
}
