//! sanirun core - sanitizer build matrix orchestration
//!
//! Provides the pieces behind the `sanirun` binary:
//! - Mapping sanitizer flags to build directories and execution plans
//! - Running external commands with teed, captured output
//! - Fail-fast sequencing of configure, compile and test per build directory
//! - The benchmark flow

pub mod benchmark;
pub mod error;
pub mod executor;
pub mod fakes;
pub mod orchestrator;
pub mod plan;
pub mod request;
pub mod runner;
pub mod steps;
pub mod telemetry;
pub mod toolchain;
pub mod variant;

// Re-export key types
pub use benchmark::{BenchmarkMode, BenchmarkRunner};
pub use error::{ConfigError, Result, RunError};
pub use executor::{CommandExecutor, CommandSpec, ProcessExecutor, ProcessOutput};
pub use orchestrator::BuildOrchestrator;
pub use plan::ExecutionPlan;
pub use request::{RunRequest, Selection};
pub use runner::{contains_error_marker, CommandOutcome, CommandRunner, OnFailure};
pub use steps::Phase;
pub use telemetry::init_tracing;
pub use toolchain::Toolchain;
pub use variant::{build_dir_name, BuildConfiguration, BuildType, BuildVariant};
