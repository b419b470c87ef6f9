//! Benchmark flow: one dedicated build directory per build type, no unit
//! tests.

use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::runner::CommandRunner;
use crate::steps::{absolute_source_dir, run_build_steps};
use crate::toolchain::Toolchain;
use crate::variant::{BuildType, ASAN_FLAG};

/// The two benchmark flavours the CLI can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkMode {
    /// Optimised build, no sanitizer.
    Release,

    /// Debug build under AddressSanitizer.
    DebugAsan,
}

impl BenchmarkMode {
    pub fn build_type(&self) -> BuildType {
        match self {
            BenchmarkMode::Release => BuildType::Release,
            BenchmarkMode::DebugAsan => BuildType::Debug,
        }
    }

    pub fn compiler_flags(&self) -> &'static str {
        match self {
            BenchmarkMode::Release => "",
            BenchmarkMode::DebugAsan => ASAN_FLAG,
        }
    }
}

/// Configures, compiles and runs the benchmark binary.
#[derive(Clone)]
pub struct BenchmarkRunner {
    runner: CommandRunner,
    toolchain: Toolchain,
    source_dir: PathBuf,
}

impl BenchmarkRunner {
    pub fn new(runner: CommandRunner, toolchain: Toolchain, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            toolchain,
            source_dir: absolute_source_dir(source_dir.into()),
        }
    }

    /// `<source_dir>/<build_type>_benchmark_build`
    pub fn build_dir(&self, build_type: BuildType) -> PathBuf {
        self.source_dir.join(format!("{build_type}_benchmark_build"))
    }

    pub async fn run(&self, build_type: BuildType, compiler_flags: &str) -> Result<()> {
        let build_dir = self.build_dir(build_type);
        info!(
            directory = %build_dir.display(),
            build_type = %build_type,
            flags = %compiler_flags,
            "Running benchmark"
        );

        let benchmark = self.toolchain.benchmark_command(&build_dir);
        run_build_steps(
            &self.runner,
            &self.toolchain,
            &build_dir,
            build_type,
            compiler_flags,
            benchmark,
        )
        .await?;
        Ok(())
    }

    pub async fn run_mode(&self, mode: BenchmarkMode) -> Result<()> {
        self.run(mode.build_type(), mode.compiler_flags()).await
    }
}
