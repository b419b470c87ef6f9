//! Sequencing of the unit-test build matrix.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::error::Result;
use crate::plan::ExecutionPlan;
use crate::runner::CommandRunner;
use crate::steps::{absolute_source_dir, run_build_steps};
use crate::toolchain::Toolchain;
use crate::variant::BuildConfiguration;

/// Runs configure, compile and the unit-test binary for each configuration
/// of a plan, stopping at the first fatal failure.
#[derive(Clone)]
pub struct BuildOrchestrator {
    runner: CommandRunner,
    toolchain: Toolchain,
    source_dir: PathBuf,
}

impl BuildOrchestrator {
    /// `source_dir` is the project root; build directories are created
    /// directly beneath it. Relative roots are resolved against the current
    /// directory here, once.
    pub fn new(runner: CommandRunner, toolchain: Toolchain, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            toolchain,
            source_dir: absolute_source_dir(source_dir.into()),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Build directory for `configuration`.
    pub fn build_dir(&self, configuration: &BuildConfiguration) -> PathBuf {
        self.source_dir.join(&configuration.directory_name)
    }

    pub async fn run(&self, plan: &ExecutionPlan) -> Result<()> {
        let start = Instant::now();
        info!(configurations = plan.len(), "Starting build matrix");

        for configuration in plan.iter() {
            self.run_configuration(configuration).await?;
        }

        info!(
            configurations = plan.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Build matrix passed"
        );
        Ok(())
    }

    async fn run_configuration(&self, configuration: &BuildConfiguration) -> Result<()> {
        let build_dir = self.build_dir(configuration);
        info!(
            directory = %configuration.directory_name,
            build_type = %configuration.build_type,
            flags = %configuration.compiler_flags,
            "Building configuration"
        );

        let unit_test = self.toolchain.unit_test_command(&build_dir);
        run_build_steps(
            &self.runner,
            &self.toolchain,
            &build_dir,
            configuration.build_type,
            &configuration.compiler_flags,
            unit_test,
        )
        .await?;
        Ok(())
    }
}
