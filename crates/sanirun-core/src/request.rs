//! What a single invocation should do, derived from the CLI switches.

use tracing::info;

use crate::benchmark::{BenchmarkMode, BenchmarkRunner};
use crate::error::Result;
use crate::orchestrator::BuildOrchestrator;
use crate::plan::ExecutionPlan;

/// The raw switches, independent of how they were parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub asan: bool,
    pub tsan: bool,
    pub benchmark: bool,
    pub benchmark_debug: bool,
    pub only_benchmark: bool,
}

/// Unit-test plan (if any) followed by benchmark flows, in run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub plan: Option<ExecutionPlan>,
    pub benchmarks: Vec<BenchmarkMode>,
}

impl RunRequest {
    pub fn from_selection(selection: Selection) -> Self {
        let mut benchmarks = Vec::new();
        if selection.benchmark {
            benchmarks.push(BenchmarkMode::Release);
        }
        if selection.benchmark_debug {
            benchmarks.push(BenchmarkMode::DebugAsan);
        }

        if selection.only_benchmark {
            if benchmarks.is_empty() {
                benchmarks.push(BenchmarkMode::Release);
            }
            return Self {
                plan: None,
                benchmarks,
            };
        }

        Self {
            plan: Some(ExecutionPlan::from_sanitizers(selection.asan, selection.tsan)),
            benchmarks,
        }
    }

    /// Run the unit-test plan, then each benchmark flow. Stops at the first
    /// fatal failure.
    pub async fn execute(
        &self,
        orchestrator: &BuildOrchestrator,
        benchmarks: &BenchmarkRunner,
    ) -> Result<()> {
        if let Some(plan) = &self.plan {
            orchestrator.run(plan).await?;
        } else {
            info!("Skipping unit-test configurations");
        }

        for mode in &self.benchmarks {
            benchmarks.run_mode(*mode).await?;
        }
        Ok(())
    }
}
