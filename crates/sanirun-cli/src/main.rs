//! sanirun - build and test every sanitizer configuration in one go
//!
//! ```text
//! sanirun                 # plain debug build + unit tests
//! sanirun -a -t           # ASan then TSan builds + unit tests
//! sanirun -b              # unit tests, then the release benchmark
//! sanirun --only-benchmark --benchmark-debug
//! ```
//!
//! Exits with status 1 as soon as any command fails or prints `error:`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use sanirun_core::{
    BenchmarkRunner, BuildOrchestrator, CommandRunner, ProcessExecutor, RunRequest, Selection,
    Toolchain,
};

#[derive(Parser, Debug)]
#[command(name = "sanirun")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build and test a native library under plain, ASan and TSan configurations", long_about = None)]
struct Cli {
    /// Run unit tests under AddressSanitizer
    #[arg(short, long)]
    asan: bool,

    /// Run unit tests under ThreadSanitizer
    #[arg(short, long)]
    tsan: bool,

    /// Run the release benchmark after the unit tests
    #[arg(short, long)]
    benchmark: bool,

    /// Run the benchmark in a debug build under AddressSanitizer
    #[arg(long)]
    benchmark_debug: bool,

    /// Skip unit tests and run only the benchmark flow
    #[arg(long)]
    only_benchmark: bool,

    /// Project root containing CMakeLists.txt
    #[arg(long, env = "SANIRUN_SOURCE_DIR", default_value = ".")]
    source_dir: PathBuf,

    /// Toolchain config (default: <source-dir>/sanirun.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parallel compile jobs
    #[arg(short, long, env = "SANIRUN_JOBS")]
    jobs: Option<u32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn selection(&self) -> Selection {
        Selection {
            asan: self.asan,
            tsan: self.tsan,
            benchmark: self.benchmark,
            benchmark_debug: self.benchmark_debug,
            only_benchmark: self.only_benchmark,
        }
    }

    fn toolchain(&self) -> Result<Toolchain> {
        let toolchain = Toolchain::discover(self.config.as_deref(), &self.source_dir)
            .context("Failed to load toolchain config")?;
        match self.jobs {
            Some(jobs) => toolchain.with_jobs(jobs).context("Invalid --jobs"),
            None => Ok(toolchain),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sanirun_core::init_tracing(cli.json, level);

    let toolchain = cli.toolchain()?;
    let request = RunRequest::from_selection(cli.selection());

    let runner = CommandRunner::new(Arc::new(ProcessExecutor::new()));
    let orchestrator = BuildOrchestrator::new(runner.clone(), toolchain.clone(), &cli.source_dir);
    let benchmarks = BenchmarkRunner::new(runner, toolchain, &cli.source_dir);

    request
        .execute(&orchestrator, &benchmarks)
        .await
        .context("sanirun failed")?;

    info!("All requested configurations passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanirun_core::BenchmarkMode;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sanirun").chain(args.iter().copied()))
            .expect("parse failed")
    }

    #[test]
    fn no_flags_is_plain_plan() {
        let request = RunRequest::from_selection(parse(&[]).selection());
        let plan = request.plan.expect("plan expected");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.configurations()[0].directory_name, "build");
        assert!(request.benchmarks.is_empty());
    }

    #[test]
    fn short_flags_select_both_sanitizers() {
        let request = RunRequest::from_selection(parse(&["-a", "-t"]).selection());
        let dirs: Vec<_> = request
            .plan
            .expect("plan expected")
            .iter()
            .map(|c| c.directory_name.clone())
            .collect();
        assert_eq!(dirs, ["asan_build", "tsan_build"]);
    }

    #[test]
    fn long_flags_parse() {
        let cli = parse(&["--asan", "--tsan", "--benchmark", "--benchmark-debug"]);
        let request = RunRequest::from_selection(cli.selection());
        assert_eq!(request.plan.map(|p| p.len()), Some(2));
        assert_eq!(
            request.benchmarks,
            vec![BenchmarkMode::Release, BenchmarkMode::DebugAsan]
        );
    }

    #[test]
    fn only_benchmark_has_no_plan() {
        let request = RunRequest::from_selection(parse(&["--only-benchmark"]).selection());
        assert!(request.plan.is_none());
        assert_eq!(request.benchmarks, vec![BenchmarkMode::Release]);
    }

    #[test]
    fn jobs_override_applies() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().to_str().unwrap();
        let toolchain = parse(&["--source-dir", source, "-j", "12"])
            .toolchain()
            .expect("toolchain");
        assert_eq!(toolchain.jobs, 12);
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().to_str().unwrap();
        assert!(parse(&["--source-dir", source, "--jobs", "0"])
            .toolchain()
            .is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(Cli::try_parse_from(["sanirun", "--msan"]).is_err());
    }
}
