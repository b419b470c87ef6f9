//! Build-system contract: which programs to call and where the test
//! binaries end up.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::executor::CommandSpec;
use crate::variant::BuildType;

/// Default config file looked up in the source directory.
pub const CONFIG_FILE_NAME: &str = "sanirun.toml";

/// External programs and artifact paths used by every build flow.
///
/// Loaded from TOML; missing keys fall back to the CMake/make defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Toolchain {
    /// Configure step program (`cmake`).
    pub configure_program: String,

    /// Compile step program (`make`).
    pub compile_program: String,

    /// Parallel jobs handed to the compile step.
    pub jobs: u32,

    /// Unit-test binary, relative to a build directory.
    pub unit_test_path: PathBuf,

    /// Benchmark binary, relative to the benchmark build directory.
    pub benchmark_path: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            configure_program: "cmake".to_string(),
            compile_program: "make".to_string(),
            jobs: 4,
            unit_test_path: PathBuf::from("unit_tests/hash_table_test"),
            benchmark_path: PathBuf::from("benchmark_tests/hash_table_benchmark"),
        }
    }
}

impl Toolchain {
    /// Load a toolchain from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let toolchain: Toolchain = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        toolchain.validate()?;
        debug!(path = %path.display(), ?toolchain, "loaded toolchain config");
        Ok(toolchain)
    }

    /// Load `explicit` if given, else `<source_dir>/sanirun.toml` if it
    /// exists, else the defaults.
    pub fn discover(explicit: Option<&Path>, source_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = source_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Override the compile job count.
    pub fn with_jobs(mut self, jobs: u32) -> Result<Self, ConfigError> {
        self.jobs = jobs;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::InvalidJobs);
        }
        Ok(())
    }

    /// `cmake -DCMAKE_BUILD_TYPE=<type> -DCMAKE_CXX_FLAGS=<flags> ..`
    pub fn configure_command(
        &self,
        build_type: BuildType,
        compiler_flags: &str,
        build_dir: &Path,
    ) -> CommandSpec {
        CommandSpec::new(&self.configure_program, build_dir).args([
            format!("-DCMAKE_BUILD_TYPE={build_type}"),
            format!("-DCMAKE_CXX_FLAGS={compiler_flags}"),
            "..".to_string(),
        ])
    }

    /// `make -j<jobs>`
    pub fn compile_command(&self, build_dir: &Path) -> CommandSpec {
        CommandSpec::new(&self.compile_program, build_dir).arg(format!("-j{}", self.jobs))
    }

    pub fn unit_test_command(&self, build_dir: &Path) -> CommandSpec {
        CommandSpec::new(build_dir.join(&self.unit_test_path), build_dir)
    }

    pub fn benchmark_command(&self, build_dir: &Path) -> CommandSpec {
        CommandSpec::new(build_dir.join(&self.benchmark_path), build_dir)
    }
}
