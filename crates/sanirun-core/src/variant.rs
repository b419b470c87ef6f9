//! Build variants, build types and the directory-name selector.

use std::fmt;

/// Compiler flag that enables AddressSanitizer.
pub const ASAN_FLAG: &str = "-fsanitize=address";

/// Compiler flag that enables ThreadSanitizer.
pub const TSAN_FLAG: &str = "-fsanitize=thread";

/// Map a compiler flag string to its canonical build directory name.
///
/// Any non-empty flag other than [`ASAN_FLAG`] lands in `tsan_build`,
/// including misspelled or unrelated flags.
pub fn build_dir_name(compiler_flags: &str) -> &'static str {
    if compiler_flags.is_empty() {
        "build"
    } else if compiler_flags == ASAN_FLAG {
        "asan_build"
    } else {
        "tsan_build"
    }
}

/// One sanitizer configuration of the library under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildVariant {
    /// No instrumentation.
    Plain,

    /// `-fsanitize=address`
    AddressSanitized,

    /// `-fsanitize=thread`
    ThreadSanitized,
}

impl BuildVariant {
    /// Compiler flags passed as `CMAKE_CXX_FLAGS`.
    pub fn compiler_flags(&self) -> &'static str {
        match self {
            BuildVariant::Plain => "",
            BuildVariant::AddressSanitized => ASAN_FLAG,
            BuildVariant::ThreadSanitized => TSAN_FLAG,
        }
    }

    /// Build directory for this variant, relative to the source root.
    pub fn directory_name(&self) -> &'static str {
        build_dir_name(self.compiler_flags())
    }
}

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved out-of-tree build: what to configure and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub build_type: BuildType,
    pub compiler_flags: String,
    pub directory_name: String,
}

impl BuildConfiguration {
    /// Derive the configuration for a variant.
    pub fn new(variant: BuildVariant, build_type: BuildType) -> Self {
        Self {
            build_type,
            compiler_flags: variant.compiler_flags().to_string(),
            directory_name: variant.directory_name().to_string(),
        }
    }
}
