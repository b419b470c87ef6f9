//! Execution plan: the ordered list of build configurations to run.

use crate::variant::{BuildConfiguration, BuildType, BuildVariant};

/// Ordered, immutable list of configurations for one invocation.
///
/// Order follows the order variants were requested. An empty request
/// yields the plain configuration alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    configurations: Vec<BuildConfiguration>,
}

impl ExecutionPlan {
    /// Build a plan from requested variants. Repeated variants keep their
    /// first position.
    pub fn new(variants: impl IntoIterator<Item = BuildVariant>, build_type: BuildType) -> Self {
        let mut seen = Vec::new();
        for variant in variants {
            if !seen.contains(&variant) {
                seen.push(variant);
            }
        }
        if seen.is_empty() {
            seen.push(BuildVariant::Plain);
        }

        Self {
            configurations: seen
                .into_iter()
                .map(|v| BuildConfiguration::new(v, build_type))
                .collect(),
        }
    }

    /// Debug plan from the sanitizer switches, asan before tsan.
    pub fn from_sanitizers(asan: bool, tsan: bool) -> Self {
        let mut variants = Vec::new();
        if asan {
            variants.push(BuildVariant::AddressSanitized);
        }
        if tsan {
            variants.push(BuildVariant::ThreadSanitized);
        }
        Self::new(variants, BuildType::Debug)
    }

    pub fn configurations(&self) -> &[BuildConfiguration] {
        &self.configurations
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildConfiguration> {
        self.configurations.iter()
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}
