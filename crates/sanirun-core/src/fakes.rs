//! In-memory fakes for the executor trait (testing only)
//!
//! `ScriptedExecutor` records every command it is asked to run and answers
//! from a list of scripted responses, so orchestration can be tested without
//! a compiler toolchain.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::{CommandExecutor, CommandSpec, ProcessOutput};

type Matcher = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

/// Executor that never spawns anything.
///
/// Commands with no matching rule succeed with empty output. When several
/// rules match, the first one registered wins.
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: Mutex<Vec<(Matcher, ProcessOutput)>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands matching `matcher` with `output`.
    pub fn respond_when<F>(&self, matcher: F, output: ProcessOutput)
    where
        F: Fn(&CommandSpec) -> bool + Send + Sync + 'static,
    {
        self.rules.lock().unwrap().push((Box::new(matcher), output));
    }

    /// Every command executed so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands executed so far that ran `program`.
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.runs(program))
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        self.calls.lock().unwrap().push(command.clone());

        let rules = self.rules.lock().unwrap();
        let output = rules
            .iter()
            .find(|(matcher, _)| matcher(command))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| ProcessOutput::exited(0, ""));
        Ok(output)
    }
}
