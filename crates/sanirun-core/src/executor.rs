//! External process execution with combined, teed output capture.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Result, RunError};

/// A structured command: program, arguments and working directory.
///
/// Commands are never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Whether this command runs the given program (compared by path).
    pub fn runs(&self, program: impl AsRef<Path>) -> bool {
        self.program == program.as_ref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Raw result of running a process to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal.
    pub exit_code: Option<i32>,

    /// Whether the process exited with status zero.
    pub success: bool,

    /// Combined stdout + stderr in arrival order.
    pub captured_text: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ProcessOutput {
    /// Output of a process that exited normally with `exit_code`.
    pub fn exited(exit_code: i32, captured_text: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            success: exit_code == 0,
            captured_text: captured_text.into(),
            duration_ms: 0,
        }
    }
}

/// Runs one command to completion and returns what it printed.
///
/// Implementations report spawn and capture problems as errors; a nonzero
/// exit is a normal `ProcessOutput` and is judged by the caller.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &CommandSpec) -> Result<ProcessOutput>;
}

/// Executor backed by real child processes.
///
/// Stdout and stderr are merged line by line and written both to the console
/// (as they arrive) and to a temporary file scoped to the invocation. The
/// captured text is read back from that file once the process exits.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    echo: bool,
}

impl ProcessExecutor {
    /// Executor that streams child output to stdout.
    pub fn new() -> Self {
        Self { echo: true }
    }

    /// Executor that only captures, without echoing to the console.
    pub fn quiet() -> Self {
        Self { echo: false }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        let start = Instant::now();

        // Dropped (and removed) on every return path.
        let capture_dir = tempfile::tempdir()?;
        let capture_path = capture_dir.path().join("output");
        let mut capture = File::create(&capture_path).await?;

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward_lines(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward_lines(stderr, tx.clone())));
        }
        drop(tx);

        let mut console = tokio::io::stdout();
        while let Some(chunk) = rx.recv().await {
            if self.echo {
                console.write_all(&chunk).await?;
                console.flush().await?;
            }
            capture.write_all(&chunk).await?;
        }
        capture.flush().await?;
        drop(capture);

        for reader in readers {
            reader.await.map_err(std::io::Error::other)??;
        }

        let status = child.wait().await?;
        let bytes = tokio::fs::read(&capture_path).await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        debug!(
            command = %command,
            exit_code = ?status.code(),
            captured_bytes = bytes.len(),
            "process exited"
        );

        Ok(ProcessOutput {
            exit_code: status.code(),
            success: status.success(),
            captured_text: String::from_utf8_lossy(&bytes).into_owned(),
            duration_ms,
        })
    }
}

/// Forward a stream to `tx` one line at a time until EOF.
async fn forward_lines<R>(stream: R, tx: mpsc::Sender<Vec<u8>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(());
        }
        if tx.send(line).await.is_err() {
            return Ok(());
        }
    }
}
