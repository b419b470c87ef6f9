//! Tracing initialisation for the `sanirun` binary.
//!
//! Child process output never goes through tracing; it is streamed to stdout
//! verbatim by the executor. Tracing carries the orchestrator's own progress
//! lines (command lines, phase transitions, failures).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json`: emit flattened, newline-delimited JSON log lines instead of text.
/// * `level`: default verbosity when `RUST_LOG` is not set. Event targets are
///   only printed at `DEBUG` verbosity or above, where they help tell phases
///   apart.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let show_target = level >= Level::DEBUG;
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry
            .with(fmt::layer().json().flatten_event(true).with_target(show_target))
            .try_init()
    } else {
        registry
            .with(fmt::layer().without_time().with_target(show_target))
            .try_init()
    };
    installed.is_ok()
}
