//! Diagnostic logging setup.
//!
//! Suites call one of the init functions once at startup; repeated calls
//! are tolerated so test binaries can initialize from multiple entry
//! points.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize console logging with the given filter directives.
///
/// A second call is a no-op.
pub fn init(directives: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives))
        .with_target(false)
        .try_init();
}

/// Initialize logging to `<directory>/<name>.log` in addition to the
/// console.
///
/// Returns the appender guard; hold it for the life of the run or buffered
/// log lines are lost.
pub fn init_with_file(directory: impl AsRef<Path>, name: &str, directives: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(directory, format!("{name}.log"));
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives))
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("debug");
        init("info");
    }

    #[test]
    fn test_bad_directives_fall_back_to_info() {
        // Must not panic
        init("not==a==filter");
    }
}
