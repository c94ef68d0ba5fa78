use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter(verbose: u8, quiet: u8) -> anyhow::Result<EnvFilter> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("remindust={default_level},warn")))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))
}

/// Logs to stderr; used by every mode that does not own the screen.
pub fn init_stderr(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

/// Directory for the TUI's daily log files.
pub fn log_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("remindust");
    p.push("logs");
    p
}

/// Logs to a daily rolling file so the TUI owns the terminal.
///
/// Keep the returned guard alive for the whole run or buffered lines are lost.
pub fn init_file(verbose: u8, quiet: u8) -> anyhow::Result<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(log_dir(), "remindust.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet)?)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(guard)
}
