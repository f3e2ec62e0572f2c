// ============================================================================
// cocolabel-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and File Logging for the CLI
//
// Exactly one logger is installed per run. With `--log-dir` all records go to
// a per-run log file through cocolabel-core's log4rs setup; otherwise they are
// written to stderr by env_logger.

use crate::error::CliResult;
use cocolabel_core::CoreError;
use cocolabel_core::file_logging::{run_log_path, setup_file_logging};
use console::style;
use log::LevelFilter;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns the log level for the verbosity flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the console logger on stderr.
pub fn init_console(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => style("ERROR").red().for_stderr(),
                log::Level::Warn => style("WARN ").yellow().for_stderr(),
                log::Level::Info => style("INFO ").green().for_stderr(),
                log::Level::Debug => style("DEBUG").blue().for_stderr(),
                log::Level::Trace => style("TRACE").magenta().for_stderr(),
            };
            writeln!(buf, "{} {} {}", buf.timestamp(), level, record.args())
        })
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Installs the file logger for `command` below `log_dir` and returns the file path.
pub fn init_file(log_dir: &Path, command: &str, level: LevelFilter) -> CliResult<PathBuf> {
    let path = run_log_path(log_dir, command);
    setup_file_logging(&path, level).map_err(|e| {
        CoreError::OperationFailed(format!(
            "Failed to set up logging in '{}': {e}",
            log_dir.display()
        ))
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_the_level() {
        assert_eq!(level_for(false), LevelFilter::Info);
        assert_eq!(level_for(true), LevelFilter::Debug);
    }
}
