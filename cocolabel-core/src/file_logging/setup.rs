use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::{Path, PathBuf};
use anyhow::Result;

/// Routes all log records at `log_level` and above to `log_file`.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    // Create log directory if it doesn't exist
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}"
        )))
        .build(log_file)?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;

    Ok(())
}

/// Log file path for one run of `command`: `cocolabel_<command>_run_<timestamp>.log`.
pub fn run_log_path(log_dir: &Path, command: &str) -> PathBuf {
    log_dir.join(format!(
        "cocolabel_{}_run_{}.log",
        command,
        crate::util::get_timestamp()
    ))
}
