use crate::Result;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, opt_format};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logger settings. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log to rotating files in this directory; stderr when absent.
    pub directory: Option<PathBuf>,
    pub rotate_size_bytes: u64,
    pub keep_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            rotate_size_bytes: 10 * 1024 * 1024,
            keep_log_files: 1,
        }
    }
}

/// Starts the global logger. Keep the returned handle alive for as long as
/// logs should be written.
pub fn setup_logging(config: &LoggingConfig) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(&config.level)?.format(opt_format);

    let logger = match &config.directory {
        Some(directory) => logger
            .log_to_file(FileSpec::default().directory(directory).basename(crate::NAME))
            .rotate(
                Criterion::Size(config.rotate_size_bytes),
                Naming::Numbers,
                Cleanup::KeepLogFiles(config.keep_log_files),
            ),
        None => logger.log_to_stderr(),
    };

    Ok(logger.start()?)
}
