//! 日志初始化
//!
//! 使用 `tracing-subscriber` 的 fmt 输出，`RUST_LOG` 环境变量优先于配置的级别。

use crate::config::LoggingConfig;
use crate::error::{ExportError, ExportResult};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()))
}

/// 初始化日志系统
///
/// 文件输出优先于控制台输出；两者都关闭时不安装订阅器。
/// 已经安装过全局订阅器时静默忽略。
pub fn init_logging(config: &LoggingConfig) -> ExportResult<()> {
    if config.log_to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file_path)
            .map_err(|e| ExportError::io(&config.log_file_path, e))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(config))
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if config.log_to_console {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(config))
            .with_writer(std::io::stderr)
            .try_init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_is_harmless() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_unwritable_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_to_file: true,
            log_file_path: dir
                .path()
                .join("missing")
                .join("export.log")
                .to_string_lossy()
                .into_owned(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(ExportError::Io { .. })));
    }
}
