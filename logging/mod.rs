use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::LoggingConfig;

/// 日志初始化错误
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Log output is 'file' but log_file path is not specified")]
    MissingLogFile,
    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// 解析日志级别，无法识别时使用 INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// 初始化日志系统
///
/// 安装全局的 tracing 订阅者，输出到标准输出或日志文件。
/// 每个进程只能成功调用一次
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = LevelFilter::from_level(parse_level(&config.level));

    match config.output.as_str() {
        "file" => {
            let log_file = config.log_file.as_ref().ok_or(LoggingError::MissingLogFile)?;

            // 确保日志目录存在
            if let Some(parent) = log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(filter)
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(filter)
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_file_output_requires_path() {
        let config = LoggingConfig {
            level: "info".to_string(),
            output: "file".to_string(),
            log_file: None,
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::MissingLogFile)
        ));
    }

    #[test]
    fn test_unwritable_log_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        // 目录本身不能作为日志文件打开
        let config = LoggingConfig {
            level: "info".to_string(),
            output: "file".to_string(),
            log_file: Some(PathBuf::from(temp_dir.path())),
        };
        assert!(matches!(init_logging(&config), Err(LoggingError::Io(_))));
    }
}
