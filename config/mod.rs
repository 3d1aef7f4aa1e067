use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rtree::{MAX_ENTRIES, MIN_ENTRIES};

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 索引配置总入口
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanarIndexConfig {
    /// R-tree 配置
    #[serde(default)]
    pub index: IndexConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// R-tree 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// 每个节点的最大条目数
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// 每个节点的最小条目数（不强制）
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别：trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 日志输出：stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志文件路径（当 output = file 时）
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// 默认值函数
// ============================================================================

fn default_max_entries() -> usize {
    MAX_ENTRIES
}

fn default_min_entries() -> usize {
    MIN_ENTRIES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

// ============================================================================
// 实现
// ============================================================================

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            min_entries: default_min_entries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: default_log_output(),
            log_file: None,
        }
    }
}

impl IndexConfig {
    /// 验证节点容量
    ///
    /// 最大条目数至少为2，分裂后的两个节点才都不为空且新根节点不会溢出；
    /// 最小条目数在 1 到 最大条目数/2 之间
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries < 2 {
            return Err(ConfigError::Invalid(format!(
                "max_entries must be at least 2, got {}",
                self.max_entries
            )));
        }

        if self.min_entries < 1 || self.min_entries > self.max_entries / 2 {
            return Err(ConfigError::Invalid(format!(
                "min_entries must be between 1 and {}, got {}",
                self.max_entries / 2,
                self.min_entries
            )));
        }

        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.level
                )))
            }
        }

        match self.output.as_str() {
            "stdout" => {}
            "file" if self.log_file.is_none() => {
                return Err(ConfigError::Invalid(
                    "Log output is 'file' but log_file path is not specified".to_string(),
                ))
            }
            "file" => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Invalid log output: '{}'. Must be one of: stdout, file",
                    self.output
                )))
            }
        }

        Ok(())
    }
}

impl PlanarIndexConfig {
    /// 从文件加载配置
    ///
    /// 配置加载顺序（优先级从低到高）：
    /// 1. 默认配置（内嵌的 default.toml）
    /// 2. 用户配置文件（可选）
    /// 3. 环境变量（PLANAR_INDEX__ 前缀，使用双下划线分隔嵌套）
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use planar_index::config::PlanarIndexConfig;
    ///
    /// // 加载配置（如果文件不存在，使用默认配置）
    /// let config = PlanarIndexConfig::from_file("planar_index.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("PLANAR_INDEX").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index.validate()?;
        self.logging.validate()
    }
}
