//! 导出配置系统
//!
//! 提供TOML/JSON配置文件和环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod frames;

pub use frames::FrameSelection;
pub use profile_export_core::{HierarchyColumn, HierarchyViewOptions};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 导出主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// 录制文件路径
    pub capture_path: PathBuf,

    /// CSV输出目录
    pub output_dir: PathBuf,

    /// 帧区间
    #[serde(default)]
    pub frames: FrameSelection,

    /// 层级视图排序
    #[serde(default)]
    pub hierarchy: HierarchyViewOptions,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

use profile_export_core::impl_default;

impl_default!(ExportConfig {
    capture_path: PathBuf::from("data.capture.json"),
    output_dir: PathBuf::from("."),
    frames: FrameSelection::default(),
    hierarchy: HierarchyViewOptions::default(),
    logging: LoggingConfig::default(),
});

/// 配置文件查找顺序中的文件名
const CONFIG_TOML: &str = "profile_export.toml";
const CONFIG_JSON: &str = "profile_export.json";

impl ExportConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PROFILE_EXPORT_CAPTURE") {
            self.capture_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("PROFILE_EXPORT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("PROFILE_EXPORT_FIRST_FRAME") {
            if let Ok(frame) = val.parse() {
                self.frames.first_frame = Some(frame);
            }
        }
        if let Some(val) = lookup("PROFILE_EXPORT_LAST_FRAME") {
            if let Ok(frame) = val.parse() {
                self.frames.last_frame = Some(frame);
            }
        }
        if let Some(val) = lookup("PROFILE_EXPORT_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.capture_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "capture_path must not be empty".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output_dir must not be empty".to_string(),
            ));
        }
        self.frames.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// 查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./profile_export.toml
    /// 2. ./profile_export.json
    /// 3. <用户配置目录>/profile_export/config.toml
    /// 4. 使用默认配置
    ///
    /// 返回配置及其来源文件，存在但无法解析的文件会返回错误。
    pub fn load_or_default() -> ConfigResult<(Self, Option<PathBuf>)> {
        let toml_path = PathBuf::from(CONFIG_TOML);
        if toml_path.is_file() {
            return Ok((Self::from_toml_file(&toml_path)?, Some(toml_path)));
        }

        let json_path = PathBuf::from(CONFIG_JSON);
        if json_path.is_file() {
            return Ok((Self::from_json_file(&json_path)?, Some(json_path)));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("profile_export").join("config.toml");
            if user_path.is_file() {
                return Ok((Self::from_toml_file(&user_path)?, Some(user_path)));
            }
        }

        Ok((Self::default(), None))
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 优先
    pub level: LogLevel,

    /// 是否输出到文件
    pub log_to_file: bool,

    /// 日志文件路径
    pub log_file_path: String,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_file: false,
    log_file_path: "profile_export.log".to_string(),
    log_to_console: true,
});

impl LoggingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.log_to_file && self.log_file_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "log_file_path required when log_to_file is set".to_string(),
            ));
        }
        Ok(())
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 解析不区分大小写的级别名
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// 对应的 `EnvFilter` 指令
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hierarchy.sort_column, HierarchyColumn::GcMemory);
        assert!(!config.hierarchy.sort_ascending);
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = ExportConfig::default();
        config.frames.first_frame = Some(10);
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: ExportConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_json_serialization() {
        let config = ExportConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed = ExportConfig::from_json_str(&json_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_minimal_toml() {
        let config = ExportConfig::from_toml_str(
            r#"
            capture_path = "captures/run1.json"
            output_dir = "out"

            [hierarchy]
            sort_column = "total_time"
            sort_ascending = true
            "#,
        )
        .unwrap();
        assert_eq!(config.capture_path, PathBuf::from("captures/run1.json"));
        assert_eq!(config.hierarchy.sort_column, HierarchyColumn::TotalTime);
        assert_eq!(config.frames, FrameSelection::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PROFILE_EXPORT_OUTPUT_DIR", "csv"),
            ("PROFILE_EXPORT_FIRST_FRAME", "12"),
            ("PROFILE_EXPORT_LAST_FRAME", "not-a-number"),
            ("PROFILE_EXPORT_LOG_LEVEL", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = ExportConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.output_dir, PathBuf::from("csv"));
        assert_eq!(config.frames.first_frame, Some(12));
        assert_eq!(config.frames.last_frame, None);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.capture_path, PathBuf::from("data.capture.json"));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ExportConfig::default();
        config.capture_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = ExportConfig::default();
        config.logging.log_to_file = true;
        config.logging.log_file_path.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile_export.toml");
        let mut config = ExportConfig::default();
        config.output_dir = PathBuf::from("exports");
        config.save_toml(&path).unwrap();
        assert_eq!(ExportConfig::from_toml_file(&path).unwrap(), config);
    }
}
