//! 导出工具错误处理
//!
//! - **展平错误** (`profile_export_core::FlattenError`): 帧越界、数据源不可用、表结构不匹配
//! - **配置错误** (`config::ConfigError`): 配置文件读取、解析和验证
//! - **IO错误**: 读取录制文件、写入CSV文件

use crate::config::ConfigError;
use profile_export_core::FlattenError;
use std::path::PathBuf;
use thiserror::Error;

/// 导出工具错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Flatten error: {0}")]
    Flatten(#[from] FlattenError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
