//! 帧数据展平错误处理
//!
//! 提取器、层级遍历器和表格序列化器共用的错误类型

use thiserror::Error;

/// 展平过程错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    /// 帧索引超出数据源的有效范围
    #[error("Frame {frame} out of range [{first}, {last})")]
    FrameOutOfRange { frame: u32, first: u32, last: u32 },

    /// 请求的帧区间不在数据源范围内
    #[error("Frame range [{first}, {last}) outside source range [{source_first}, {source_last})")]
    RangeOutOfBounds {
        first: u32,
        last: u32,
        source_first: u32,
        source_last: u32,
    },

    /// 未知的统计类别
    #[error("Unknown profiler category: {0}")]
    UnknownCategory(String),

    /// 数据源未加载或当前帧没有数据
    #[error("Profiling data source unavailable: {0}")]
    SourceUnavailable(String),

    /// 行与表结构不匹配
    #[error("Row {row} of {table} has {actual} fields, expected {expected}")]
    SerializationFailure {
        table: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// 录制文件格式错误
    #[error("Invalid capture: {0}")]
    InvalidCapture(String),
}

impl FlattenError {
    /// 是否属于越界类错误（帧索引、帧区间或类别）
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            FlattenError::FrameOutOfRange { .. }
                | FlattenError::RangeOutOfBounds { .. }
                | FlattenError::UnknownCategory(_)
        )
    }
}

/// 展平结果类型
pub type FlattenResult<T> = Result<T, FlattenError>;
