use super::{ConfigError, ConfigResult};
use profile_export_core::FrameRange;
use serde::{Deserialize, Serialize};

/// 导出帧区间选择
///
/// 未设置的一端取数据源的边界。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameSelection {
    /// 起始帧（含）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_frame: Option<u32>,

    /// 结束帧（不含）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_frame: Option<u32>,
}

impl FrameSelection {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if let (Some(first), Some(last)) = (self.first_frame, self.last_frame) {
            if first > last {
                return Err(ConfigError::ValidationError(format!(
                    "first_frame {} is after last_frame {}",
                    first, last
                )));
            }
        }
        Ok(())
    }

    /// 结合数据源区间得到实际导出区间，越界检查交给导出流程
    pub fn resolve(&self, available: FrameRange) -> FrameRange {
        FrameRange::new(
            self.first_frame.unwrap_or(available.first),
            self.last_frame.unwrap_or(available.last),
        )
    }
}
