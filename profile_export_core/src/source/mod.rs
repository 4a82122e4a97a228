//! 性能数据源抽象
//!
//! 展平逻辑只通过这里的 trait 访问引擎的性能数据：
//! - [`ProfilingDataSource`]: 帧范围、按类别的统计值、层级视图
//! - [`HierarchyView`]: 单帧调用树的只读视图
//!
//! 层级视图是有作用域的资源，通过 [`HierarchyViewGuard`] 打开，
//! 离开作用域时自动释放。

use crate::category::Category;
use crate::error::{FlattenError, FlattenResult};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

pub mod recorded;

pub use recorded::{
    RecordedCapture, RecordedFrame, RecordedHierarchy, RecordedItem, RecordedStatistics,
};

/// 帧区间 `[first, last)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRange {
    pub first: u32,
    pub last: u32,
}

impl FrameRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        self.last.saturating_sub(self.first) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.last <= self.first
    }

    pub fn contains(&self, frame: u32) -> bool {
        frame >= self.first && frame < self.last
    }

    /// 检查帧索引是否有效
    pub fn check(&self, frame: u32) -> FlattenResult<()> {
        if self.contains(frame) {
            Ok(())
        } else {
            Err(FlattenError::FrameOutOfRange {
                frame,
                first: self.first,
                last: self.last,
            })
        }
    }

    /// 检查子区间是否落在本区间内
    pub fn check_subrange(&self, range: FrameRange) -> FlattenResult<()> {
        let inside =
            range.first <= range.last && range.first >= self.first && range.last <= self.last;
        if inside {
            Ok(())
        } else {
            Err(FlattenError::RangeOutOfBounds {
                first: range.first,
                last: range.last,
                source_first: self.first,
                source_last: self.last,
            })
        }
    }

    pub fn iter(&self) -> std::ops::Range<u32> {
        self.first..self.last
    }
}

/// 调用树节点标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

/// 层级视图的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyColumn {
    Name,
    ObjectName,
    Calls,
    GcMemory,
    SelfTime,
    SelfPercent,
    TotalTime,
    TotalPercent,
}

/// 打开层级视图时的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyViewOptions {
    /// 子节点排序列
    pub sort_column: HierarchyColumn,
    /// 是否升序
    pub sort_ascending: bool,
}

crate::impl_default!(HierarchyViewOptions {
    sort_column: HierarchyColumn::GcMemory,
    sort_ascending: false,
});

/// 性能数据源
///
/// 由宿主（引擎编辑器或录制文件）实现。展平逻辑从不自行采集或加载数据。
pub trait ProfilingDataSource {
    /// 已加载数据的有效帧区间；未加载时返回 `SourceUnavailable`
    fn frame_range(&self) -> FlattenResult<FrameRange>;

    /// 某类别下可用的统计名
    fn statistic_names(&self, category: Category) -> FlattenResult<Vec<String>>;

    /// 单帧统计值
    fn statistic_value(&self, category: Category, statistic: &str, frame: u32)
        -> FlattenResult<f32>;

    /// 引擎格式化后的统计值，仅用于日志
    fn formatted_statistic(
        &self,
        category: Category,
        statistic: &str,
        frame: u32,
    ) -> FlattenResult<String> {
        self.statistic_value(category, statistic, frame)
            .map(|value| value.to_string())
    }

    /// 打开单帧层级视图
    fn open_hierarchy(
        &self,
        frame: u32,
        options: &HierarchyViewOptions,
    ) -> FlattenResult<Box<dyn HierarchyView + '_>>;
}

/// 单帧调用树视图
///
/// 输出参数形式的方法会先清空 `out` 再写入。
pub trait HierarchyView {
    /// 数据自身记录的帧号（丢帧时可能与循环索引不同）
    fn frame_index(&self) -> u32;
    fn frame_fps(&self) -> f32;
    fn frame_time_ms(&self) -> f32;
    fn frame_gpu_time_ms(&self) -> f32;

    /// 合成根节点
    fn root_item_id(&self) -> ItemId;

    /// `id` 之下（不含自身）所有有子节点的后代，按遍历顺序
    fn descendants_with_children(&self, id: ItemId, out: &mut Vec<ItemId>);

    /// 直接子节点，按视图排序
    fn children(&self, id: ItemId, out: &mut Vec<ItemId>);

    fn item_name(&self, id: ItemId) -> String;

    /// 从根开始的斜杠分隔路径
    fn item_path(&self, id: ItemId) -> String;

    /// 列的文本表示
    fn column_text(&self, id: ItemId, column: HierarchyColumn) -> String;

    /// 列的数值表示，文本列为 0
    fn column_value(&self, id: ItemId, column: HierarchyColumn) -> f32;

    /// 释放视图持有的资源
    fn release(&mut self) {}
}

/// 层级视图守卫 - 使用RAII在作用域结束时释放视图
pub struct HierarchyViewGuard<'a> {
    view: Box<dyn HierarchyView + 'a>,
}

impl<'a> HierarchyViewGuard<'a> {
    pub fn open<S>(source: &'a S, frame: u32, options: &HierarchyViewOptions) -> FlattenResult<Self>
    where
        S: ProfilingDataSource + ?Sized,
    {
        let view = source.open_hierarchy(frame, options)?;
        Ok(Self { view })
    }
}

impl<'a> Deref for HierarchyViewGuard<'a> {
    type Target = dyn HierarchyView + 'a;

    fn deref(&self) -> &Self::Target {
        self.view.as_ref()
    }
}

impl<'a> DerefMut for HierarchyViewGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.view.as_mut()
    }
}

impl<'a> Drop for HierarchyViewGuard<'a> {
    fn drop(&mut self) {
        self.view.release();
    }
}
