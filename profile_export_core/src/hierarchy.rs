//! 调用树遍历
//!
//! 对每个有子节点的后代（分支节点），输出其所有直接子节点。
//! 没有位于任何分支节点之下的顶层叶子节点不会被输出，
//! 导出工具一直按这个规则展平，这里保持不变。

use crate::error::FlattenResult;
use crate::source::{
    HierarchyColumn, HierarchyViewGuard, HierarchyViewOptions, ItemId, ProfilingDataSource,
};
use serde::{Deserialize, Serialize};

/// 单帧的帧级数据
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchySummary {
    /// 数据自身记录的帧号
    pub frame_index: u32,
    pub frame_fps: f32,
    pub frame_time_ms: f32,
    pub frame_gpu_time_ms: f32,
}

/// 调用树节点记录
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub item_name: String,
    pub item_path: String,
    pub column_name: String,
    pub column_object_name: String,
    pub column_calls: u32,
    pub column_gc_memory: f32,
    pub column_self_time: f32,
    /// 引擎格式化的百分比文本，原样保留
    pub column_self_percent: String,
    pub column_total_time: f32,
    pub column_total_percent: String,
}

/// 单帧遍历结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HierarchyFrame {
    pub summary: HierarchySummary,
    pub nodes: Vec<HierarchyNode>,
}

/// 遍历时复用的缓冲区
///
/// 只用于避免重复分配，每次遍历开始时清空。
#[derive(Debug, Default)]
pub struct WalkScratch {
    branches: Vec<ItemId>,
    children: Vec<ItemId>,
}

impl WalkScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.branches.clear();
        self.children.clear();
    }
}

/// 遍历单帧调用树
///
/// 层级视图在本函数内打开，任何返回路径上都会释放。
pub fn walk<S>(
    source: &S,
    frame: u32,
    options: &HierarchyViewOptions,
    scratch: &mut WalkScratch,
) -> FlattenResult<HierarchyFrame>
where
    S: ProfilingDataSource + ?Sized,
{
    source.frame_range()?.check(frame)?;
    scratch.clear();

    let view = HierarchyViewGuard::open(source, frame, options)?;
    let summary = HierarchySummary {
        frame_index: view.frame_index(),
        frame_fps: view.frame_fps(),
        frame_time_ms: view.frame_time_ms(),
        frame_gpu_time_ms: view.frame_gpu_time_ms(),
    };

    let root = view.root_item_id();
    view.descendants_with_children(root, &mut scratch.branches);

    let mut nodes = Vec::new();
    for &branch in &scratch.branches {
        view.children(branch, &mut scratch.children);
        for &child in &scratch.children {
            nodes.push(HierarchyNode {
                item_name: view.item_name(child),
                item_path: view.item_path(child),
                column_name: view.column_text(child, HierarchyColumn::Name),
                column_object_name: view.column_text(child, HierarchyColumn::ObjectName),
                // 截断为整数
                column_calls: view.column_value(child, HierarchyColumn::Calls) as u32,
                column_gc_memory: view.column_value(child, HierarchyColumn::GcMemory),
                column_self_time: view.column_value(child, HierarchyColumn::SelfTime),
                column_self_percent: view.column_text(child, HierarchyColumn::SelfPercent),
                column_total_time: view.column_value(child, HierarchyColumn::TotalTime),
                column_total_percent: view.column_text(child, HierarchyColumn::TotalPercent),
            });
        }
    }

    tracing::debug!(
        target: "profile_export",
        frame,
        branches = scratch.branches.len(),
        nodes = nodes.len(),
        "Walked hierarchy"
    );

    Ok(HierarchyFrame { summary, nodes })
}
