//! 录制文件数据源
//!
//! 宿主把一段帧区间的统计值和调用树导出为 JSON，
//! [`RecordedCapture`] 读取后即可离线执行导出。
//!
//! ```json
//! {
//!   "firstFrame": 5,
//!   "frames": [{
//!     "statistics": { "cpu": { "Scripts": 12.5 }, "memory": {}, "rendering": {} },
//!     "hierarchy": {
//!       "frameIndex": 5, "frameFps": 60.0, "frameTimeMs": 16.6, "frameGpuTimeMs": 4.2,
//!       "root": {
//!         "totalTime": 16.6,
//!         "children": [{ "name": "PlayerLoop", "totalTime": 16.0, "children": [] }]
//!       }
//!     }
//!   }]
//! }
//! ```
//!
//! 未知字段会被拒绝并报告为 `InvalidCapture`。

use super::{
    FrameRange, HierarchyColumn, HierarchyView, HierarchyViewOptions, ItemId, ProfilingDataSource,
};
use crate::category::Category;
use crate::error::{FlattenError, FlattenResult};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, OnceCell};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// 录制的性能数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordedCapture {
    /// 第一帧的帧号
    #[serde(default)]
    pub first_frame: u32,
    /// 从 `first_frame` 开始的连续帧
    #[serde(default)]
    frames: Vec<RecordedFrame>,
    #[serde(skip)]
    open_views: Cell<usize>,
    /// 各类别统计名的并集，首次查询时计算，帧变化时失效
    #[serde(skip)]
    name_cache: OnceCell<BTreeMap<Category, Vec<String>>>,
}

/// 单帧录制数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordedFrame {
    #[serde(default)]
    pub statistics: RecordedStatistics,
    #[serde(default)]
    pub hierarchy: Option<RecordedHierarchy>,
}

/// 各类别的统计值，键为引擎统计名
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedStatistics {
    #[serde(default)]
    pub cpu: BTreeMap<String, f32>,
    #[serde(default)]
    pub memory: BTreeMap<String, f32>,
    #[serde(default)]
    pub rendering: BTreeMap<String, f32>,
}

impl RecordedStatistics {
    pub fn category(&self, category: Category) -> &BTreeMap<String, f32> {
        match category {
            Category::Cpu => &self.cpu,
            Category::Memory => &self.memory,
            Category::Rendering => &self.rendering,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut BTreeMap<String, f32> {
        match category {
            Category::Cpu => &mut self.cpu,
            Category::Memory => &mut self.memory,
            Category::Rendering => &mut self.rendering,
        }
    }
}

/// 单帧调用树
///
/// `root` 是整帧的根节点，它的名称不参与路径，也不会被导出。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordedHierarchy {
    /// 数据自身的帧号，缺省时使用帧在录制中的位置
    #[serde(default)]
    pub frame_index: Option<u32>,
    #[serde(default)]
    pub frame_fps: f32,
    #[serde(default)]
    pub frame_time_ms: f32,
    #[serde(default)]
    pub frame_gpu_time_ms: f32,
    #[serde(default)]
    pub root: RecordedItem,
}

/// 调用树节点
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordedItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub object_name: String,
    #[serde(default = "default_calls")]
    pub calls: u32,
    #[serde(default)]
    pub gc_memory: f32,
    #[serde(default)]
    pub self_time: f32,
    #[serde(default)]
    pub total_time: f32,
    #[serde(default)]
    pub children: Vec<RecordedItem>,
}

fn default_calls() -> u32 {
    1
}

impl RecordedItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: 1,
            ..Self::default()
        }
    }

    /// 以 `children` 为顶层节点的根节点
    pub fn root(children: Vec<RecordedItem>) -> Self {
        Self {
            children,
            ..Self::new("")
        }
    }

    pub fn with_times(mut self, self_time: f32, total_time: f32) -> Self {
        self.self_time = self_time;
        self.total_time = total_time;
        self
    }

    pub fn with_calls(mut self, calls: u32) -> Self {
        self.calls = calls;
        self
    }

    pub fn with_gc_memory(mut self, gc_memory: f32) -> Self {
        self.gc_memory = gc_memory;
        self
    }

    pub fn with_child(mut self, child: RecordedItem) -> Self {
        self.children.push(child);
        self
    }

    fn sort_value(&self, column: HierarchyColumn) -> f32 {
        match column {
            HierarchyColumn::Calls => self.calls as f32,
            HierarchyColumn::GcMemory => self.gc_memory,
            HierarchyColumn::SelfTime | HierarchyColumn::SelfPercent => self.self_time,
            HierarchyColumn::TotalTime | HierarchyColumn::TotalPercent => self.total_time,
            HierarchyColumn::Name | HierarchyColumn::ObjectName => 0.0,
        }
    }
}

fn compare_items(a: &RecordedItem, b: &RecordedItem, column: HierarchyColumn) -> Ordering {
    match column {
        HierarchyColumn::Name => a.name.cmp(&b.name),
        HierarchyColumn::ObjectName => a.object_name.cmp(&b.object_name),
        _ => a.sort_value(column).total_cmp(&b.sort_value(column)),
    }
}

impl RecordedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statistic(mut self, category: Category, name: impl Into<String>, value: f32) -> Self {
        self.statistics.category_mut(category).insert(name.into(), value);
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: RecordedHierarchy) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }
}

impl RecordedCapture {
    pub fn new(first_frame: u32) -> Self {
        Self {
            first_frame,
            ..Self::default()
        }
    }

    pub fn push_frame(&mut self, frame: RecordedFrame) -> &mut Self {
        self.name_cache.take();
        self.frames.push(frame);
        self
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// 可修改的帧数据，统计名缓存随之失效
    pub fn frames_mut(&mut self) -> &mut [RecordedFrame] {
        self.name_cache.take();
        &mut self.frames
    }

    /// 从JSON字符串解析录制数据
    pub fn from_json_str(content: &str) -> FlattenResult<Self> {
        let capture: Self = serde_json::from_str(content)
            .map_err(|e| FlattenError::InvalidCapture(e.to_string()))?;
        capture.validate()?;
        Ok(capture)
    }

    /// 序列化为JSON字符串
    pub fn to_json_string(&self) -> FlattenResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FlattenError::InvalidCapture(e.to_string()))
    }

    /// 验证帧号不会溢出
    pub fn validate(&self) -> FlattenResult<()> {
        let len = u32::try_from(self.frames.len())
            .map_err(|_| FlattenError::InvalidCapture("too many frames".to_string()))?;
        if self.first_frame.checked_add(len).is_none() {
            return Err(FlattenError::InvalidCapture(format!(
                "{} frames starting at {} overflow the frame index",
                len, self.first_frame
            )));
        }
        Ok(())
    }

    /// 当前未释放的层级视图数量
    pub fn open_view_count(&self) -> usize {
        self.open_views.get()
    }

    fn frame(&self, frame: u32) -> FlattenResult<&RecordedFrame> {
        self.frame_range()?.check(frame)?;
        Ok(&self.frames[(frame - self.first_frame) as usize])
    }
}

impl ProfilingDataSource for RecordedCapture {
    fn frame_range(&self) -> FlattenResult<FrameRange> {
        let len = u32::try_from(self.frames.len())
            .map_err(|_| FlattenError::InvalidCapture("too many frames".to_string()))?;
        let last = self.first_frame.checked_add(len).ok_or_else(|| {
            FlattenError::InvalidCapture("frame index overflow".to_string())
        })?;
        Ok(FrameRange::new(self.first_frame, last))
    }

    fn statistic_names(&self, category: Category) -> FlattenResult<Vec<String>> {
        let names = self.name_cache.get_or_init(|| {
            Category::ALL
                .into_iter()
                .map(|category| {
                    let union: BTreeSet<&String> = self
                        .frames
                        .iter()
                        .flat_map(|frame| frame.statistics.category(category).keys())
                        .collect();
                    (category, union.into_iter().cloned().collect())
                })
                .collect()
        });
        Ok(names.get(&category).cloned().unwrap_or_default())
    }

    fn statistic_value(
        &self,
        category: Category,
        statistic: &str,
        frame: u32,
    ) -> FlattenResult<f32> {
        let recorded = self.frame(frame)?;
        Ok(recorded
            .statistics
            .category(category)
            .get(statistic)
            .copied()
            .unwrap_or(0.0))
    }

    fn open_hierarchy(
        &self,
        frame: u32,
        options: &HierarchyViewOptions,
    ) -> FlattenResult<Box<dyn HierarchyView + '_>> {
        let recorded = self.frame(frame)?;
        let hierarchy = recorded.hierarchy.as_ref().ok_or_else(|| {
            FlattenError::SourceUnavailable(format!("no hierarchy recorded for frame {}", frame))
        })?;

        let view = RecordedView::build(hierarchy, frame, options, &self.open_views);
        self.open_views.set(self.open_views.get() + 1);
        Ok(Box::new(view))
    }
}

#[derive(Debug)]
struct ViewItem {
    name: String,
    path: String,
    object_name: String,
    calls: u32,
    gc_memory: f32,
    self_time: f32,
    total_time: f32,
    children: Vec<ItemId>,
}

/// 录制数据的单帧视图，子节点在打开时按选项排好序
struct RecordedView<'a> {
    items: Vec<ViewItem>,
    frame_index: u32,
    frame_fps: f32,
    frame_time_ms: f32,
    frame_gpu_time_ms: f32,
    open_views: &'a Cell<usize>,
    released: bool,
}

const ROOT: ItemId = ItemId(0);

impl<'a> RecordedView<'a> {
    fn build(
        hierarchy: &RecordedHierarchy,
        frame: u32,
        options: &HierarchyViewOptions,
        open_views: &'a Cell<usize>,
    ) -> Self {
        let mut view = Self {
            items: Vec::new(),
            frame_index: hierarchy.frame_index.unwrap_or(frame),
            frame_fps: hierarchy.frame_fps,
            frame_time_ms: hierarchy.frame_time_ms,
            frame_gpu_time_ms: hierarchy.frame_gpu_time_ms,
            open_views,
            released: false,
        };

        view.push_item(&hierarchy.root, None, options);
        view
    }

    fn push_item(
        &mut self,
        item: &RecordedItem,
        parent_path: Option<&str>,
        options: &HierarchyViewOptions,
    ) -> ItemId {
        let path = match parent_path {
            None => String::new(),
            Some("") => item.name.clone(),
            Some(parent) => format!("{}/{}", parent, item.name),
        };
        let id = ItemId(self.items.len() as u32);
        self.items.push(ViewItem {
            name: item.name.clone(),
            path: path.clone(),
            object_name: item.object_name.clone(),
            calls: item.calls,
            gc_memory: item.gc_memory,
            self_time: item.self_time,
            total_time: item.total_time,
            children: Vec::new(),
        });

        let mut sorted: Vec<&RecordedItem> = item.children.iter().collect();
        sorted.sort_by(|a, b| {
            let ordering = compare_items(a, b, options.sort_column);
            if options.sort_ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let child_ids: Vec<ItemId> = sorted
            .into_iter()
            .map(|child| self.push_item(child, Some(&path), options))
            .collect();
        self.items[id.0 as usize].children = child_ids;
        id
    }

    fn item(&self, id: ItemId) -> Option<&ViewItem> {
        self.items.get(id.0 as usize)
    }

    fn percent(&self, value: f32) -> f32 {
        if self.frame_time_ms > 0.0 {
            value / self.frame_time_ms * 100.0
        } else {
            0.0
        }
    }
}

impl HierarchyView for RecordedView<'_> {
    fn frame_index(&self) -> u32 {
        self.frame_index
    }

    fn frame_fps(&self) -> f32 {
        self.frame_fps
    }

    fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    fn frame_gpu_time_ms(&self) -> f32 {
        self.frame_gpu_time_ms
    }

    fn root_item_id(&self) -> ItemId {
        ROOT
    }

    fn descendants_with_children(&self, id: ItemId, out: &mut Vec<ItemId>) {
        out.clear();
        let mut stack: Vec<ItemId> = match self.item(id) {
            Some(item) => item.children.iter().rev().copied().collect(),
            None => return,
        };
        while let Some(next) = stack.pop() {
            if let Some(item) = self.item(next) {
                if !item.children.is_empty() {
                    out.push(next);
                    stack.extend(item.children.iter().rev().copied());
                }
            }
        }
    }

    fn children(&self, id: ItemId, out: &mut Vec<ItemId>) {
        out.clear();
        if let Some(item) = self.item(id) {
            out.extend_from_slice(&item.children);
        }
    }

    fn item_name(&self, id: ItemId) -> String {
        self.item(id).map(|i| i.name.clone()).unwrap_or_default()
    }

    fn item_path(&self, id: ItemId) -> String {
        self.item(id).map(|i| i.path.clone()).unwrap_or_default()
    }

    fn column_text(&self, id: ItemId, column: HierarchyColumn) -> String {
        let Some(item) = self.item(id) else {
            return String::new();
        };
        match column {
            HierarchyColumn::Name => item.name.clone(),
            HierarchyColumn::ObjectName => item.object_name.clone(),
            HierarchyColumn::Calls => item.calls.to_string(),
            HierarchyColumn::GcMemory => item.gc_memory.to_string(),
            HierarchyColumn::SelfTime => item.self_time.to_string(),
            HierarchyColumn::TotalTime => item.total_time.to_string(),
            HierarchyColumn::SelfPercent => format!("{:.1}%", self.percent(item.self_time)),
            HierarchyColumn::TotalPercent => format!("{:.1}%", self.percent(item.total_time)),
        }
    }

    fn column_value(&self, id: ItemId, column: HierarchyColumn) -> f32 {
        let Some(item) = self.item(id) else {
            return 0.0;
        };
        match column {
            HierarchyColumn::Name | HierarchyColumn::ObjectName => 0.0,
            HierarchyColumn::Calls => item.calls as f32,
            HierarchyColumn::GcMemory => item.gc_memory,
            HierarchyColumn::SelfTime => item.self_time,
            HierarchyColumn::TotalTime => item.total_time,
            HierarchyColumn::SelfPercent => self.percent(item.self_time),
            HierarchyColumn::TotalPercent => self.percent(item.total_time),
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.open_views.set(self.open_views.get().saturating_sub(1));
        }
    }
}
