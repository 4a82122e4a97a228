//! 导出流程
//!
//! 按帧号递增顺序处理每一帧：三个标量类别各提取一次，调用树遍历一次，
//! 结果累积到五个有序序列中，全部帧处理完后分别序列化。
//! 任何一帧失败都会中止整个导出，不返回任何表。

use crate::category::{Category, CounterSet};
use crate::error::FlattenResult;
use crate::extract::extract;
use crate::hierarchy::{walk, HierarchyFrame, WalkScratch};
use crate::source::{FrameRange, HierarchyViewOptions, ProfilingDataSource};
use crate::table::{
    serialize, CounterRow, HierarchyItemRow, HierarchyRow, Schema, HIERARCHY_ITEM_SCHEMA,
    HIERARCHY_SCHEMA,
};

/// 单帧的完整快照
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub frame: u32,
    pub cpu: CounterSet,
    pub memory: CounterSet,
    pub rendering: CounterSet,
    pub hierarchy: HierarchyFrame,
}

/// 处理单帧
pub fn process_frame<S>(
    source: &S,
    frame: u32,
    options: &HierarchyViewOptions,
    scratch: &mut WalkScratch,
) -> FlattenResult<FrameData>
where
    S: ProfilingDataSource + ?Sized,
{
    Ok(FrameData {
        frame,
        hierarchy: walk(source, frame, options, scratch)?,
        cpu: extract(source, Category::Cpu, frame)?,
        memory: extract(source, Category::Memory, frame)?,
        rendering: extract(source, Category::Rendering, frame)?,
    })
}

/// 导出选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// 导出的帧区间，缺省为数据源的全部帧
    pub range: Option<FrameRange>,
    pub hierarchy: HierarchyViewOptions,
}

/// 一张序列化后的表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub schema: &'static Schema,
    pub contents: String,
}

impl Table {
    pub fn file_name(&self) -> &'static str {
        self.schema.file_name
    }
}

/// 一次导出产生的五张表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTables {
    pub range: FrameRange,
    pub cpu: Table,
    pub memory: Table,
    pub rendering: Table,
    pub hierarchy: Table,
    pub hierarchy_item: Table,
}

impl ExportTables {
    /// 按固定顺序返回所有表
    pub fn tables(&self) -> [&Table; 5] {
        [
            &self.cpu,
            &self.memory,
            &self.rendering,
            &self.hierarchy,
            &self.hierarchy_item,
        ]
    }
}

#[derive(Default)]
struct RowAccumulator {
    cpu: Vec<CounterRow>,
    memory: Vec<CounterRow>,
    rendering: Vec<CounterRow>,
    hierarchy: Vec<HierarchyRow>,
    hierarchy_item: Vec<HierarchyItemRow>,
}

impl RowAccumulator {
    fn push(&mut self, data: FrameData) {
        let frame = data.frame;
        let summary = data.hierarchy.summary;

        self.cpu.push(CounterRow {
            frame,
            counters: data.cpu,
        });
        self.memory.push(CounterRow {
            frame,
            counters: data.memory,
        });
        self.rendering.push(CounterRow {
            frame,
            counters: data.rendering,
        });
        self.hierarchy.push(HierarchyRow { frame, summary });
        self.hierarchy_item
            .extend(data.hierarchy.nodes.into_iter().map(|node| HierarchyItemRow {
                frame,
                frame_index: summary.frame_index,
                node,
            }));
    }

    fn serialize(self, range: FrameRange) -> FlattenResult<ExportTables> {
        let counter_table = |rows: &[CounterRow], category: Category| -> FlattenResult<Table> {
            let schema = Schema::for_category(category);
            Ok(Table {
                schema,
                contents: serialize(rows, schema)?,
            })
        };

        Ok(ExportTables {
            range,
            cpu: counter_table(&self.cpu, Category::Cpu)?,
            memory: counter_table(&self.memory, Category::Memory)?,
            rendering: counter_table(&self.rendering, Category::Rendering)?,
            hierarchy: Table {
                schema: &HIERARCHY_SCHEMA,
                contents: serialize(&self.hierarchy, &HIERARCHY_SCHEMA)?,
            },
            hierarchy_item: Table {
                schema: &HIERARCHY_ITEM_SCHEMA,
                contents: serialize(&self.hierarchy_item, &HIERARCHY_ITEM_SCHEMA)?,
            },
        })
    }
}

/// 执行导出
///
/// 请求的区间必须落在数据源的区间内，否则在处理任何帧之前返回 `RangeOutOfBounds`。
pub fn run<S>(source: &S, options: &ExportOptions) -> FlattenResult<ExportTables>
where
    S: ProfilingDataSource + ?Sized,
{
    let available = source.frame_range()?;
    let range = match options.range {
        Some(range) => {
            available.check_subrange(range)?;
            range
        }
        None => available,
    };

    tracing::info!(
        target: "profile_export",
        first = range.first,
        last = range.last,
        "Exporting {} frames",
        range.len()
    );

    let mut scratch = WalkScratch::new();
    let mut rows = RowAccumulator::default();
    for frame in range.iter() {
        let data = process_frame(source, frame, &options.hierarchy, &mut scratch)?;
        rows.push(data);
    }

    let item_count = rows.hierarchy_item.len();
    let tables = rows.serialize(range)?;
    tracing::info!(target: "profile_export", items = item_count, "Export finished");
    Ok(tables)
}
