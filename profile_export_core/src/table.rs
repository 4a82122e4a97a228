//! CSV 表格序列化
//!
//! 每张表由固定的 [`Schema`] 描述：一行表头，随后每条记录一行，字段以逗号连接。
//! 字段不做引号转义，名称或路径中包含逗号时输出会错位。

use crate::category::{Category, CounterSet, CounterValue};
use crate::error::{FlattenError, FlattenResult};
use crate::hierarchy::{HierarchyNode, HierarchySummary};
use std::fmt;

/// 单个字段值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f32),
    /// 原样输出的文本
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            // Rust 的浮点显示与区域设置无关
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<CounterValue> for FieldValue {
    fn from(value: CounterValue) -> Self {
        match value {
            CounterValue::Float(v) => FieldValue::Float(v),
            CounterValue::Int(v) => FieldValue::Int(v),
        }
    }
}

/// 表结构：目标文件名和有序列名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub file_name: &'static str,
    pub columns: &'static [&'static str],
}

pub const CPU_SCHEMA: Schema = Schema {
    file_name: "cpu.csv",
    columns: &[
        "frame",
        "rendering",
        "scripts",
        "physics",
        "animation",
        "garbageCollector",
        "VSync",
        "globalIllumination",
        "ui",
        "others",
    ],
};

pub const MEMORY_SCHEMA: Schema = Schema {
    file_name: "memory.csv",
    columns: &[
        "frame",
        "totalAllocated",
        "textureMemory",
        "meshMemory",
        "materialCount",
        "objectCount",
        "totalGCAllocated",
        "globalIllumination",
        "gcAllocated",
    ],
};

pub const RENDERING_SCHEMA: Schema = Schema {
    file_name: "rendering.csv",
    columns: &["frame", "batches", "setPassCall", "triangles", "vertices"],
};

pub const HIERARCHY_SCHEMA: Schema = Schema {
    file_name: "hierarchy.csv",
    columns: &["frame", "frameIndex", "frameFps", "frameTimeMs", "frameGpuTimeMs"],
};

pub const HIERARCHY_ITEM_SCHEMA: Schema = Schema {
    file_name: "hierarchy_item.csv",
    columns: &[
        "frame",
        "frameIndex",
        "itemName",
        "itemPath",
        "columnName",
        "columnObjectName",
        "columnCalls",
        "columnGcMemory",
        "columnSelfTime",
        "columnSelfPercent",
        "columnTotalTime",
        "columnTotalPercent",
    ],
};

impl Schema {
    /// 计数器类别对应的表结构
    pub fn for_category(category: Category) -> &'static Schema {
        match category {
            Category::Cpu => &CPU_SCHEMA,
            Category::Memory => &MEMORY_SCHEMA,
            Category::Rendering => &RENDERING_SCHEMA,
        }
    }

    pub fn header(&self) -> String {
        self.columns.join(",")
    }
}

/// 可以展平为一行的记录
pub trait FlatRow {
    /// 按表结构顺序的字段
    fn fields(&self) -> Vec<FieldValue>;
}

/// 计数器表的一行
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRow {
    pub frame: u32,
    pub counters: CounterSet,
}

impl FlatRow for CounterRow {
    fn fields(&self) -> Vec<FieldValue> {
        std::iter::once(FieldValue::Int(i64::from(self.frame)))
            .chain(self.counters.values().iter().map(|&v| FieldValue::from(v)))
            .collect()
    }
}

/// hierarchy.csv 的一行
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyRow {
    pub frame: u32,
    pub summary: HierarchySummary,
}

impl FlatRow for HierarchyRow {
    fn fields(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(i64::from(self.frame)),
            FieldValue::Int(i64::from(self.summary.frame_index)),
            FieldValue::Float(self.summary.frame_fps),
            FieldValue::Float(self.summary.frame_time_ms),
            FieldValue::Float(self.summary.frame_gpu_time_ms),
        ]
    }
}

/// hierarchy_item.csv 的一行
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyItemRow {
    pub frame: u32,
    pub frame_index: u32,
    pub node: HierarchyNode,
}

impl FlatRow for HierarchyItemRow {
    fn fields(&self) -> Vec<FieldValue> {
        let node = &self.node;
        vec![
            FieldValue::Int(i64::from(self.frame)),
            FieldValue::Int(i64::from(self.frame_index)),
            FieldValue::Text(node.item_name.clone()),
            FieldValue::Text(node.item_path.clone()),
            FieldValue::Text(node.column_name.clone()),
            FieldValue::Text(node.column_object_name.clone()),
            FieldValue::Int(i64::from(node.column_calls)),
            FieldValue::Float(node.column_gc_memory),
            FieldValue::Float(node.column_self_time),
            FieldValue::Text(node.column_self_percent.clone()),
            FieldValue::Float(node.column_total_time),
            FieldValue::Text(node.column_total_percent.clone()),
        ]
    }
}

/// 序列化为CSV文本
///
/// 字段数与表结构不一致的行返回 `SerializationFailure`。没有行时只输出表头。
pub fn serialize<R: FlatRow>(rows: &[R], schema: &Schema) -> FlattenResult<String> {
    let mut out = schema.header();
    out.push('\n');

    for (index, row) in rows.iter().enumerate() {
        let fields = row.fields();
        if fields.len() != schema.columns.len() {
            return Err(FlattenError::SerializationFailure {
                table: schema.file_name,
                row: index,
                expected: schema.columns.len(),
                actual: fields.len(),
            });
        }

        let line: Vec<String> = fields.iter().map(ToString::to_string).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    Ok(out)
}
