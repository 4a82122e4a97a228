//! 统计类别与计数器集合
//!
//! 每个类别（CPU、内存、渲染）都有一张固定的映射表，
//! 把引擎上报的统计名映射到输出列名。表中没有的统计名会被忽略。

use crate::error::FlattenError;
use std::fmt;
use std::str::FromStr;

/// 统计类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Cpu,
    Memory,
    Rendering,
}

/// 统计名到输出列的映射项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticMapping {
    /// 引擎上报的统计名
    pub statistic: &'static str,
    /// 输出列名
    pub field: &'static str,
}

const fn map(statistic: &'static str, field: &'static str) -> StatisticMapping {
    StatisticMapping { statistic, field }
}

/// CPU 统计映射（原始计时单位，不做换算）
pub const CPU_MAPPING: &[StatisticMapping] = &[
    map("Rendering", "rendering"),
    map("Scripts", "scripts"),
    map("Physics", "physics"),
    map("Animation", "animation"),
    map("GarbageCollector", "garbageCollector"),
    map("VSync", "VSync"),
    map("Global Illumination", "globalIllumination"),
    map("UI", "ui"),
    map("Others", "others"),
];

/// 内存统计映射
pub const MEMORY_MAPPING: &[StatisticMapping] = &[
    map("Total Allocated", "totalAllocated"),
    map("Texture Memory", "textureMemory"),
    map("Mesh Memory", "meshMemory"),
    map("Material Count", "materialCount"),
    map("Object Count", "objectCount"),
    map("Total GC Allocated", "totalGCAllocated"),
    map("Global Illumination", "globalIllumination"),
    map("GC Allocated", "gcAllocated"),
];

/// 渲染统计映射
pub const RENDERING_MAPPING: &[StatisticMapping] = &[
    map("Batches", "batches"),
    map("SetPass Calls", "setPassCall"),
    map("Triangles", "triangles"),
    map("Vertices", "vertices"),
];

impl Category {
    /// 所有类别，按导出顺序排列
    pub const ALL: [Category; 3] = [Category::Cpu, Category::Memory, Category::Rendering];

    /// 类别名
    pub fn name(self) -> &'static str {
        match self {
            Category::Cpu => "CPU",
            Category::Memory => "Memory",
            Category::Rendering => "Rendering",
        }
    }

    /// 该类别的映射表
    pub fn mapping(self) -> &'static [StatisticMapping] {
        match self {
            Category::Cpu => CPU_MAPPING,
            Category::Memory => MEMORY_MAPPING,
            Category::Rendering => RENDERING_MAPPING,
        }
    }

    /// 按映射表顺序返回输出列名
    pub fn fields(self) -> impl Iterator<Item = &'static str> {
        self.mapping().iter().map(|m| m.field)
    }

    /// 统计名对应的列序号，精确匹配
    pub fn field_index(self, statistic: &str) -> Option<usize> {
        self.mapping().iter().position(|m| m.statistic == statistic)
    }

    /// 内存和渲染类别的值截断为整数
    pub fn is_integral(self) -> bool {
        !matches!(self, Category::Cpu)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = FlattenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Category::Cpu),
            "memory" => Ok(Category::Memory),
            "rendering" => Ok(Category::Rendering),
            _ => Err(FlattenError::UnknownCategory(s.to_string())),
        }
    }
}

/// 单个计数器的值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterValue {
    Float(f32),
    Int(i64),
}

impl CounterValue {
    /// 按类别转换原始值；整数类别向零截断
    pub fn from_raw(category: Category, raw: f32) -> Self {
        if category.is_integral() {
            // `as` 对 NaN 取 0，超界时饱和
            CounterValue::Int(raw.trunc() as i64)
        } else {
            CounterValue::Float(raw)
        }
    }

    fn zero(category: Category) -> Self {
        Self::from_raw(category, 0.0)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            CounterValue::Float(v) => f64::from(v),
            CounterValue::Int(v) => v as f64,
        }
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterValue::Float(v) => write!(f, "{}", v),
            CounterValue::Int(v) => write!(f, "{}", v),
        }
    }
}

/// 一帧内某个类别的计数器集合
///
/// 值按映射表顺序存放，缺失的计数器为零。
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSet {
    category: Category,
    values: Vec<CounterValue>,
}

impl CounterSet {
    /// 创建全零的计数器集合
    pub fn zeroed(category: Category) -> Self {
        Self {
            category,
            values: vec![CounterValue::zero(category); category.mapping().len()],
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// 按映射表写入原始值，未知统计名返回 false
    pub fn set_statistic(&mut self, statistic: &str, raw: f32) -> bool {
        match self.category.field_index(statistic) {
            Some(index) => {
                self.values[index] = CounterValue::from_raw(self.category, raw);
                true
            }
            None => false,
        }
    }

    /// 按输出列名读取
    pub fn get(&self, field: &str) -> Option<CounterValue> {
        self.category
            .fields()
            .position(|f| f == field)
            .map(|index| self.values[index])
    }

    /// 按映射表顺序的所有值
    pub fn values(&self) -> &[CounterValue] {
        &self.values
    }

    /// (列名, 值) 迭代器
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, CounterValue)> + '_ {
        self.category.fields().zip(self.values.iter().copied())
    }
}
