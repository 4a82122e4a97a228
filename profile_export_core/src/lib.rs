//! # Profile Export Core
//!
//! Engine-independent flattening of per-frame profiler samples into CSV tables.
//!
//! 引擎编辑器采集的每帧性能数据由两部分组成：按类别的标量统计（CPU、内存、渲染）
//! 和按列组织的调用树。本crate把它们展平为五张表：
//! `cpu.csv`、`memory.csv`、`rendering.csv`、`hierarchy.csv`、`hierarchy_item.csv`。
//!
//! ## Modules
//!
//! - [`source`] - 性能数据源抽象和录制文件数据源
//! - [`category`] - 统计类别、映射表和计数器集合
//! - [`extract`] - 标量类别提取
//! - [`hierarchy`] - 调用树遍历
//! - [`table`] - CSV 表格序列化
//! - [`export`] - 导出流程
//!
//! ## Example
//!
//! ```rust
//! use profile_export_core::{run, ExportOptions, RecordedCapture};
//!
//! let capture = RecordedCapture::from_json_str(
//!     r#"{
//!         "firstFrame": 3,
//!         "frames": [{ "statistics": { "rendering": { "Batches": 12 } }, "hierarchy": {} }]
//!     }"#,
//! )?;
//!
//! let tables = run(&capture, &ExportOptions::default())?;
//! assert_eq!(
//!     tables.rendering.contents,
//!     "frame,batches,setPassCall,triangles,vertices\n3,12,0,0,0\n"
//! );
//! # Ok::<(), profile_export_core::FlattenError>(())
//! ```

// Macro for implementing Default trait
#[macro_export]
macro_rules! impl_default {
    ($type:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $type {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

pub mod category;
pub mod error;
pub mod export;
pub mod extract;
pub mod hierarchy;
pub mod source;
pub mod table;

mod property_tests;

// Re-export public APIs
pub use category::{Category, CounterSet, CounterValue, StatisticMapping};
pub use error::{FlattenError, FlattenResult};
pub use export::{process_frame, run, ExportOptions, ExportTables, FrameData, Table};
pub use extract::{extract, list_statistics, StatisticListing};
pub use hierarchy::{walk, HierarchyFrame, HierarchyNode, HierarchySummary, WalkScratch};
pub use source::{
    FrameRange, HierarchyColumn, HierarchyView, HierarchyViewGuard, HierarchyViewOptions, ItemId,
    ProfilingDataSource, RecordedCapture, RecordedFrame, RecordedHierarchy, RecordedItem,
    RecordedStatistics,
};
pub use table::{serialize, FieldValue, FlatRow, Schema};
