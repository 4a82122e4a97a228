//! 标量类别提取
//!
//! 按类别枚举数据源的统计名，读取单帧值，通过映射表写入计数器集合。

use crate::category::{Category, CounterSet};
use crate::error::FlattenResult;
use crate::source::ProfilingDataSource;

/// 提取单帧某类别的计数器
///
/// 帧索引越界时返回 `FrameOutOfRange`，任何错误都不会返回部分填充的集合。
/// CPU 值保持引擎的原始计时单位。
pub fn extract<S>(source: &S, category: Category, frame: u32) -> FlattenResult<CounterSet>
where
    S: ProfilingDataSource + ?Sized,
{
    source.frame_range()?.check(frame)?;

    let mut counters = CounterSet::zeroed(category);
    for statistic in source.statistic_names(category)? {
        if category.field_index(&statistic).is_none() {
            tracing::trace!(target: "profile_export", "Skipping unmapped {} statistic '{}'", category, statistic);
            continue;
        }

        let value = source.statistic_value(category, &statistic, frame)?;
        if tracing::enabled!(tracing::Level::TRACE) {
            let formatted = source.formatted_statistic(category, &statistic, frame)?;
            tracing::trace!(target: "profile_export", frame, "{} {}: {}", category, statistic, formatted);
        }
        counters.set_statistic(&statistic, value);
    }

    Ok(counters)
}

/// 统计名及其是否被映射到输出列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticListing {
    pub category: Category,
    pub statistic: String,
    pub mapped: bool,
}

/// 列出数据源在各类别下提供的所有统计名
pub fn list_statistics<S>(source: &S) -> FlattenResult<Vec<StatisticListing>>
where
    S: ProfilingDataSource + ?Sized,
{
    let mut listings = Vec::new();
    for category in Category::ALL {
        for statistic in source.statistic_names(category)? {
            let mapped = category.field_index(&statistic).is_some();
            tracing::debug!(target: "profile_export", "{} : {} (mapped: {})", category, statistic, mapped);
            listings.push(StatisticListing {
                category,
                statistic,
                mapped,
            });
        }
    }
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CounterValue;
    use crate::error::FlattenError;
    use crate::source::{RecordedCapture, RecordedFrame};

    fn capture() -> RecordedCapture {
        let mut capture = RecordedCapture::new(5);
        for i in 0..3 {
            capture.push_frame(
                RecordedFrame::new()
                    .with_statistic(Category::Cpu, "Scripts", 12.5)
                    .with_statistic(Category::Cpu, "Foo", 99.0)
                    .with_statistic(Category::Memory, "Total Allocated", 2048.75 + i as f32)
                    .with_statistic(Category::Rendering, "SetPass Calls", 17.9),
            );
        }
        capture
    }

    #[test]
    fn test_extract_cpu_ignores_unknown() {
        let counters = extract(&capture(), Category::Cpu, 6).unwrap();
        assert_eq!(counters.get("scripts"), Some(CounterValue::Float(12.5)));
        assert_eq!(counters.get("foo"), None);
        for (field, value) in counters.iter() {
            if field != "scripts" {
                assert_eq!(value, CounterValue::Float(0.0), "{field}");
            }
        }
    }

    #[test]
    fn test_extract_integral_categories() {
        let source = capture();
        let memory = extract(&source, Category::Memory, 7).unwrap();
        assert_eq!(memory.get("totalAllocated"), Some(CounterValue::Int(2050)));

        let rendering = extract(&source, Category::Rendering, 5).unwrap();
        assert_eq!(rendering.get("setPassCall"), Some(CounterValue::Int(17)));
        assert_eq!(rendering.get("batches"), Some(CounterValue::Int(0)));
    }

    #[test]
    fn test_extract_out_of_range() {
        let source = capture();
        for frame in [0, 4, 8, 100] {
            let err = extract(&source, Category::Cpu, frame).unwrap_err();
            assert!(matches!(err, FlattenError::FrameOutOfRange { .. }));
        }
    }

    #[test]
    fn test_list_statistics() {
        let listings = list_statistics(&capture()).unwrap();
        assert_eq!(listings.len(), 4);
        let foo = listings.iter().find(|l| l.statistic == "Foo").unwrap();
        assert_eq!(foo.category, Category::Cpu);
        assert!(!foo.mapped);
        assert!(listings
            .iter()
            .filter(|l| l.statistic != "Foo")
            .all(|l| l.mapped));
    }
}
