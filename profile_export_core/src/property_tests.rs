//! 导出流程属性测试
//!
//! 使用proptest随机生成录制数据，验证行数、幂等性、未知统计名的处理和层级展平

#[cfg(test)]
mod tests {
    use crate::category::Category;
    use crate::export::{run, ExportOptions};
    use crate::source::{
        FrameRange, RecordedCapture, RecordedFrame, RecordedHierarchy, RecordedItem,
    };
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn statistic_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Scripts".to_string()),
            Just("Rendering".to_string()),
            Just("Total Allocated".to_string()),
            Just("Batches".to_string()),
            Just("SetPass Calls".to_string()),
            "[A-Za-z ]{1,12}",
        ]
    }

    fn category() -> impl Strategy<Value = Category> {
        prop_oneof![
            Just(Category::Cpu),
            Just(Category::Memory),
            Just(Category::Rendering)
        ]
    }

    fn item(depth: u32) -> BoxedStrategy<RecordedItem> {
        let leaf = ("[A-Za-z]{1,8}", 0.0f32..10.0, 1u32..5)
            .prop_map(|(name, time, calls)| {
                RecordedItem::new(name).with_times(time, time).with_calls(calls)
            });
        if depth == 0 {
            leaf.boxed()
        } else {
            (leaf, prop::collection::vec(item(depth - 1), 0..3))
                .prop_map(|(mut parent, children)| {
                    parent.children = children;
                    parent
                })
                .boxed()
        }
    }

    fn frame() -> impl Strategy<Value = RecordedFrame> {
        (
            prop::collection::vec((category(), statistic_name(), -1.0e6f32..1.0e6), 0..8),
            prop::collection::vec(item(2), 0..3),
            1.0f32..50.0,
        )
            .prop_map(|(statistics, items, frame_time_ms)| {
                let mut frame = RecordedFrame::new().with_hierarchy(RecordedHierarchy {
                    frame_index: None,
                    frame_fps: 1000.0 / frame_time_ms,
                    frame_time_ms,
                    frame_gpu_time_ms: frame_time_ms / 2.0,
                    root: RecordedItem::root(items),
                });
                for (category, name, value) in statistics {
                    frame = frame.with_statistic(category, name, value);
                }
                frame
            })
    }

    fn capture() -> impl Strategy<Value = RecordedCapture> {
        (0u32..1000, prop::collection::vec(frame(), 0..6)).prop_map(|(first, frames)| {
            let mut capture = RecordedCapture::new(first);
            for frame in frames {
                capture.push_frame(frame);
            }
            capture
        })
    }

    /// 收集所有有子节点的录制节点路径，根节点不计入
    fn collect_branch_paths(item: &RecordedItem, parent: &str, out: &mut HashSet<String>) {
        let path = if parent.is_empty() {
            item.name.clone()
        } else {
            format!("{}/{}", parent, item.name)
        };
        if !item.children.is_empty() {
            for child in &item.children {
                collect_branch_paths(child, &path, out);
            }
            out.insert(path);
        }
    }

    proptest! {
        #[test]
        fn scalar_tables_have_one_row_per_frame(
            source in capture(),
            start in 0usize..6,
            len in 0usize..6,
        ) {
            let total = source.frames().len();
            let first = source.first_frame + start.min(total) as u32;
            let last = (first + len as u32).min(source.first_frame + total as u32);
            let options = ExportOptions {
                range: Some(FrameRange::new(first, last)),
                ..ExportOptions::default()
            };

            let tables = run(&source, &options).unwrap();
            let expected = (last - first) as usize;
            for table in [&tables.cpu, &tables.memory, &tables.rendering, &tables.hierarchy] {
                prop_assert_eq!(table.contents.lines().count(), expected + 1);
            }
            prop_assert_eq!(source.open_view_count(), 0);
        }

        #[test]
        fn export_is_idempotent(source in capture()) {
            let first = run(&source, &ExportOptions::default()).unwrap();
            let second = run(&source, &ExportOptions::default()).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn unknown_statistics_never_become_columns(source in capture()) {
            let tables = run(&source, &ExportOptions::default()).unwrap();
            for category in Category::ALL {
                let table = match category {
                    Category::Cpu => &tables.cpu,
                    Category::Memory => &tables.memory,
                    Category::Rendering => &tables.rendering,
                };
                let header = table.contents.lines().next().unwrap();
                let columns = header.split(',').count();
                prop_assert_eq!(columns, category.mapping().len() + 1);
                for line in table.contents.lines() {
                    prop_assert_eq!(line.split(',').count(), columns);
                }
            }
        }

        #[test]
        fn emitted_items_hang_under_recorded_branches(source in capture()) {
            let branches: Vec<HashSet<String>> = source
                .frames()
                .iter()
                .map(|frame| {
                    let mut paths = HashSet::new();
                    if let Some(hierarchy) = &frame.hierarchy {
                        for item in &hierarchy.root.children {
                            collect_branch_paths(item, "", &mut paths);
                        }
                    }
                    paths
                })
                .collect();

            let tables = run(&source, &ExportOptions::default()).unwrap();
            for line in tables.hierarchy_item.contents.lines().skip(1) {
                let columns: Vec<&str> = line.split(',').collect();
                let frame: u32 = columns[0].parse().unwrap();
                let path = columns[3];
                let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
                prop_assert_eq!(name, columns[2]);
                prop_assert!(
                    branches[(frame - source.first_frame) as usize].contains(parent),
                    "{} has no recorded branch parent",
                    path
                );
            }
        }
    }
}
