use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use profile_export_core::{
    run, walk, Category, ExportOptions, HierarchyViewOptions, RecordedCapture, RecordedFrame,
    RecordedHierarchy, RecordedItem, WalkScratch,
};

/// 构造一个宽度为 `width`、深度为 `depth` 的调用树
fn build_item(name: String, depth: u32, width: u32) -> RecordedItem {
    let mut item = RecordedItem::new(name).with_times(0.1, 1.0);
    if depth > 0 {
        for i in 0..width {
            item = item.with_child(build_item(format!("Child{}", i), depth - 1, width));
        }
    }
    item
}

fn build_capture(frames: u32) -> RecordedCapture {
    let mut capture = RecordedCapture::new(0);
    for frame in 0..frames {
        capture.push_frame(
            RecordedFrame::new()
                .with_statistic(Category::Cpu, "Scripts", 1.5 * frame as f32)
                .with_statistic(Category::Cpu, "Rendering", 3.25)
                .with_statistic(Category::Memory, "Total Allocated", 1.0e8)
                .with_statistic(Category::Rendering, "Batches", 120.0)
                .with_hierarchy(RecordedHierarchy {
                    frame_index: Some(frame),
                    frame_fps: 60.0,
                    frame_time_ms: 16.6,
                    frame_gpu_time_ms: 4.0,
                    root: RecordedItem::root(vec![build_item("PlayerLoop".to_string(), 3, 4)]),
                }),
        );
    }
    capture
}

fn bench_walk(c: &mut Criterion) {
    let capture = build_capture(1);
    c.bench_function("walk_hierarchy_85_items", |b| {
        let mut scratch = WalkScratch::new();
        let options = HierarchyViewOptions::default();
        b.iter(|| {
            let walked = walk(&capture, 0, &options, &mut scratch).unwrap();
            black_box(walked);
        });
    });
}

fn bench_export(c: &mut Criterion) {
    let capture = build_capture(300);
    c.bench_function("export_300_frames", |b| {
        let options = ExportOptions::default();
        b.iter(|| {
            let tables = run(&capture, &options).unwrap();
            black_box(tables);
        });
    });
}

criterion_group!(benches, bench_walk, bench_export);
criterion_main!(benches);
