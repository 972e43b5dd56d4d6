use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mosaic_core::{Component, Element, SizeSpec};
use mosaic_layout::{calculate_layout, LayoutRequest, LayoutResult, TaffySolver};
use mosaic_testing::{Leaf, Paint, Screen, Stack};

const SECTION_COUNT: u32 = 4;
const ROW_SAMPLES: &[u32] = &[8, 16, 32, 64];
const ROOT_WIDTH: f32 = 1080.0;

fn feed(sections: u32, rows: u32) -> Component {
    Screen::component(move || {
        Element::column().children((0..sections).map(|section| {
            Element::component(Stack::hosted(
                "section",
                (0..rows)
                    .map(|row| Leaf::component(section * 1000 + row, 24.0))
                    .collect(),
            ))
            .background(Paint::component(section))
        }))
    })
}

fn run(solver: &Arc<TaffySolver>, root: &Component, previous: Option<&LayoutResult>) -> LayoutResult {
    let request = LayoutRequest::new(root, SizeSpec::exactly(ROOT_WIDTH), SizeSpec::unspecified())
        .with_previous_diff(previous.and_then(LayoutResult::diff_tree));
    calculate_layout(solver.clone(), request).expect("layout")
}

fn bench_cold_pass(c: &mut Criterion) {
    let solver = Arc::new(TaffySolver::new());
    let mut group = c.benchmark_group("layout_cold");
    for &rows in ROW_SAMPLES {
        let root = feed(SECTION_COUNT, rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &root, |b, root| {
            b.iter(|| black_box(run(&solver, root, None)));
        });
    }
    group.finish();
}

fn bench_matched_pass(c: &mut Criterion) {
    let solver = Arc::new(TaffySolver::new());
    let mut group = c.benchmark_group("layout_matched");
    for &rows in ROW_SAMPLES {
        let root = feed(SECTION_COUNT, rows);
        let previous = run(&solver, &root, None);
        group.bench_with_input(BenchmarkId::new("rows", rows), &root, |b, root| {
            b.iter(|| black_box(run(&solver, root, Some(&previous))));
        });
    }
    group.finish();
}

criterion_group!(layout_pass, bench_cold_pass, bench_matched_pass);
criterion_main!(layout_pass);
