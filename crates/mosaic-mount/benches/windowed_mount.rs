use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mosaic_core::Rect;
use mosaic_mount::MountState;
use mosaic_testing::{lay_out, Leaf, RecordingProvider, Stack};

const ROWS: u32 = 2000;
const ROW_HEIGHT: f32 = 10.0;
const VIEWPORT: f32 = 400.0;

fn bench_scroll(c: &mut Criterion) {
    let root = Stack::component((0..ROWS).map(|row| Leaf::component(row, ROW_HEIGHT)).collect());
    let result = lay_out(&root).expect("layout");
    let max_offset = ROWS as f32 * ROW_HEIGHT - VIEWPORT;

    c.bench_function("windowed_scroll", |b| {
        let mut state = MountState::new(RecordingProvider::new());
        let mut offset = 0.0;
        b.iter(|| {
            offset = (offset + 7.0) % max_offset;
            let stats = state.mount(&result, Some(Rect::new(0.0, offset, 100.0, VIEWPORT)));
            black_box(stats);
        });
    });
}

fn bench_full_remount(c: &mut Criterion) {
    let root = Stack::component((0..ROWS).map(|row| Leaf::component(row, ROW_HEIGHT)).collect());

    c.bench_function("full_remount", |b| {
        let mut state = MountState::new(RecordingProvider::new());
        b.iter(|| {
            let result = lay_out(&root).expect("layout");
            let stats = state.mount(&result, Some(Rect::new(0.0, 0.0, 100.0, VIEWPORT)));
            black_box(stats);
        });
    });
}

criterion_group!(windowed_mount, bench_scroll, bench_full_remount);
criterion_main!(windowed_mount);
