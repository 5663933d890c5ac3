#![forbid(unsafe_code)]

use criterion::{Criterion, criterion_group, criterion_main};
use snapsheet_core::controller::SheetController;
use snapsheet_core::event::InputSource;
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;
use snapsheet_core::snap::SnapConfiguration;
use std::hint::black_box;

fn sheet() -> SheetController {
    let options = SheetOptions::new(vec![0.1, 0.3, 0.6, 0.9]).with_open(true);
    let mut sheet = SheetController::new(options, SheetMeasurement::container(900.0, 900.0));
    sheet.mount();
    sheet
}

fn bench_drag_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("sheet/drag/lifecycle");

    for moves in [32_u32, 120] {
        group.bench_function(format!("down_move_{moves}_up"), |b| {
            b.iter(|| {
                let mut sheet = sheet();
                black_box(sheet.pointer_down(InputSource::Touch, 600.0).changes);
                for step in 0..moves {
                    let update = sheet.pointer_move(InputSource::Touch, 600.0 - f64::from(step) * 3.0);
                    black_box(update.progress());
                }
                black_box(sheet.pointer_up(InputSource::Touch, 240.0).signals.len());
            });
        });
    }

    group.finish();
}

fn bench_snap_resolution(c: &mut Criterion) {
    let ratios: Vec<f64> = (0..16).map(|i| f64::from(i) / 15.0).collect();
    let config = SnapConfiguration::new(&ratios);
    c.bench_function("sheet/snap/nearest_16", |b| {
        b.iter(|| {
            for step in 0..100 {
                black_box(config.resolve_release(f64::from(step) * 9.0, 900.0));
            }
        });
    });
}

criterion_group!(benches, bench_drag_lifecycle, bench_snap_resolution);
criterion_main!(benches);
