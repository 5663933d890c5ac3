#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snapsheet_core::controller::SheetController;
use snapsheet_core::event::{DragCancelReason, InputSource};
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;

#[derive(Debug, Arbitrary)]
enum Op {
    Down { mouse: bool, y: f64 },
    Move { mouse: bool, y: f64 },
    Up { mouse: bool, y: f64 },
    Cancel { mouse: bool },
    Blur,
    Resize { container: Option<f64>, viewport: f64 },
    Open(bool),
    Overlay,
    Dismissible(bool),
}

#[derive(Debug, Arbitrary)]
struct Input {
    snap_points: Vec<f64>,
    initial_snap_index: i64,
    bottom_offset_px: f64,
    viewport: f64,
    ops: Vec<Op>,
}

fn source(mouse: bool) -> InputSource {
    if mouse {
        InputSource::Mouse
    } else {
        InputSource::Touch
    }
}

fuzz_target!(|input: Input| {
    let options = SheetOptions::new(input.snap_points)
        .with_initial_snap_index(input.initial_snap_index)
        .with_bottom_offset_px(input.bottom_offset_px)
        .with_open(true);
    let mut sheet = SheetController::new(options, SheetMeasurement::viewport_only(input.viewport));
    sheet.mount();

    for op in input.ops.into_iter().take(256) {
        let update = match op {
            Op::Down { mouse, y } => sheet.pointer_down(source(mouse), y),
            Op::Move { mouse, y } => sheet.pointer_move(source(mouse), y),
            Op::Up { mouse, y } => sheet.pointer_up(source(mouse), y),
            Op::Cancel { mouse } => sheet.pointer_cancel(source(mouse)),
            Op::Blur => sheet.cancel_drag(DragCancelReason::Blur),
            Op::Resize {
                container,
                viewport,
            } => sheet.on_resize(match container {
                Some(c) => SheetMeasurement::container(c, viewport),
                None => SheetMeasurement::viewport_only(viewport),
            }),
            Op::Open(open) => sheet.set_open(open),
            Op::Overlay => sheet.on_overlay_click(),
            Op::Dismissible(dismissible) => {
                let options = sheet.options().clone().with_dismissible(dismissible);
                sheet.set_options(options)
            }
        };

        // Post-conditions that must always hold:
        let available = sheet.available_height_px();
        assert!(available.is_finite() && available >= 0.0, "available height invalid");
        let position = sheet.position();
        assert!(
            position.current_snap_index < sheet.snap_configuration().len(),
            "snap index OOB"
        );
        let translate = position.translate_y_px;
        assert!(translate.is_finite(), "translate not finite");
        if sheet.is_dragging() {
            let bounds = sheet.snap_configuration().bounds(available);
            assert!(bounds.contains(translate), "live offset escaped bounds");
        }
        for progress in update.signals.iter().filter_map(|signal| match signal {
            snapsheet_core::controller::SheetSignal::Progress(p) => Some(*p),
            snapsheet_core::controller::SheetSignal::Close => None,
        }) {
            assert!((0.0..=1.0).contains(&progress), "progress out of range");
        }
    }
});
