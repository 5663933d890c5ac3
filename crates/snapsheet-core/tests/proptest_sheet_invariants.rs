//! Property-based invariant tests for the sheet controller.
//!
//! 1. Live offsets stay between the most-open snap and fully hidden
//! 2. Release resolves the nearest snap, lower index on ties
//! 3. Repeated identical resizes leave the position unchanged
//! 4. Touch and mouse deliver identical outcomes for identical samples
//! 5. Progress moves opposite to a monotonic pointer during one drag
//! 6. No panics on arbitrary input, including non-finite values

use proptest::prelude::*;
use snapsheet_core::controller::{SheetController, SheetSignal};
use snapsheet_core::event::{InputSource, PointerSample};
use snapsheet_core::geometry::{SheetMeasurement, progress_ratio};
use snapsheet_core::options::SheetOptions;

const EPS: f64 = 1e-6;

// ── Strategies ──────────────────────────────────────────────────────────

fn snap_points_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 1..6)
}

fn height_strategy() -> impl Strategy<Value = f64> {
    0.0f64..3000.0
}

fn y_strategy() -> impl Strategy<Value = f64> {
    -4000.0f64..4000.0
}

#[derive(Debug, Clone)]
enum Op {
    Down(f64),
    Move(f64),
    Up(f64),
    Cancel,
    Resize(f64),
    Open(bool),
    Overlay,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => y_strategy().prop_map(Op::Down),
        4 => y_strategy().prop_map(Op::Move),
        1 => y_strategy().prop_map(Op::Up),
        1 => Just(Op::Cancel),
        1 => height_strategy().prop_map(Op::Resize),
        1 => any::<bool>().prop_map(Op::Open),
        1 => Just(Op::Overlay),
    ]
}

fn controller(snaps: Vec<f64>, height: f64, dismissible: bool) -> SheetController {
    let options = SheetOptions::new(snaps)
        .with_open(true)
        .with_dismissible(dismissible);
    let mut sheet = SheetController::new(options, SheetMeasurement::container(height, height));
    sheet.mount();
    sheet
}

fn apply(sheet: &mut SheetController, op: &Op, source: InputSource) -> Vec<SheetSignal> {
    let update = match *op {
        Op::Down(y) => sheet.on_pointer(PointerSample::start(source, y)),
        Op::Move(y) => sheet.on_pointer(PointerSample::moved(source, y)),
        Op::Up(y) => sheet.on_pointer(PointerSample::end(source, y)),
        Op::Cancel => sheet.on_pointer(PointerSample::cancel(source)),
        Op::Resize(h) => sheet.on_resize(SheetMeasurement::container(h, h)),
        Op::Open(open) => sheet.set_open(open),
        Op::Overlay => sheet.on_overlay_click(),
    };
    update.signals
}

proptest! {
    #[test]
    fn live_offset_stays_clamped(
        snaps in snap_points_strategy(),
        height in height_strategy(),
        start in y_strategy(),
        moves in prop::collection::vec(y_strategy(), 1..40),
    ) {
        let mut sheet = controller(snaps, height, false);
        sheet.pointer_down(InputSource::Touch, start);
        let bounds = sheet.snap_configuration().bounds(sheet.available_height_px());
        for y in moves {
            sheet.pointer_move(InputSource::Touch, y);
            let live = sheet.position().translate_y_px;
            prop_assert!(live >= bounds.min_px - EPS, "live {live} below {}", bounds.min_px);
            prop_assert!(live <= bounds.max_px + EPS, "live {live} above {}", bounds.max_px);
        }
    }

    #[test]
    fn release_picks_nearest_snap(
        snaps in snap_points_strategy(),
        height in 1.0f64..3000.0,
        start in y_strategy(),
        end in y_strategy(),
    ) {
        let mut sheet = controller(snaps, height, false);
        sheet.pointer_down(InputSource::Mouse, start);
        sheet.pointer_move(InputSource::Mouse, end);
        let live = sheet.position().translate_y_px;
        sheet.pointer_up(InputSource::Mouse, end);

        let progress = progress_ratio(live, sheet.available_height_px());
        let ratios = sheet.snap_configuration().ratios();
        let chosen = sheet.position().current_snap_index;
        let best = (ratios[chosen] - progress).abs();
        for (index, ratio) in ratios.iter().enumerate() {
            let distance = (ratio - progress).abs();
            prop_assert!(best <= distance);
            if index < chosen {
                prop_assert!(distance > best, "tie must go to lower index");
            }
        }
        let expected = sheet.snap_configuration().offset_px(chosen, sheet.available_height_px());
        prop_assert_eq!(sheet.position().translate_y_px, expected);
    }

    #[test]
    fn repeated_resize_is_idempotent(
        snaps in snap_points_strategy(),
        height in height_strategy(),
        resized in height_strategy(),
        repeats in 2usize..10,
    ) {
        let mut once = controller(snaps.clone(), height, false);
        let mut many = controller(snaps, height, false);
        once.on_resize(SheetMeasurement::container(resized, resized));
        for _ in 0..repeats {
            many.on_resize(SheetMeasurement::container(resized, resized));
        }
        prop_assert_eq!(once.position(), many.position());
    }

    #[test]
    fn touch_and_mouse_are_equivalent(
        snaps in snap_points_strategy(),
        height in height_strategy(),
        dismissible in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut touch = controller(snaps.clone(), height, dismissible);
        let mut mouse = controller(snaps, height, dismissible);
        for op in &ops {
            let a = apply(&mut touch, op, InputSource::Touch);
            let b = apply(&mut mouse, op, InputSource::Mouse);
            prop_assert_eq!(a, b);
            prop_assert_eq!(touch.position(), mouse.position());
            prop_assert_eq!(touch.is_dragging(), mouse.is_dragging());
        }
    }

    #[test]
    fn progress_monotonic_during_drag(
        snaps in snap_points_strategy(),
        height in 1.0f64..3000.0,
        start in y_strategy(),
        steps in prop::collection::vec(0.0f64..200.0, 1..30),
        downward in any::<bool>(),
    ) {
        let mut sheet = controller(snaps, height, false);
        sheet.pointer_down(InputSource::Touch, start);
        let mut y = start;
        let mut last = sheet.progress();
        for step in steps {
            y += if downward { step } else { -step };
            sheet.pointer_move(InputSource::Touch, y);
            let progress = sheet.progress();
            if downward {
                prop_assert!(progress <= last + EPS);
            } else {
                prop_assert!(progress >= last - EPS);
            }
            last = progress;
        }
    }

    #[test]
    fn arbitrary_sequences_never_panic(
        snaps in prop::collection::vec(any::<f64>(), 0..6),
        height in any::<f64>(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut sheet = SheetController::new(
            SheetOptions::new(snaps).with_dismissible(true),
            SheetMeasurement::container(height, height),
        );
        sheet.mount();
        for op in &ops {
            let signals = apply(&mut sheet, op, InputSource::Touch);
            for signal in signals {
                if let SheetSignal::Progress(progress) = signal {
                    prop_assert!((0.0..=1.0).contains(&progress));
                }
            }
            prop_assert!(sheet.snap_configuration().len() >= 1);
            prop_assert!(sheet.position().current_snap_index < sheet.snap_configuration().len());
        }
    }
}
