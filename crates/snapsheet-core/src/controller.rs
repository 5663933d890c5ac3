#![forbid(unsafe_code)]

//! Sheet controller: the single owner of position, snaps, and drag state.
//!
//! [`SheetController`] combines the geometry resolver, the drag machine, and
//! the snap resolver behind synchronous entry points (`on_pointer`,
//! `on_resize`, `set_open`, `set_options`, `on_overlay_click`). Every call
//! returns a [`SheetUpdate`] carrying the host callbacks to fire, in order,
//! plus [`SheetChanges`] describing what needs re-rendering.
//!
//! # Invariants
//!
//! 1. When no drag is active, `translate_y_px` equals the snap offset of
//!    `current_snap_index` while open, and the available height while closed.
//!    The one exception is a dismiss-drag waiting for the host to close.
//! 2. Resize and option changes recompute from `current_snap_index`, never
//!    from previous pixel values, so repeated recomputes cannot drift.
//! 3. Closing discards an active drag without resolving a snap.
//! 4. No entry point panics or returns an error for any input.
//!
//! # Failure Modes
//!
//! | Input | Behavior |
//! |-------|----------|
//! | Empty snap points | single snap at ratio `1.0` |
//! | Container not measured | viewport height |
//! | Available height `0` | snap offsets and progress are `0` |
//! | Samples while idle or closed | ignored, reported as drag no-ops |

use bitflags::bitflags;

use crate::drag::{
    DragEffect, DragGeometry, DragNoopReason, DragState, DragTransition, SheetDragMachine,
};
use crate::event::{DragCancelReason, InputSource, PointerPhase, PointerSample};
use crate::geometry::{SheetMeasurement, available_height_px, progress_ratio};
use crate::options::{DISMISS_THRESHOLD_RATIO, SheetOptions};
use crate::snap::SnapConfiguration;

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

/// Committed resting state plus the offset currently driving the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetPosition {
    pub current_snap_index: usize,
    pub translate_y_px: f64,
}

/// Host callback to fire.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "signal", content = "value", rename_all = "snake_case"))]
pub enum SheetSignal {
    /// `onClose`: overlay click or dismiss-drag.
    Close,
    /// `onProgressChange` with the openness ratio.
    Progress(f64),
}

bitflags! {
    /// Aspects of the sheet that changed during one update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SheetChanges: u8 {
        const POSITION = 0b0000_0001;
        const OPEN = 0b0000_0010;
        const DRAGGING = 0b0000_0100;
        const OVERLAY = 0b0000_1000;
        const SNAP_INDEX = 0b0001_0000;
        const GEOMETRY = 0b0010_0000;
    }
}

/// Receiver for sheet callbacks.
pub trait SheetHost {
    fn on_close(&mut self);

    /// Optional; the default ignores progress.
    fn on_progress_change(&mut self, progress: f64) {
        let _ = progress;
    }
}

/// Result of one controller call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetUpdate {
    pub signals: Vec<SheetSignal>,
    pub drag: Option<DragTransition>,
    pub changes: SheetChanges,
}

impl SheetUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.changes.is_empty()
    }

    /// Whether `onClose` should fire.
    #[must_use]
    pub fn requests_close(&self) -> bool {
        self.signals.contains(&SheetSignal::Close)
    }

    /// Last progress value pushed in this update.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.signals.iter().rev().find_map(|signal| match signal {
            SheetSignal::Progress(progress) => Some(*progress),
            SheetSignal::Close => None,
        })
    }

    /// Forward signals to `host` in the order they were produced.
    pub fn deliver<H: SheetHost + ?Sized>(&self, host: &mut H) {
        for signal in &self.signals {
            match signal {
                SheetSignal::Close => host.on_close(),
                SheetSignal::Progress(progress) => host.on_progress_change(*progress),
            }
        }
    }

    fn merge(&mut self, other: SheetUpdate) {
        self.signals.extend(other.signals);
        self.changes |= other.changes;
        if other.drag.is_some() {
            self.drag = other.drag;
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetLayout {
    pub is_open: bool,
    pub is_dragging: bool,
    pub translate_y_px: f64,
    pub progress: f64,
    pub available_height_px: f64,
    pub bottom_offset_px: f64,
    pub overlay_visible: bool,
    pub top_accessory_visible: bool,
    pub transition_ms: u32,
}

/// Drag/snap controller for one bottom sheet.
#[derive(Debug, Clone)]
pub struct SheetController {
    options: SheetOptions,
    snaps: SnapConfiguration,
    measurement: SheetMeasurement,
    available_height_px: f64,
    position: SheetPosition,
    drag: SheetDragMachine,
    sequence: u64,
}

impl SheetController {
    /// Build a controller. Call [`mount`](Self::mount) to emit initial state.
    #[must_use]
    pub fn new(options: SheetOptions, measurement: SheetMeasurement) -> Self {
        let snaps = SnapConfiguration::new(&options.snap_points);
        let available = available_height_px(&measurement, options.effective_bottom_offset_px());
        let current_snap_index = snaps.clamp_index(options.initial_snap_index);
        let translate_y_px = if options.is_open {
            snaps.offset_px(current_snap_index, available)
        } else {
            available
        };
        Self {
            options,
            snaps,
            measurement,
            available_height_px: available,
            position: SheetPosition {
                current_snap_index,
                translate_y_px,
            },
            drag: SheetDragMachine::new(),
            sequence: 0,
        }
    }

    /// Emit the initial position and progress.
    pub fn mount(&mut self) -> SheetUpdate {
        debug!(
            is_open = self.options.is_open,
            snaps = self.snaps.len(),
            "sheet mounted"
        );
        let mut update = SheetUpdate {
            changes: SheetChanges::POSITION | SheetChanges::OPEN | SheetChanges::GEOMETRY,
            ..SheetUpdate::default()
        };
        if self.overlay_visible() {
            update.changes |= SheetChanges::OVERLAY;
        }
        update.signals.push(SheetSignal::Progress(self.progress()));
        update
    }

    #[must_use]
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    #[must_use]
    pub fn snap_configuration(&self) -> &SnapConfiguration {
        &self.snaps
    }

    #[must_use]
    pub fn measurement(&self) -> SheetMeasurement {
        self.measurement
    }

    #[must_use]
    pub fn available_height_px(&self) -> f64 {
        self.available_height_px
    }

    #[must_use]
    pub fn position(&self) -> SheetPosition {
        self.position
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.options.is_open
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.options.is_open && self.options.show_overlay
    }

    /// Current openness in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        progress_ratio(self.position.translate_y_px, self.available_height_px)
    }

    #[must_use]
    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            is_open: self.options.is_open,
            is_dragging: self.is_dragging(),
            translate_y_px: self.position.translate_y_px,
            progress: self.progress(),
            available_height_px: self.available_height_px,
            bottom_offset_px: self.options.effective_bottom_offset_px(),
            overlay_visible: self.overlay_visible(),
            top_accessory_visible: self.options.is_open && self.options.has_top_accessory,
            transition_ms: self.options.transition_ms,
        }
    }

    /// Open or close the sheet.
    pub fn set_open(&mut self, is_open: bool) -> SheetUpdate {
        if is_open == self.options.is_open {
            return SheetUpdate::default();
        }
        self.options.is_open = is_open;
        let mut update = SheetUpdate {
            changes: SheetChanges::OPEN,
            ..SheetUpdate::default()
        };
        if self.options.show_overlay {
            update.changes |= SheetChanges::OVERLAY;
        }
        if is_open {
            let index = self.snaps.clamp_index(self.options.initial_snap_index);
            self.commit_index(index, &mut update);
            debug!(
                snap_index = self.position.current_snap_index,
                translate_y_px = self.position.translate_y_px,
                "sheet opened"
            );
        } else {
            let sequence = self.next_sequence();
            if let Some(transition) = self
                .drag
                .force_cancel(DragCancelReason::SheetClosed, sequence)
            {
                update.drag = Some(transition);
                update.changes |= SheetChanges::DRAGGING;
                debug!("drag discarded by close");
            }
            let hidden = self.available_height_px;
            let _ = self.set_translate(hidden, &mut update);
            update.signals.push(SheetSignal::Progress(0.0));
            debug!("sheet closed");
        }
        update
    }

    /// Apply a new set of options, diffing against the current ones.
    pub fn set_options(&mut self, options: SheetOptions) -> SheetUpdate {
        let mut update = SheetUpdate::default();
        let previous = std::mem::replace(&mut self.options, options);
        let next_open = self.options.is_open;
        // The open transition is applied last, from the previous open state.
        self.options.is_open = previous.is_open;

        if self.options.show_overlay != previous.show_overlay && self.options.is_open {
            update.changes |= SheetChanges::OVERLAY;
        }

        let snaps_changed = self.options.snap_points != previous.snap_points;
        if snaps_changed {
            self.snaps = SnapConfiguration::new(&self.options.snap_points);
        }
        let index_reset = self.options.initial_snap_index != previous.initial_snap_index;
        let bottom_changed = self.options.effective_bottom_offset_px().to_bits()
            != previous.effective_bottom_offset_px().to_bits();

        if snaps_changed || index_reset || bottom_changed {
            let index = if index_reset {
                self.snaps.clamp_index(self.options.initial_snap_index)
            } else {
                self.position
                    .current_snap_index
                    .min(self.snaps.len().saturating_sub(1))
            };
            if index != self.position.current_snap_index {
                self.position.current_snap_index = index;
                update.changes |= SheetChanges::SNAP_INDEX;
            }
            self.recompute(&mut update);
        }

        if next_open != self.options.is_open {
            update.merge(self.set_open(next_open));
        }
        update
    }

    /// Container or viewport size changed.
    pub fn on_resize(&mut self, measurement: SheetMeasurement) -> SheetUpdate {
        let mut update = SheetUpdate::default();
        self.measurement = measurement;
        self.recompute(&mut update);
        update
    }

    /// Feed one pointer sample from either input adapter.
    pub fn on_pointer(&mut self, sample: PointerSample) -> SheetUpdate {
        let sequence = self.next_sequence();
        let mut update = SheetUpdate::default();

        if sample.phase == PointerPhase::Start && !self.options.is_open {
            let transition = self.drag.reject(DragNoopReason::SheetClosed, sequence);
            trace!(source = ?sample.source, "pointer start ignored while closed");
            update.drag = Some(transition);
            return update;
        }

        let geometry = self.drag_geometry();
        let transition = self.drag.apply(sample, geometry, sequence);
        update.drag = Some(transition);

        match transition.effect {
            DragEffect::Started {
                base_offset_px,
                source: _source,
                ..
            } => {
                debug!(source = ?_source, base_offset_px, "drag started");
                update.changes |= SheetChanges::DRAGGING;
                if self.set_translate(base_offset_px, &mut update) {
                    update.signals.push(SheetSignal::Progress(self.progress()));
                }
            }
            DragEffect::Moved { live_offset_px, .. } => {
                // Every accepted move reports progress, even when clamped.
                let _ = self.set_translate(live_offset_px, &mut update);
                update.signals.push(SheetSignal::Progress(self.progress()));
            }
            DragEffect::Released {
                live_offset_px,
                source,
                ..
            } => {
                update.changes |= SheetChanges::DRAGGING;
                self.release(live_offset_px, source, &mut update);
            }
            DragEffect::Canceled { reason, .. } => {
                update.changes |= SheetChanges::DRAGGING;
                self.revert(reason, &mut update);
            }
            DragEffect::Noop { reason: _reason } => {
                trace!(reason = ?_reason, phase = ?sample.phase, "pointer sample ignored");
            }
        }
        update
    }

    pub fn pointer_down(&mut self, source: InputSource, client_y: f64) -> SheetUpdate {
        self.on_pointer(PointerSample::start(source, client_y))
    }

    pub fn pointer_move(&mut self, source: InputSource, client_y: f64) -> SheetUpdate {
        self.on_pointer(PointerSample::moved(source, client_y))
    }

    pub fn pointer_up(&mut self, source: InputSource, client_y: f64) -> SheetUpdate {
        self.on_pointer(PointerSample::end(source, client_y))
    }

    pub fn pointer_cancel(&mut self, source: InputSource) -> SheetUpdate {
        self.on_pointer(PointerSample::cancel(source))
    }

    /// Abandon an active drag (blur, hidden tab) and return to the last
    /// committed snap.
    pub fn cancel_drag(&mut self, reason: DragCancelReason) -> SheetUpdate {
        let mut update = SheetUpdate::default();
        let sequence = self.next_sequence();
        if let Some(transition) = self.drag.force_cancel(reason, sequence) {
            update.drag = Some(transition);
            update.changes |= SheetChanges::DRAGGING;
            self.revert(reason, &mut update);
        }
        update
    }

    /// Scrim clicked. Closes regardless of `dismissible`.
    pub fn on_overlay_click(&mut self) -> SheetUpdate {
        let mut update = SheetUpdate::default();
        if self.overlay_visible() {
            debug!("overlay clicked");
            update.signals.push(SheetSignal::Close);
        }
        update
    }

    fn release(&mut self, live_offset_px: f64, _source: InputSource, update: &mut SheetUpdate) {
        let available = self.available_height_px;
        if self.options.dismissible && live_offset_px > available * DISMISS_THRESHOLD_RATIO {
            debug!(source = ?_source, live_offset_px, available, "drag dismissed sheet");
            let _ = self.set_translate(live_offset_px, update);
            update.signals.push(SheetSignal::Close);
            return;
        }
        let index = self.snaps.resolve_release(live_offset_px, available);
        debug!(source = ?_source, live_offset_px, snap_index = index, "drag released");
        self.commit_index(index, update);
    }

    fn revert(&mut self, _reason: DragCancelReason, update: &mut SheetUpdate) {
        debug!(reason = ?_reason, "drag canceled; reverting to committed snap");
        if self.options.is_open {
            let index = self.position.current_snap_index;
            self.commit_index(index, update);
        }
    }

    fn commit_index(&mut self, index: usize, update: &mut SheetUpdate) {
        if index != self.position.current_snap_index {
            self.position.current_snap_index = index;
            update.changes |= SheetChanges::SNAP_INDEX;
        }
        let offset = self.snaps.offset_px(index, self.available_height_px);
        let _ = self.set_translate(offset, update);
        update.signals.push(SheetSignal::Progress(self.progress()));
    }

    /// Re-derive geometry and position from the committed snap index.
    fn recompute(&mut self, update: &mut SheetUpdate) {
        let available = available_height_px(
            &self.measurement,
            self.options.effective_bottom_offset_px(),
        );
        let geometry_changed = available.to_bits() != self.available_height_px.to_bits();
        if geometry_changed {
            self.available_height_px = available;
            update.changes |= SheetChanges::GEOMETRY;
        }

        let geometry = self.drag_geometry();
        let target = if let Some(live) = self.drag.rebase(geometry) {
            live
        } else if self.options.is_open {
            self.snaps
                .offset_px(self.position.current_snap_index, available)
        } else {
            available
        };
        let moved = self.set_translate(target, update);
        if geometry_changed || moved {
            update.signals.push(SheetSignal::Progress(self.progress()));
        }
    }

    /// Returns whether the offset changed.
    fn set_translate(&mut self, translate_y_px: f64, update: &mut SheetUpdate) -> bool {
        if translate_y_px.to_bits() == self.position.translate_y_px.to_bits() {
            return false;
        }
        self.position.translate_y_px = translate_y_px;
        update.changes |= SheetChanges::POSITION;
        true
    }

    fn drag_geometry(&self) -> DragGeometry {
        DragGeometry {
            base_offset_px: self
                .snaps
                .offset_px(self.position.current_snap_index, self.available_height_px),
            bounds: self.snaps.bounds(self.available_height_px),
        }
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence = self.sequence.saturating_add(1);
        self.sequence
    }
}
