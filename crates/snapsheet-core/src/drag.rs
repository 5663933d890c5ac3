#![forbid(unsafe_code)]

//! Drag lifecycle machine for the sheet handle.
//!
//! ```text
//! Idle --Start--> Dragging --Move--> Dragging --End/Cancel--> Idle
//! ```
//!
//! The machine only tracks pixels. It does not decide where the sheet comes
//! to rest; the controller resolves snaps and dismissal from the
//! [`DragEffect::Released`] it reports.
//!
//! # Invariants
//!
//! 1. At most one session exists at a time. A `Start` while dragging is a
//!    no-op, as is any sample from a different [`InputSource`].
//! 2. `live_offset_px` always lies inside the [`OffsetBounds`] most recently
//!    supplied for the session.
//! 3. Samples that arrive while idle never change state.
//! 4. `transition_id` strictly increases across every call that returns a
//!    transition.

use crate::event::{DragCancelReason, InputSource, PointerPhase, PointerSample};
use crate::geometry::OffsetBounds;

/// State of one active drag, created on `Start` and dropped on `End`/`Cancel`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragSession {
    pub source: InputSource,
    /// Client Y captured once at session start.
    pub pointer_start_y: f64,
    /// Latest accepted client Y.
    pub current_y: f64,
    /// Committed snap offset when the session started.
    pub base_offset_px: f64,
    pub live_offset_px: f64,
    pub started_sequence: u64,
}

impl DragSession {
    /// Pointer travel since session start; positive means downward.
    #[must_use]
    pub fn total_delta_y(&self) -> f64 {
        self.current_y - self.pointer_start_y
    }
}

/// Deterministic drag lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }
}

/// Why an incoming sample was safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    SourceMismatch,
    NonFiniteCoordinate,
    SheetClosed,
}

/// Effect emitted by one lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "effect", rename_all = "snake_case"))]
pub enum DragEffect {
    Started {
        source: InputSource,
        pointer_start_y: f64,
        base_offset_px: f64,
    },
    Moved {
        source: InputSource,
        previous_offset_px: f64,
        live_offset_px: f64,
        total_delta_y: f64,
    },
    Released {
        source: InputSource,
        live_offset_px: f64,
        total_delta_y: f64,
    },
    Canceled {
        source: Option<InputSource>,
        reason: DragCancelReason,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One machine transition with telemetry fields.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragTransition {
    pub transition_id: u64,
    pub sequence: u64,
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

impl DragTransition {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self.effect, DragEffect::Noop { .. })
    }
}

/// Geometry the controller resolves for each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGeometry {
    /// Offset of the committed snap; read on `Start` only.
    pub base_offset_px: f64,
    pub bounds: OffsetBounds,
}

/// Drag lifecycle machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetDragMachine {
    state: DragState,
    transition_counter: u64,
}

impl SheetDragMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.state.session()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Apply one pointer sample.
    pub fn apply(
        &mut self,
        sample: PointerSample,
        geometry: DragGeometry,
        sequence: u64,
    ) -> DragTransition {
        let from = self.state;
        let effect = match (self.state, sample.phase) {
            (DragState::Idle, PointerPhase::Start) => {
                if sample.client_y.is_finite() {
                    let base_offset_px = geometry.bounds.clamp(geometry.base_offset_px);
                    self.state = DragState::Dragging(DragSession {
                        source: sample.source,
                        pointer_start_y: sample.client_y,
                        current_y: sample.client_y,
                        base_offset_px,
                        live_offset_px: base_offset_px,
                        started_sequence: sequence,
                    });
                    DragEffect::Started {
                        source: sample.source,
                        pointer_start_y: sample.client_y,
                        base_offset_px,
                    }
                } else {
                    DragEffect::Noop {
                        reason: DragNoopReason::NonFiniteCoordinate,
                    }
                }
            }
            (DragState::Idle, _) => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            (DragState::Dragging(_), PointerPhase::Start) => DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress,
            },
            (DragState::Dragging(session), _) if session.source != sample.source => {
                DragEffect::Noop {
                    reason: DragNoopReason::SourceMismatch,
                }
            }
            (DragState::Dragging(mut session), PointerPhase::Move) => {
                if sample.client_y.is_finite() {
                    let previous_offset_px = session.live_offset_px;
                    track(&mut session, sample.client_y, geometry.bounds);
                    self.state = DragState::Dragging(session);
                    DragEffect::Moved {
                        source: session.source,
                        previous_offset_px,
                        live_offset_px: session.live_offset_px,
                        total_delta_y: session.total_delta_y(),
                    }
                } else {
                    DragEffect::Noop {
                        reason: DragNoopReason::NonFiniteCoordinate,
                    }
                }
            }
            (DragState::Dragging(mut session), PointerPhase::End) => {
                if sample.client_y.is_finite() {
                    track(&mut session, sample.client_y, geometry.bounds);
                } else {
                    session.live_offset_px = geometry.bounds.clamp(session.live_offset_px);
                }
                self.state = DragState::Idle;
                DragEffect::Released {
                    source: session.source,
                    live_offset_px: session.live_offset_px,
                    total_delta_y: session.total_delta_y(),
                }
            }
            (DragState::Dragging(session), PointerPhase::Cancel) => {
                self.state = DragState::Idle;
                DragEffect::Canceled {
                    source: Some(session.source),
                    reason: DragCancelReason::PointerCancel,
                }
            }
        };
        self.record(sequence, from, effect)
    }

    /// Report a sample the controller refused before it reached the machine.
    pub fn reject(&mut self, reason: DragNoopReason, sequence: u64) -> DragTransition {
        self.record(sequence, self.state, DragEffect::Noop { reason })
    }

    /// Drop the active session, if any, without releasing it.
    pub fn force_cancel(
        &mut self,
        reason: DragCancelReason,
        sequence: u64,
    ) -> Option<DragTransition> {
        let DragState::Dragging(session) = self.state else {
            return None;
        };
        let from = self.state;
        self.state = DragState::Idle;
        Some(self.record(
            sequence,
            from,
            DragEffect::Canceled {
                source: Some(session.source),
                reason,
            },
        ))
    }

    /// Re-derive the active session from new geometry after a resize.
    ///
    /// The pointer travel is kept; the base offset is replaced and the live
    /// offset re-clamped. Returns the new live offset.
    pub fn rebase(&mut self, geometry: DragGeometry) -> Option<f64> {
        let DragState::Dragging(mut session) = self.state else {
            return None;
        };
        session.base_offset_px = geometry.bounds.clamp(geometry.base_offset_px);
        let current_y = session.current_y;
        track(&mut session, current_y, geometry.bounds);
        self.state = DragState::Dragging(session);
        Some(session.live_offset_px)
    }

    fn record(&mut self, sequence: u64, from: DragState, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragTransition {
            transition_id: self.transition_counter,
            sequence,
            from,
            to: self.state,
            effect,
        }
    }
}

fn track(session: &mut DragSession, client_y: f64, bounds: OffsetBounds) {
    session.current_y = client_y;
    session.live_offset_px = bounds.clamp(session.base_offset_px + session.total_delta_y());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(base: f64) -> DragGeometry {
        DragGeometry {
            base_offset_px: base,
            bounds: OffsetBounds {
                min_px: 100.0,
                max_px: 1000.0,
            },
        }
    }

    #[test]
    fn start_move_release_tracks_live_offset() {
        let mut machine = SheetDragMachine::new();
        let t = machine.apply(PointerSample::start(InputSource::Touch, 700.0), geometry(700.0), 1);
        assert!(matches!(t.effect, DragEffect::Started { .. }));
        assert!(machine.is_active());

        let t = machine.apply(PointerSample::moved(InputSource::Touch, 450.0), geometry(700.0), 2);
        assert!(matches!(
            t.effect,
            DragEffect::Moved { live_offset_px, .. } if live_offset_px == 450.0
        ));

        let t = machine.apply(PointerSample::end(InputSource::Touch, 450.0), geometry(700.0), 3);
        assert!(matches!(
            t.effect,
            DragEffect::Released { live_offset_px, total_delta_y, .. }
                if live_offset_px == 450.0 && total_delta_y == -250.0
        ));
        assert_eq!(machine.state(), DragState::Idle);
    }

    #[test]
    fn live_offset_is_clamped() {
        let mut machine = SheetDragMachine::new();
        machine.apply(PointerSample::start(InputSource::Mouse, 500.0), geometry(700.0), 1);
        machine.apply(PointerSample::moved(InputSource::Mouse, -5000.0), geometry(700.0), 2);
        assert_eq!(machine.session().map(|s| s.live_offset_px), Some(100.0));
        machine.apply(PointerSample::moved(InputSource::Mouse, 5000.0), geometry(700.0), 3);
        assert_eq!(machine.session().map(|s| s.live_offset_px), Some(1000.0));
    }

    #[test]
    fn idle_samples_are_noops() {
        let mut machine = SheetDragMachine::new();
        for sample in [
            PointerSample::moved(InputSource::Touch, 10.0),
            PointerSample::end(InputSource::Touch, 10.0),
            PointerSample::cancel(InputSource::Mouse),
        ] {
            let t = machine.apply(sample, geometry(700.0), 1);
            assert_eq!(
                t.effect,
                DragEffect::Noop {
                    reason: DragNoopReason::IdleWithoutActiveDrag
                }
            );
            assert_eq!(t.to, DragState::Idle);
        }
    }

    #[test]
    fn second_start_and_other_source_are_ignored() {
        let mut machine = SheetDragMachine::new();
        machine.apply(PointerSample::start(InputSource::Touch, 700.0), geometry(700.0), 1);
        let before = machine.state();

        let t = machine.apply(PointerSample::start(InputSource::Touch, 10.0), geometry(700.0), 2);
        assert_eq!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress
            }
        );
        let t = machine.apply(PointerSample::moved(InputSource::Mouse, 10.0), geometry(700.0), 3);
        assert_eq!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::SourceMismatch
            }
        );
        assert_eq!(machine.state(), before);
    }

    #[test]
    fn non_finite_move_is_ignored() {
        let mut machine = SheetDragMachine::new();
        machine.apply(PointerSample::start(InputSource::Touch, 700.0), geometry(700.0), 1);
        let t = machine.apply(
            PointerSample::moved(InputSource::Touch, f64::NAN),
            geometry(700.0),
            2,
        );
        assert!(t.is_noop());
        assert_eq!(machine.session().map(|s| s.live_offset_px), Some(700.0));
    }

    #[test]
    fn cancel_and_force_cancel_return_to_idle() {
        let mut machine = SheetDragMachine::new();
        machine.apply(PointerSample::start(InputSource::Touch, 700.0), geometry(700.0), 1);
        let t = machine.apply(PointerSample::cancel(InputSource::Touch), geometry(700.0), 2);
        assert_eq!(
            t.effect,
            DragEffect::Canceled {
                source: Some(InputSource::Touch),
                reason: DragCancelReason::PointerCancel
            }
        );

        assert!(
            machine
                .force_cancel(DragCancelReason::SheetClosed, 3)
                .is_none()
        );
        machine.apply(PointerSample::start(InputSource::Mouse, 700.0), geometry(700.0), 4);
        let t = machine
            .force_cancel(DragCancelReason::SheetClosed, 5)
            .expect("active session should cancel");
        assert_eq!(t.to, DragState::Idle);
    }

    #[test]
    fn rebase_keeps_pointer_travel() {
        let mut machine = SheetDragMachine::new();
        machine.apply(PointerSample::start(InputSource::Touch, 700.0), geometry(700.0), 1);
        machine.apply(PointerSample::moved(InputSource::Touch, 600.0), geometry(700.0), 2);
        let live = machine.rebase(geometry(500.0));
        assert_eq!(live, Some(400.0));
        assert_eq!(machine.rebase(geometry(500.0)), Some(400.0));
    }

    #[test]
    fn transition_ids_increase() {
        let mut machine = SheetDragMachine::new();
        let a = machine.apply(PointerSample::moved(InputSource::Touch, 1.0), geometry(0.0), 1);
        let b = machine.reject(DragNoopReason::SheetClosed, 2);
        assert!(b.transition_id > a.transition_id);
    }
}
