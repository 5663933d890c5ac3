#![forbid(unsafe_code)]

//! Touch and mouse adapters for the sheet drag handle.
//!
//! Both adapters reduce browser events to [`PointerSample`] values and feed
//! them to the same [`SheetController::on_pointer`] entry point, so the two
//! modalities cannot diverge. They differ only in listener plumbing:
//! - touch listens on the handle element; the browser keeps delivering a
//!   touch to its start target, so no extra listeners are needed;
//! - mouse starts on the handle, then asks the host to attach document-level
//!   `mousemove`/`mouseup` listeners for the rest of the drag so it survives
//!   the cursor leaving the handle.
//!
//! Each call returns an [`AdapterDispatch`] with a structured log entry,
//! whether or not the event was forwarded.

use snapsheet_core::controller::{SheetController, SheetUpdate};
use snapsheet_core::drag::{DragEffect, DragNoopReason};
use snapsheet_core::event::{DragCancelReason, InputSource, PointerSample};

/// DOM `MouseEvent.button` values the adapter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl MouseButton {
    #[must_use]
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// Host command for document-level mouse listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerCommand {
    AttachDocument,
    DetachDocument,
}

/// Browser lifecycle signal recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterPhase {
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    MouseDown,
    MouseMove,
    MouseUp,
    Blur,
    VisibilityHidden,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterIgnoredReason {
    ButtonNotAllowed,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    TouchIdMismatch,
    SheetClosed,
    ControllerRejected(DragNoopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterLogOutcome {
    Forwarded,
    Ignored(AdapterIgnoredReason),
}

/// Structured log record for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdapterLogEntry {
    pub phase: AdapterPhase,
    pub sequence: u64,
    pub client_y: Option<f64>,
    pub listener_command: Option<ListenerCommand>,
    pub outcome: AdapterLogOutcome,
}

/// Result of one adapter call.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterDispatch {
    pub update: SheetUpdate,
    pub listener_command: Option<ListenerCommand>,
    pub log: AdapterLogEntry,
}

impl AdapterDispatch {
    fn ignored(
        phase: AdapterPhase,
        sequence: u64,
        client_y: Option<f64>,
        reason: AdapterIgnoredReason,
        listener_command: Option<ListenerCommand>,
    ) -> Self {
        Self {
            update: SheetUpdate::default(),
            listener_command,
            log: AdapterLogEntry {
                phase,
                sequence,
                client_y,
                listener_command,
                outcome: AdapterLogOutcome::Ignored(reason),
            },
        }
    }

    #[must_use]
    pub const fn was_forwarded(&self) -> bool {
        matches!(self.log.outcome, AdapterLogOutcome::Forwarded)
    }
}

fn forward(
    sheet: &mut SheetController,
    sample: PointerSample,
    phase: AdapterPhase,
    sequence: u64,
    listener_command: Option<ListenerCommand>,
) -> AdapterDispatch {
    let client_y = sample.client_y.is_finite().then_some(sample.client_y);
    let update = sheet.on_pointer(sample);
    let outcome = match update.drag.map(|transition| transition.effect) {
        Some(DragEffect::Noop {
            reason: DragNoopReason::SheetClosed,
        }) => AdapterLogOutcome::Ignored(AdapterIgnoredReason::SheetClosed),
        Some(DragEffect::Noop { reason }) => {
            AdapterLogOutcome::Ignored(AdapterIgnoredReason::ControllerRejected(reason))
        }
        _ => AdapterLogOutcome::Forwarded,
    };
    let listener_command = match outcome {
        AdapterLogOutcome::Forwarded => listener_command,
        AdapterLogOutcome::Ignored(_) => None,
    };
    AdapterDispatch {
        update,
        listener_command,
        log: AdapterLogEntry {
            phase,
            sequence,
            client_y,
            listener_command,
            outcome,
        },
    }
}

fn interrupt(
    sheet: &mut SheetController,
    phase: AdapterPhase,
    sequence: u64,
    listener_command: Option<ListenerCommand>,
) -> AdapterDispatch {
    let reason = match phase {
        AdapterPhase::VisibilityHidden => DragCancelReason::VisibilityHidden,
        _ => DragCancelReason::Blur,
    };
    AdapterDispatch {
        update: sheet.cancel_drag(reason),
        listener_command,
        log: AdapterLogEntry {
            phase,
            sequence,
            client_y: None,
            listener_command,
            outcome: AdapterLogOutcome::Forwarded,
        },
    }
}

/// Touch adapter bound to the handle element.
///
/// Tracks the identifier of the touch that started the drag; other touches
/// are ignored until it ends.
#[derive(Debug, Clone, Default)]
pub struct TouchAdapter {
    active_touch: Option<u32>,
    next_sequence: u64,
}

impl TouchAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn active_touch_id(&self) -> Option<u32> {
        self.active_touch
    }

    pub fn touch_start(
        &mut self,
        sheet: &mut SheetController,
        touch_id: u32,
        client_y: f64,
    ) -> AdapterDispatch {
        self.reconcile(sheet);
        let sequence = self.next_sequence();
        if self.active_touch.is_some() {
            return AdapterDispatch::ignored(
                AdapterPhase::TouchStart,
                sequence,
                Some(client_y),
                AdapterIgnoredReason::ActivePointerAlreadyInProgress,
                None,
            );
        }
        let dispatch = forward(
            sheet,
            PointerSample::start(InputSource::Touch, client_y),
            AdapterPhase::TouchStart,
            sequence,
            None,
        );
        if dispatch.was_forwarded() {
            self.active_touch = Some(touch_id);
        }
        dispatch
    }

    pub fn touch_move(
        &mut self,
        sheet: &mut SheetController,
        touch_id: u32,
        client_y: f64,
    ) -> AdapterDispatch {
        let sequence = self.next_sequence();
        if let Some(ignored) = self.check_active(sheet, AdapterPhase::TouchMove, touch_id, sequence)
        {
            return ignored;
        }
        forward(
            sheet,
            PointerSample::moved(InputSource::Touch, client_y),
            AdapterPhase::TouchMove,
            sequence,
            None,
        )
    }

    pub fn touch_end(
        &mut self,
        sheet: &mut SheetController,
        touch_id: u32,
        client_y: f64,
    ) -> AdapterDispatch {
        let sequence = self.next_sequence();
        if let Some(ignored) = self.check_active(sheet, AdapterPhase::TouchEnd, touch_id, sequence) {
            return ignored;
        }
        self.active_touch = None;
        forward(
            sheet,
            PointerSample::end(InputSource::Touch, client_y),
            AdapterPhase::TouchEnd,
            sequence,
            None,
        )
    }

    pub fn touch_cancel(&mut self, sheet: &mut SheetController, touch_id: u32) -> AdapterDispatch {
        let sequence = self.next_sequence();
        if let Some(ignored) =
            self.check_active(sheet, AdapterPhase::TouchCancel, touch_id, sequence)
        {
            return ignored;
        }
        self.active_touch = None;
        forward(
            sheet,
            PointerSample::cancel(InputSource::Touch),
            AdapterPhase::TouchCancel,
            sequence,
            None,
        )
    }

    pub fn blur(&mut self, sheet: &mut SheetController) -> AdapterDispatch {
        self.interrupt(sheet, AdapterPhase::Blur)
    }

    pub fn visibility_hidden(&mut self, sheet: &mut SheetController) -> AdapterDispatch {
        self.interrupt(sheet, AdapterPhase::VisibilityHidden)
    }

    fn interrupt(&mut self, sheet: &mut SheetController, phase: AdapterPhase) -> AdapterDispatch {
        self.reconcile(sheet);
        let sequence = self.next_sequence();
        if self.active_touch.take().is_none() {
            return AdapterDispatch::ignored(
                phase,
                sequence,
                None,
                AdapterIgnoredReason::NoActivePointer,
                None,
            );
        }
        interrupt(sheet, phase, sequence, None)
    }

    fn check_active(
        &mut self,
        sheet: &SheetController,
        phase: AdapterPhase,
        touch_id: u32,
        sequence: u64,
    ) -> Option<AdapterDispatch> {
        self.reconcile(sheet);
        match self.active_touch {
            None => Some(AdapterDispatch::ignored(
                phase,
                sequence,
                None,
                AdapterIgnoredReason::NoActivePointer,
                None,
            )),
            Some(active) if active != touch_id => Some(AdapterDispatch::ignored(
                phase,
                sequence,
                None,
                AdapterIgnoredReason::TouchIdMismatch,
                None,
            )),
            Some(_) => None,
        }
    }

    /// Forget the touch if the controller dropped the session (sheet closed).
    fn reconcile(&mut self, sheet: &SheetController) {
        if self.active_touch.is_some() && !sheet.is_dragging() {
            self.active_touch = None;
        }
    }

    fn next_sequence(&mut self) -> u64 {
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.next_sequence
    }
}

/// Mouse adapter: `mousedown` on the handle, then document listeners.
#[derive(Debug, Clone, Default)]
pub struct MouseAdapter {
    active: bool,
    document_listeners: bool,
    next_sequence: u64,
}

impl MouseAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the host should currently have document listeners attached.
    #[must_use]
    pub const fn document_listeners_attached(&self) -> bool {
        self.document_listeners
    }

    pub fn mouse_down(
        &mut self,
        sheet: &mut SheetController,
        button: MouseButton,
        client_y: f64,
    ) -> AdapterDispatch {
        let stale = self.reconcile(sheet);
        let sequence = self.next_sequence();
        if button != MouseButton::Primary {
            return AdapterDispatch::ignored(
                AdapterPhase::MouseDown,
                sequence,
                Some(client_y),
                AdapterIgnoredReason::ButtonNotAllowed,
                stale,
            );
        }
        if self.active {
            return AdapterDispatch::ignored(
                AdapterPhase::MouseDown,
                sequence,
                Some(client_y),
                AdapterIgnoredReason::ActivePointerAlreadyInProgress,
                None,
            );
        }
        let mut dispatch = forward(
            sheet,
            PointerSample::start(InputSource::Mouse, client_y),
            AdapterPhase::MouseDown,
            sequence,
            Some(ListenerCommand::AttachDocument),
        );
        if dispatch.was_forwarded() {
            self.active = true;
            self.document_listeners = true;
        } else if stale.is_some() {
            dispatch.listener_command = stale;
            dispatch.log.listener_command = stale;
        }
        dispatch
    }

    pub fn mouse_move(&mut self, sheet: &mut SheetController, client_y: f64) -> AdapterDispatch {
        let stale = self.reconcile(sheet);
        let sequence = self.next_sequence();
        if !self.active {
            return AdapterDispatch::ignored(
                AdapterPhase::MouseMove,
                sequence,
                Some(client_y),
                AdapterIgnoredReason::NoActivePointer,
                stale,
            );
        }
        forward(
            sheet,
            PointerSample::moved(InputSource::Mouse, client_y),
            AdapterPhase::MouseMove,
            sequence,
            None,
        )
    }

    /// `mouseup` on the document. Any button ends the drag.
    pub fn mouse_up(&mut self, sheet: &mut SheetController, client_y: f64) -> AdapterDispatch {
        let stale = self.reconcile(sheet);
        let sequence = self.next_sequence();
        if !self.active {
            return AdapterDispatch::ignored(
                AdapterPhase::MouseUp,
                sequence,
                Some(client_y),
                AdapterIgnoredReason::NoActivePointer,
                stale,
            );
        }
        self.active = false;
        self.document_listeners = false;
        let mut dispatch = forward(
            sheet,
            PointerSample::end(InputSource::Mouse, client_y),
            AdapterPhase::MouseUp,
            sequence,
            Some(ListenerCommand::DetachDocument),
        );
        dispatch.listener_command = Some(ListenerCommand::DetachDocument);
        dispatch.log.listener_command = Some(ListenerCommand::DetachDocument);
        dispatch
    }

    pub fn blur(&mut self, sheet: &mut SheetController) -> AdapterDispatch {
        self.interrupt(sheet, AdapterPhase::Blur)
    }

    pub fn visibility_hidden(&mut self, sheet: &mut SheetController) -> AdapterDispatch {
        self.interrupt(sheet, AdapterPhase::VisibilityHidden)
    }

    fn interrupt(&mut self, sheet: &mut SheetController, phase: AdapterPhase) -> AdapterDispatch {
        let stale = self.reconcile(sheet);
        let sequence = self.next_sequence();
        if !self.active {
            return AdapterDispatch::ignored(
                phase,
                sequence,
                None,
                AdapterIgnoredReason::NoActivePointer,
                stale,
            );
        }
        self.active = false;
        self.document_listeners = false;
        interrupt(sheet, phase, sequence, Some(ListenerCommand::DetachDocument))
    }

    /// Drop a session the controller already discarded. Returns the detach
    /// command still owed to the host, if any.
    pub fn reconcile(&mut self, sheet: &SheetController) -> Option<ListenerCommand> {
        if self.active && !sheet.is_dragging() {
            self.active = false;
        }
        if !self.active && self.document_listeners {
            self.document_listeners = false;
            return Some(ListenerCommand::DetachDocument);
        }
        None
    }

    fn next_sequence(&mut self) -> u64 {
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.next_sequence
    }
}
