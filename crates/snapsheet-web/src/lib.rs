#![forbid(unsafe_code)]

//! `snapsheet-web` adapts browser input and DOM mounting onto
//! `snapsheet-core`.
//!
//! Design goals:
//! - **Host-driven**: the embedding JS layer forwards touch, mouse, resize,
//!   and lifecycle events; nothing here polls or owns a timer.
//! - **One input path**: touch and mouse adapters both reduce to
//!   [`PointerSample`](snapsheet_core::event::PointerSample) values and feed
//!   the same controller entry point.
//! - **Deterministic**: identical input sequences produce identical positions
//!   and callbacks, which [`session_record`] checks by checksum.
//!
//! This crate does not bind to `wasm-bindgen`; it provides the building
//! blocks a binding layer wraps.

#[cfg(feature = "input-parser")]
pub mod input_parser;
pub mod mount;
pub mod pointer_adapter;
pub mod session_record;
pub mod style;

use snapsheet_core::controller::{SheetController, SheetUpdate};
use snapsheet_core::event::PointerPhase;
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;

use crate::mount::{MountTarget, MountTargetCache, RenderTargetResolver, TargetId};
use crate::pointer_adapter::{
    AdapterDispatch, AdapterLogEntry, ListenerCommand, MouseAdapter, MouseButton, TouchAdapter,
};
use crate::style::SheetStyle;

/// Mouse event kinds the sheet listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// `mousedown` on the handle.
    Down,
    /// `mousemove` on the document.
    Move,
    /// `mouseup` on the document.
    Up,
}

/// One event forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    Touch {
        phase: PointerPhase,
        touch_id: u32,
        client_y: f64,
    },
    Mouse {
        kind: MouseEventKind,
        button: MouseButton,
        client_y: f64,
    },
    Resize(SheetMeasurement),
    SetOpen(bool),
    OverlayClick,
    /// `window` lost focus.
    Blur,
    /// `visibilitychange` to hidden.
    VisibilityHidden,
}

impl HostInput {
    /// Stable lowercase name, used in logs and traces.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Touch { .. } => "touch",
            Self::Mouse { .. } => "mouse",
            Self::Resize(_) => "resize",
            Self::SetOpen(_) => "open",
            Self::OverlayClick => "overlay",
            Self::Blur => "blur",
            Self::VisibilityHidden => "visibility",
        }
    }
}

/// Outcome of [`WebSheet::dispatch`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WebDispatch {
    pub update: SheetUpdate,
    pub listener_command: Option<ListenerCommand>,
    /// Adapter log entry, present for pointer and focus events.
    pub log: Option<AdapterLogEntry>,
    /// The sheet moved to a different render target.
    pub mount_target_changed: bool,
}

impl From<AdapterDispatch> for WebDispatch {
    fn from(dispatch: AdapterDispatch) -> Self {
        Self {
            update: dispatch.update,
            listener_command: dispatch.listener_command,
            log: Some(dispatch.log),
            mount_target_changed: false,
        }
    }
}

impl From<SheetUpdate> for WebDispatch {
    fn from(update: SheetUpdate) -> Self {
        Self {
            update,
            ..Self::default()
        }
    }
}

/// A sheet controller wired to both pointer adapters and its mount target.
#[derive(Debug, Clone)]
pub struct WebSheet {
    controller: SheetController,
    touch: TouchAdapter,
    mouse: MouseAdapter,
    mount: MountTargetCache<TargetId>,
}

impl WebSheet {
    #[must_use]
    pub fn new(options: SheetOptions, measurement: SheetMeasurement) -> Self {
        Self {
            controller: SheetController::new(options, measurement),
            touch: TouchAdapter::new(),
            mouse: MouseAdapter::new(),
            mount: MountTargetCache::new(),
        }
    }

    /// Mount in place, ignoring any `container_selector`.
    pub fn mount(&mut self) -> SheetUpdate {
        self.controller.mount()
    }

    /// Resolve the `container_selector` through `resolver`, then mount.
    pub fn mount_with<R>(&mut self, resolver: &mut R) -> SheetUpdate
    where
        R: RenderTargetResolver<Handle = TargetId> + ?Sized,
    {
        self.resolve_mount_target(resolver);
        self.controller.mount()
    }

    /// Where the sheet should render. `InPlace` until a selector resolves.
    #[must_use]
    pub fn mount_target(&self) -> &MountTarget<TargetId> {
        self.mount.target()
    }

    /// Number of selector lookups performed so far.
    #[must_use]
    pub fn mount_resolutions(&self) -> u64 {
        self.mount.resolutions()
    }

    #[must_use]
    pub fn controller(&self) -> &SheetController {
        &self.controller
    }

    #[must_use]
    pub fn touch_adapter(&self) -> &TouchAdapter {
        &self.touch
    }

    #[must_use]
    pub fn mouse_adapter(&self) -> &MouseAdapter {
        &self.mouse
    }

    /// Inline styles for the current layout.
    #[must_use]
    pub fn style(&self) -> SheetStyle {
        SheetStyle::from_layout(&self.controller.layout())
    }

    /// Apply new host options. A changed `container_selector` is resolved
    /// through `resolver`; closing mid mouse-drag also returns the pending
    /// document listener detach.
    pub fn set_options<R>(&mut self, options: SheetOptions, resolver: &mut R) -> WebDispatch
    where
        R: RenderTargetResolver<Handle = TargetId> + ?Sized,
    {
        let update = self.controller.set_options(options);
        let mount_target_changed = self.resolve_mount_target(resolver);
        WebDispatch {
            update,
            listener_command: self.mouse.reconcile(&self.controller),
            log: None,
            mount_target_changed,
        }
    }

    fn resolve_mount_target<R>(&mut self, resolver: &mut R) -> bool
    where
        R: RenderTargetResolver<Handle = TargetId> + ?Sized,
    {
        let selector = self.controller.options().container_selector.as_deref();
        self.mount.update(selector, resolver)
    }

    pub fn dispatch(&mut self, input: HostInput) -> WebDispatch {
        let sheet = &mut self.controller;
        match input {
            HostInput::Touch {
                phase,
                touch_id,
                client_y,
            } => match phase {
                PointerPhase::Start => self.touch.touch_start(sheet, touch_id, client_y),
                PointerPhase::Move => self.touch.touch_move(sheet, touch_id, client_y),
                PointerPhase::End => self.touch.touch_end(sheet, touch_id, client_y),
                PointerPhase::Cancel => self.touch.touch_cancel(sheet, touch_id),
            }
            .into(),
            HostInput::Mouse {
                kind,
                button,
                client_y,
            } => match kind {
                MouseEventKind::Down => self.mouse.mouse_down(sheet, button, client_y),
                MouseEventKind::Move => self.mouse.mouse_move(sheet, client_y),
                MouseEventKind::Up => self.mouse.mouse_up(sheet, client_y),
            }
            .into(),
            HostInput::Resize(measurement) => sheet.on_resize(measurement).into(),
            HostInput::SetOpen(is_open) => {
                let update = sheet.set_open(is_open);
                WebDispatch {
                    update,
                    listener_command: self.mouse.reconcile(sheet),
                    ..WebDispatch::default()
                }
            }
            HostInput::OverlayClick => sheet.on_overlay_click().into(),
            HostInput::Blur => {
                if self.mouse.is_active() {
                    self.mouse.blur(sheet).into()
                } else {
                    self.touch.blur(sheet).into()
                }
            }
            HostInput::VisibilityHidden => {
                if self.mouse.is_active() {
                    self.mouse.visibility_hidden(sheet).into()
                } else {
                    self.touch.visibility_hidden(sheet).into()
                }
            }
        }
    }
}
