#![forbid(unsafe_code)]

//! snapsheet public facade crate.
//!
//! Re-exports the controller from `snapsheet-core` and the browser adapters
//! from `snapsheet-web`, and offers a prelude for host code.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use snapsheet_core::controller::{
    SheetChanges, SheetController, SheetHost, SheetLayout, SheetPosition, SheetSignal, SheetUpdate,
};
pub use snapsheet_core::drag::{DragEffect, DragNoopReason, DragState, DragTransition};
pub use snapsheet_core::event::{DragCancelReason, InputSource, PointerPhase, PointerSample};
pub use snapsheet_core::geometry::{
    OffsetBounds, SheetMeasurement, available_height_px, progress_ratio, snap_px,
};
pub use snapsheet_core::options::{DISMISS_THRESHOLD_RATIO, SheetOptions};
pub use snapsheet_core::snap::SnapConfiguration;

// --- Web re-exports --------------------------------------------------------

pub use snapsheet_web::mount::{
    MountTarget, MountTargetCache, RenderTargetResolver, StaticRenderTargets, TargetId,
};
pub use snapsheet_web::pointer_adapter::{
    ListenerCommand, MouseAdapter, MouseButton, TouchAdapter,
};
pub use snapsheet_web::session_record::{
    ReplayError, ReplayMismatch, ReplayResult, SessionRecorder, SessionTrace, replay,
};
pub use snapsheet_web::style::SheetStyle;
pub use snapsheet_web::{HostInput, MouseEventKind, WebDispatch, WebSheet};

#[cfg(feature = "input-parser")]
pub use snapsheet_web::input_parser::{
    InputParseError, parse_host_input, parse_host_inputs, parse_sheet_options,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for snapsheet hosts.
///
/// The controller itself never fails; errors only arise at the host
/// boundary when decoding input or replaying traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Host JSON could not be decoded.
    #[cfg(feature = "input-parser")]
    Parse(InputParseError),
    /// A recorded trace could not be replayed.
    Replay(ReplayError),
    /// Replay produced a different checksum than the recording.
    Diverged(ReplayMismatch),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "input-parser")]
            Self::Parse(err) => write!(f, "{err}"),
            Self::Replay(err) => write!(f, "{err}"),
            Self::Diverged(mismatch) => write!(
                f,
                "replay diverged at checkpoint {}: expected {:#018x}, got {:#018x}",
                mismatch.index, mismatch.expected, mismatch.actual
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "input-parser")]
            Self::Parse(err) => Some(err),
            Self::Replay(err) => Some(err),
            Self::Diverged(_) => None,
        }
    }
}

#[cfg(feature = "input-parser")]
impl From<InputParseError> for Error {
    fn from(err: InputParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<ReplayError> for Error {
    fn from(err: ReplayError) -> Self {
        Self::Replay(err)
    }
}

/// Standard result type for snapsheet APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Build a mounted [`WebSheet`] from host-encoded JSON options.
#[cfg(feature = "input-parser")]
pub fn sheet_from_json(
    options_json: &str,
    measurement: SheetMeasurement,
) -> Result<(WebSheet, SheetUpdate)> {
    let options = parse_sheet_options(options_json)?;
    let mut sheet = WebSheet::new(options, measurement);
    let update = sheet.mount();
    Ok((sheet, update))
}

/// Decode a JSON event batch and dispatch it in order, collecting outcomes.
#[cfg(feature = "input-parser")]
pub fn dispatch_json(sheet: &mut WebSheet, events_json: &str) -> Result<Vec<WebDispatch>> {
    let inputs = parse_host_inputs(events_json)?;
    Ok(inputs
        .into_iter()
        .map(|input| sheet.dispatch(input))
        .collect())
}

/// Replay a trace and fail on the first checksum mismatch.
pub fn verify_trace(trace: &SessionTrace) -> Result<ReplayResult> {
    let result = replay(trace)?;
    if let Some(mismatch) = result.first_mismatch.clone() {
        return Err(Error::Diverged(mismatch));
    }
    Ok(result)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, HostInput, InputSource, MountTarget, MountTargetCache, PointerPhase, Result,
        SheetController, SheetHost, SheetLayout, SheetMeasurement, SheetOptions, SheetSignal,
        SheetStyle, SheetUpdate, WebSheet,
    };

    pub use crate::{core, web};
}

pub use snapsheet_core as core;
pub use snapsheet_web as web;
