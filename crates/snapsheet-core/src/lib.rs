#![forbid(unsafe_code)]

//! Core: geometry, snap resolution, and the drag state machine for a
//! snap-point bottom sheet.
//!
//! # Role in snapsheet
//! `snapsheet-core` owns every decision about where the sheet rests. It has
//! no platform dependencies: hosts feed it [`event::PointerSample`] values,
//! measurements, and option changes, and read back a
//! [`controller::SheetUpdate`] with the callbacks to fire.
//!
//! # Primary responsibilities
//! - **Geometry**: ratio <-> pixel conversion against the available height.
//! - **Snap resolution**: normalized snap sets and nearest-snap lookup.
//! - **Drag machine**: one session at a time, clamped live offsets.
//! - **Controller**: lifecycle, dismissal, overlay, and progress reporting.
//!
//! # How it fits in the system
//! `snapsheet-web` adapts browser touch/mouse streams and portal mounting
//! onto this crate; the `snapsheet` facade re-exports both.

pub mod controller;
pub mod drag;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod options;
pub mod snap;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
