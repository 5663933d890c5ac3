#![forbid(unsafe_code)]

//! Canonical pointer input for the sheet drag handle.
//!
//! Touch and mouse streams are both reduced to [`PointerSample`] values before
//! they reach the drag machine, so the two modalities share one code path.

/// Input device a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InputSource {
    Touch,
    Mouse,
}

/// Lifecycle phase of one pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One vertical pointer observation in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerSample {
    pub source: InputSource,
    pub phase: PointerPhase,
    pub client_y: f64,
}

impl PointerSample {
    #[must_use]
    pub const fn new(source: InputSource, phase: PointerPhase, client_y: f64) -> Self {
        Self {
            source,
            phase,
            client_y,
        }
    }

    #[must_use]
    pub const fn start(source: InputSource, client_y: f64) -> Self {
        Self::new(source, PointerPhase::Start, client_y)
    }

    #[must_use]
    pub const fn moved(source: InputSource, client_y: f64) -> Self {
        Self::new(source, PointerPhase::Move, client_y)
    }

    #[must_use]
    pub const fn end(source: InputSource, client_y: f64) -> Self {
        Self::new(source, PointerPhase::End, client_y)
    }

    /// Cancel samples carry no meaningful position.
    #[must_use]
    pub const fn cancel(source: InputSource) -> Self {
        Self::new(source, PointerPhase::Cancel, f64::NAN)
    }

    /// Same phase and position, delivered through another device.
    #[must_use]
    pub const fn with_source(self, source: InputSource) -> Self {
        Self { source, ..self }
    }
}

/// Why an active drag session ended without a snap commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DragCancelReason {
    PointerCancel,
    Blur,
    VisibilityHidden,
    SheetClosed,
    Programmatic,
}
