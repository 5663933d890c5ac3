#![forbid(unsafe_code)]

//! Host-facing configuration for one sheet.

/// Fraction of the available height past which a dismissible sheet closes
/// on release instead of snapping.
pub const DISMISS_THRESHOLD_RATIO: f64 = 0.95;

/// Default duration of the non-dragging snap transition.
pub const DEFAULT_TRANSITION_MS: u32 = 300;

/// Sheet options, mirroring the props a host screen passes in.
///
/// Unknown or invalid values never fail: snap points are normalized by
/// [`SnapConfiguration`](crate::snap::SnapConfiguration), the initial index is
/// clamped at open time, and a negative or non-finite bottom offset counts
/// as `0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetOptions {
    pub is_open: bool,
    pub snap_points: Vec<f64>,
    pub initial_snap_index: i64,
    pub bottom_offset_px: f64,
    /// Selector of an external node to portal the sheet into.
    pub container_selector: Option<String>,
    pub show_overlay: bool,
    pub dismissible: bool,
    /// Whether the host renders a top accessory slot.
    pub has_top_accessory: bool,
    pub transition_ms: u32,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            is_open: false,
            snap_points: Vec::new(),
            initial_snap_index: 0,
            bottom_offset_px: 0.0,
            container_selector: None,
            show_overlay: true,
            dismissible: false,
            has_top_accessory: false,
            transition_ms: DEFAULT_TRANSITION_MS,
        }
    }
}

impl SheetOptions {
    /// Options with the given snap points and defaults elsewhere.
    #[must_use]
    pub fn new(snap_points: impl Into<Vec<f64>>) -> Self {
        Self {
            snap_points: snap_points.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }

    #[must_use]
    pub fn with_initial_snap_index(mut self, index: i64) -> Self {
        self.initial_snap_index = index;
        self
    }

    #[must_use]
    pub fn with_bottom_offset_px(mut self, px: f64) -> Self {
        self.bottom_offset_px = px;
        self
    }

    #[must_use]
    pub fn with_container_selector(mut self, selector: impl Into<String>) -> Self {
        self.container_selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn with_overlay(mut self, show_overlay: bool) -> Self {
        self.show_overlay = show_overlay;
        self
    }

    #[must_use]
    pub fn with_dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    #[must_use]
    pub fn with_top_accessory(mut self, has_top_accessory: bool) -> Self {
        self.has_top_accessory = has_top_accessory;
        self
    }

    #[must_use]
    pub fn with_transition_ms(mut self, transition_ms: u32) -> Self {
        self.transition_ms = transition_ms;
        self
    }

    /// Bottom offset with invalid values mapped to `0`.
    #[must_use]
    pub fn effective_bottom_offset_px(&self) -> f64 {
        if self.bottom_offset_px.is_finite() {
            self.bottom_offset_px.max(0.0)
        } else {
            0.0
        }
    }
}
