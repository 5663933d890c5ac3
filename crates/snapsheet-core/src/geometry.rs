#![forbid(unsafe_code)]

//! Geometry resolver: conversions between snap ratios and pixel offsets.
//!
//! All offsets are measured from the top of the available area. An offset of
//! `0` means the sheet is fully expanded; an offset equal to the available
//! height means it is translated fully below the fold.
//!
//! # Failure Modes
//!
//! None of these functions fail. Non-finite or negative inputs degrade to `0`,
//! and a zero available height yields `0` for both snap offsets and progress.

/// Host measurement of the space the sheet lives in.
///
/// `container_height_px` is `None` while the container is unmounted or not
/// yet laid out; the viewport height is used instead.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetMeasurement {
    pub container_height_px: Option<f64>,
    pub viewport_height_px: f64,
}

impl SheetMeasurement {
    /// Measurement with a laid-out container.
    #[must_use]
    pub const fn container(container_height_px: f64, viewport_height_px: f64) -> Self {
        Self {
            container_height_px: Some(container_height_px),
            viewport_height_px,
        }
    }

    /// Measurement before the container could be resolved.
    #[must_use]
    pub const fn viewport_only(viewport_height_px: f64) -> Self {
        Self {
            container_height_px: None,
            viewport_height_px,
        }
    }

    /// Height the sheet measures against, before the bottom offset is reserved.
    #[must_use]
    pub fn reference_height_px(&self) -> f64 {
        match self.container_height_px {
            Some(height) if height.is_finite() => height,
            _ => self.viewport_height_px,
        }
    }
}

impl Default for SheetMeasurement {
    fn default() -> Self {
        Self::viewport_only(0.0)
    }
}

#[inline]
fn finite_non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Container height minus the reserved bottom offset, floored at `0`.
#[must_use]
pub fn available_height_px(measurement: &SheetMeasurement, bottom_offset_px: f64) -> f64 {
    let height = finite_non_negative(measurement.reference_height_px());
    (height - finite_non_negative(bottom_offset_px)).max(0.0)
}

/// Pixel offset of a snap ratio: `available * (1 - ratio)`.
#[must_use]
pub fn snap_px(ratio: f64, available_height_px: f64) -> f64 {
    let available = finite_non_negative(available_height_px);
    if available == 0.0 {
        return 0.0;
    }
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    available * (1.0 - ratio)
}

/// Openness in `[0, 1]` for a pixel offset; `0` when nothing is available.
#[must_use]
pub fn progress_ratio(offset_px: f64, available_height_px: f64) -> f64 {
    let available = finite_non_negative(available_height_px);
    if available == 0.0 || !offset_px.is_finite() {
        return 0.0;
    }
    (1.0 - offset_px / available).clamp(0.0, 1.0)
}

/// Inclusive pixel range a live drag offset is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetBounds {
    pub min_px: f64,
    pub max_px: f64,
}

impl OffsetBounds {
    /// Bounds from the most-open snap ratio down to fully hidden.
    #[must_use]
    pub fn for_sheet(max_ratio: f64, available_height_px: f64) -> Self {
        let max_px = finite_non_negative(available_height_px);
        let min_px = snap_px(max_ratio, max_px).min(max_px);
        Self { min_px, max_px }
    }

    /// Clamp an offset into the bounds. Non-finite offsets map to `max_px`.
    #[must_use]
    pub fn clamp(&self, offset_px: f64) -> f64 {
        if offset_px.is_finite() {
            offset_px.clamp(self.min_px, self.max_px)
        } else {
            self.max_px
        }
    }

    #[must_use]
    pub fn contains(&self, offset_px: f64) -> bool {
        offset_px >= self.min_px && offset_px <= self.max_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_height_subtracts_bottom_offset() {
        let m = SheetMeasurement::container(900.0, 800.0);
        assert_eq!(available_height_px(&m, 56.0), 844.0);
    }

    #[test]
    fn available_height_falls_back_to_viewport() {
        let m = SheetMeasurement::viewport_only(640.0);
        assert_eq!(available_height_px(&m, 40.0), 600.0);

        let nan = SheetMeasurement {
            container_height_px: Some(f64::NAN),
            viewport_height_px: 500.0,
        };
        assert_eq!(available_height_px(&nan, 0.0), 500.0);
    }

    #[test]
    fn available_height_never_negative() {
        let m = SheetMeasurement::container(30.0, 30.0);
        assert_eq!(available_height_px(&m, 100.0), 0.0);
        assert_eq!(available_height_px(&m, -20.0), 30.0);
        assert_eq!(available_height_px(&SheetMeasurement::default(), 0.0), 0.0);
    }

    #[test]
    fn snap_px_endpoints() {
        assert_eq!(snap_px(1.0, 1000.0), 0.0);
        assert_eq!(snap_px(0.0, 1000.0), 1000.0);
        assert!((snap_px(0.3, 1000.0) - 700.0).abs() < 1e-9);
        assert_eq!(snap_px(0.5, 0.0), 0.0);
    }

    #[test]
    fn progress_ratio_guards_zero_height() {
        assert_eq!(progress_ratio(100.0, 0.0), 0.0);
        assert_eq!(progress_ratio(0.0, 1000.0), 1.0);
        assert_eq!(progress_ratio(1000.0, 1000.0), 0.0);
        assert_eq!(progress_ratio(1500.0, 1000.0), 0.0);
        assert_eq!(progress_ratio(-10.0, 1000.0), 1.0);
        assert_eq!(progress_ratio(f64::NAN, 1000.0), 0.0);
    }

    #[test]
    fn bounds_clamp_between_most_open_snap_and_hidden() {
        let bounds = OffsetBounds::for_sheet(0.9, 1000.0);
        assert!((bounds.min_px - 100.0).abs() < 1e-9);
        assert_eq!(bounds.max_px, 1000.0);
        assert!((bounds.clamp(-50.0) - 100.0).abs() < 1e-9);
        assert_eq!(bounds.clamp(2000.0), 1000.0);
        assert_eq!(bounds.clamp(f64::INFINITY), 1000.0);
        assert!(bounds.contains(500.0));
    }
}
