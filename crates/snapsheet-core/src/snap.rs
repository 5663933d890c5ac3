#![forbid(unsafe_code)]

//! Snap configuration and nearest-snap resolution.
//!
//! # Invariants
//!
//! 1. Ratios are finite, within `[0, 1]`, strictly ascending, and unique.
//! 2. The configuration is never empty: an empty or all-invalid input yields
//!    the single ratio [`DEFAULT_SNAP_RATIO`].
//! 3. [`SnapConfiguration::nearest_index`] breaks exact ties toward the lower
//!    index (the more collapsed snap).

use crate::geometry::{OffsetBounds, progress_ratio, snap_px};

/// Ratio used when the host supplies no usable snap points.
pub const DEFAULT_SNAP_RATIO: f64 = 1.0;

/// Normalized, sorted, deduplicated resting ratios for a sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SnapConfiguration {
    ratios: Vec<f64>,
}

impl SnapConfiguration {
    /// Build a configuration from raw host snap points.
    ///
    /// Values are clamped into `[0, 1]`, non-finite values are dropped, and
    /// the result is sorted ascending and deduplicated.
    #[must_use]
    pub fn new(snap_points: &[f64]) -> Self {
        let mut ratios: Vec<f64> = snap_points
            .iter()
            .copied()
            .filter(|ratio| ratio.is_finite())
            .map(|ratio| ratio.clamp(0.0, 1.0))
            .collect();
        ratios.sort_by(f64::total_cmp);
        // -0.0 and 0.0 compare equal here, which is what we want.
        ratios.dedup_by(|a, b| a == b);
        if ratios.is_empty() {
            ratios.push(DEFAULT_SNAP_RATIO);
        }
        Self { ratios }
    }

    #[must_use]
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    /// Clamp a host-supplied (possibly negative) index into range.
    #[must_use]
    pub fn clamp_index(&self, index: i64) -> usize {
        let last = self.ratios.len().saturating_sub(1);
        if index <= 0 {
            0
        } else {
            usize::try_from(index).map_or(last, |index| index.min(last))
        }
    }

    /// Ratio at `index`, clamped into range.
    #[must_use]
    pub fn ratio(&self, index: usize) -> f64 {
        let last = self.ratios.len().saturating_sub(1);
        self.ratios
            .get(index.min(last))
            .copied()
            .unwrap_or(DEFAULT_SNAP_RATIO)
    }

    /// The most expanded ratio.
    #[must_use]
    pub fn max_ratio(&self) -> f64 {
        self.ratios.last().copied().unwrap_or(DEFAULT_SNAP_RATIO)
    }

    /// Pixel offset of the snap at `index`.
    #[must_use]
    pub fn offset_px(&self, index: usize, available_height_px: f64) -> f64 {
        snap_px(self.ratio(index), available_height_px)
    }

    /// Drag bounds: most-open snap down to fully hidden.
    #[must_use]
    pub fn bounds(&self, available_height_px: f64) -> OffsetBounds {
        OffsetBounds::for_sheet(self.max_ratio(), available_height_px)
    }

    /// Index of the ratio closest to `current_ratio`. Ties go to the lower index.
    #[must_use]
    pub fn nearest_index(&self, current_ratio: f64) -> usize {
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for (index, ratio) in self.ratios.iter().enumerate() {
            let distance = (ratio - current_ratio).abs();
            if distance < best_distance {
                best_index = index;
                best_distance = distance;
            }
        }
        best_index
    }

    /// Resolve a release offset to the nearest snap index.
    #[must_use]
    pub fn resolve_release(&self, live_offset_px: f64, available_height_px: f64) -> usize {
        self.nearest_index(progress_ratio(live_offset_px, available_height_px))
    }
}

impl Default for SnapConfiguration {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sorts_and_dedups() {
        let config = SnapConfiguration::new(&[0.9, 0.3, 0.6, 0.3, 1.4, -0.2, f64::NAN]);
        assert_eq!(config.ratios(), &[0.0, 0.3, 0.6, 0.9, 1.0]);
    }

    #[test]
    fn empty_input_defaults_to_fully_expanded() {
        let config = SnapConfiguration::new(&[]);
        assert_eq!(config.ratios(), &[DEFAULT_SNAP_RATIO]);
        let config = SnapConfiguration::new(&[f64::NAN, f64::INFINITY]);
        assert_eq!(config.ratios(), &[DEFAULT_SNAP_RATIO]);
        assert!(!config.is_empty());
    }

    #[test]
    fn clamp_index_handles_out_of_range() {
        let config = SnapConfiguration::new(&[0.3, 0.6, 0.9]);
        assert_eq!(config.clamp_index(-3), 0);
        assert_eq!(config.clamp_index(1), 1);
        assert_eq!(config.clamp_index(99), 2);
        assert_eq!(config.clamp_index(i64::MAX), 2);
    }

    #[test]
    fn nearest_prefers_lower_index_on_tie() {
        let config = SnapConfiguration::new(&[0.2, 0.4]);
        assert_eq!(config.nearest_index(0.3), 0);
        let config = SnapConfiguration::new(&[0.0, 0.5, 1.0]);
        assert_eq!(config.nearest_index(0.25), 0);
        assert_eq!(config.nearest_index(0.75), 1);
        assert_eq!(config.nearest_index(0.76), 2);
    }

    #[test]
    fn release_at_450_resolves_to_middle_snap() {
        let config = SnapConfiguration::new(&[0.3, 0.6, 0.9]);
        assert_eq!(config.resolve_release(450.0, 1000.0), 1);
        assert!((config.offset_px(1, 1000.0) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_follow_max_ratio() {
        let config = SnapConfiguration::new(&[0.3, 0.6, 0.9]);
        let bounds = config.bounds(1000.0);
        assert!((bounds.min_px - 100.0).abs() < 1e-9);
        assert_eq!(bounds.max_px, 1000.0);
    }
}
