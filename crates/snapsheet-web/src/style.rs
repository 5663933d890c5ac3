#![forbid(unsafe_code)]

//! Inline CSS derived from a [`SheetLayout`].
//!
//! The sheet moves with `transform: translate3d(...)` only, so position
//! changes never trigger layout. While dragging the transition is `none` so
//! the sheet tracks the pointer 1:1; at rest it animates to the snap.

use std::fmt::Write as _;

use snapsheet_core::controller::SheetLayout;

/// Easing for the snap animation.
pub const SNAP_EASING: &str = "cubic-bezier(0.2, 0.8, 0.2, 1)";

/// Scrim opacity while visible.
pub const OVERLAY_OPACITY: f64 = 0.4;

/// Overscroll containment for the scrollable sheet body.
pub const BODY_OVERSCROLL: &str = "contain";

/// Format a pixel length without trailing zeros: `700px`, `450.5px`.
#[must_use]
pub fn px(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let mut out = format!("{value:.2}");
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if out == "-0" {
        out = String::from("0");
    }
    out.push_str("px");
    out
}

#[must_use]
pub fn translate_y(offset_px: f64) -> String {
    format!("translate3d(0, {}, 0)", px(offset_px))
}

/// Scrim style.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub visible: bool,
    pub opacity: f64,
    /// Whether the scrim receives clicks.
    pub pointer_events: bool,
    pub transition: String,
}

/// Styles for the sheet, its scrim, and the top accessory.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetStyle {
    pub transform: String,
    pub transition: String,
    pub height: String,
    pub bottom: String,
    /// `hidden` once the sheet sits fully below the fold while closed.
    pub visibility: &'static str,
    pub overlay: OverlayStyle,
    /// Transform for the accessory slot, which rides on the sheet's top edge.
    pub top_accessory_transform: Option<String>,
    pub body_overscroll: &'static str,
}

impl SheetStyle {
    #[must_use]
    pub fn from_layout(layout: &SheetLayout) -> Self {
        let transition = if layout.is_dragging || layout.transition_ms == 0 {
            String::from("none")
        } else {
            format!("transform {}ms {SNAP_EASING}", layout.transition_ms)
        };
        let hidden = !layout.is_open && layout.translate_y_px >= layout.available_height_px;
        let overlay_transition = if layout.transition_ms == 0 {
            String::from("none")
        } else {
            format!("opacity {}ms linear", layout.transition_ms)
        };
        Self {
            transform: translate_y(layout.translate_y_px),
            transition,
            height: px(layout.available_height_px),
            bottom: px(layout.bottom_offset_px),
            visibility: if hidden { "hidden" } else { "visible" },
            overlay: OverlayStyle {
                visible: layout.overlay_visible,
                opacity: if layout.overlay_visible {
                    OVERLAY_OPACITY
                } else {
                    0.0
                },
                pointer_events: layout.overlay_visible,
                transition: overlay_transition,
            },
            top_accessory_transform: layout.top_accessory_visible.then(|| {
                format!(
                    "translate3d(0, calc({} - 100%), 0)",
                    px(layout.translate_y_px)
                )
            }),
            body_overscroll: BODY_OVERSCROLL,
        }
    }

    /// The sheet element's `style` attribute.
    #[must_use]
    pub fn sheet_css(&self) -> String {
        let mut css = String::with_capacity(160);
        let _ = write!(
            css,
            "position: absolute; left: 0; right: 0; bottom: {}; height: {}; \
             transform: {}; transition: {}; visibility: {}; will-change: transform;",
            self.bottom, self.height, self.transform, self.transition, self.visibility
        );
        css
    }

    /// The scrim element's `style` attribute.
    #[must_use]
    pub fn overlay_css(&self) -> String {
        format!(
            "position: fixed; inset: 0; background: rgb(0, 0, 0); opacity: {}; \
             pointer-events: {}; transition: {};",
            self.overlay.opacity,
            if self.overlay.pointer_events {
                "auto"
            } else {
                "none"
            },
            self.overlay.transition
        )
    }

    /// The scrollable body's `style` attribute.
    #[must_use]
    pub fn body_css(&self) -> String {
        format!(
            "overflow-y: auto; overscroll-behavior: {};",
            self.body_overscroll
        )
    }
}
