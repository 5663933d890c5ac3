#![forbid(unsafe_code)]

//! JSON parser for host-encoded sheet events and options.
//!
//! The JS binding layer serializes each DOM event it forwards as one small
//! JSON object tagged by `kind`:
//!
//! | kind         | fields                                          |
//! |--------------|-------------------------------------------------|
//! | `touch`      | `phase` (`start`/`move`/`end`/`cancel`), `id`, `y` |
//! | `mouse`      | `phase` (`down`/`move`/`up`), `button`, `y`     |
//! | `resize`     | `viewport_height`, optional `container_height`  |
//! | `open`       | `open`                                          |
//! | `overlay`    | none                                            |
//! | `blur`       | none                                            |
//! | `visibility` | `hidden`                                        |
//!
//! Unknown kinds and `visibility` with `hidden: false` return `Ok(None)`.
//! Feature-gated behind `input-parser`.

use serde::Deserialize;
use snapsheet_core::event::PointerPhase;
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;

use crate::pointer_adapter::MouseButton;
use crate::{HostInput, MouseEventKind};

/// Errors from parsing encoded host JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown pointer phase value.
    UnknownPhase(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownPhase(phase) => write!(f, "unknown phase: {phase}"),
        }
    }
}

impl std::error::Error for InputParseError {}

#[derive(Debug, Deserialize)]
struct RawInput {
    kind: String,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    button: Option<i16>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    viewport_height: Option<f64>,
    #[serde(default)]
    container_height: Option<f64>,
    #[serde(default)]
    open: Option<bool>,
    #[serde(default)]
    hidden: Option<bool>,
}

/// Parse one JSON-encoded host event into a [`HostInput`].
pub fn parse_host_input(json: &str) -> Result<Option<HostInput>, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;

    parse_raw(&raw)
}

/// Parse a batch of events encoded as a JSON array of event objects,
/// dropping entries with no sheet mapping.
pub fn parse_host_inputs(json: &str) -> Result<Vec<HostInput>, InputParseError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    let mut inputs = Vec::with_capacity(values.len());
    for value in values {
        let raw: RawInput =
            serde_json::from_value(value).map_err(|e| InputParseError::Json(e.to_string()))?;
        if let Some(input) = parse_raw(&raw)? {
            inputs.push(input);
        }
    }
    Ok(inputs)
}

fn parse_raw(raw: &RawInput) -> Result<Option<HostInput>, InputParseError> {
    match raw.kind.as_str() {
        "touch" => parse_touch(raw).map(Some),
        "mouse" => parse_mouse(raw).map(Some),
        "resize" => parse_resize(raw).map(Some),
        "open" => raw
            .open
            .map(|open| Some(HostInput::SetOpen(open)))
            .ok_or(InputParseError::MissingField("open")),
        "overlay" => Ok(Some(HostInput::OverlayClick)),
        "blur" => Ok(Some(HostInput::Blur)),
        "visibility" => Ok(raw
            .hidden
            .unwrap_or(true)
            .then_some(HostInput::VisibilityHidden)),
        _ => Ok(None),
    }
}

/// Parse [`SheetOptions`] from JSON. Missing fields take their defaults.
pub fn parse_sheet_options(json: &str) -> Result<SheetOptions, InputParseError> {
    serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))
}

fn parse_touch(raw: &RawInput) -> Result<HostInput, InputParseError> {
    let phase = match raw.phase.as_deref() {
        Some("start") => PointerPhase::Start,
        Some("move") => PointerPhase::Move,
        Some("end") => PointerPhase::End,
        Some("cancel") => PointerPhase::Cancel,
        Some(other) => return Err(InputParseError::UnknownPhase(other.to_string())),
        None => return Err(InputParseError::MissingField("phase")),
    };
    let touch_id = raw.id.ok_or(InputParseError::MissingField("id"))?;
    let client_y = match phase {
        PointerPhase::Cancel => raw.y.unwrap_or(f64::NAN),
        _ => raw.y.ok_or(InputParseError::MissingField("y"))?,
    };
    Ok(HostInput::Touch {
        phase,
        touch_id,
        client_y,
    })
}

fn parse_mouse(raw: &RawInput) -> Result<HostInput, InputParseError> {
    let kind = match raw.phase.as_deref() {
        Some("down") => MouseEventKind::Down,
        Some("move") => MouseEventKind::Move,
        Some("up") => MouseEventKind::Up,
        Some(other) => return Err(InputParseError::UnknownPhase(other.to_string())),
        None => return Err(InputParseError::MissingField("phase")),
    };
    let client_y = raw.y.ok_or(InputParseError::MissingField("y"))?;
    Ok(HostInput::Mouse {
        kind,
        button: MouseButton::from_dom(raw.button.unwrap_or(0)),
        client_y,
    })
}

fn parse_resize(raw: &RawInput) -> Result<HostInput, InputParseError> {
    let viewport = raw
        .viewport_height
        .ok_or(InputParseError::MissingField("viewport_height"))?;
    let measurement = match raw.container_height {
        Some(container) => SheetMeasurement::container(container, viewport),
        None => SheetMeasurement::viewport_only(viewport),
    };
    Ok(HostInput::Resize(measurement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_touch_phases() {
        let input = parse_host_input(r#"{"kind":"touch","phase":"move","id":3,"y":412.5}"#)
            .expect("valid touch");
        assert_eq!(
            input,
            Some(HostInput::Touch {
                phase: PointerPhase::Move,
                touch_id: 3,
                client_y: 412.5,
            })
        );
    }

    #[test]
    fn touch_cancel_needs_no_y() {
        let input = parse_host_input(r#"{"kind":"touch","phase":"cancel","id":3}"#)
            .expect("valid cancel")
            .expect("mapped");
        match input {
            HostInput::Touch {
                phase, client_y, ..
            } => {
                assert_eq!(phase, PointerPhase::Cancel);
                assert!(client_y.is_nan());
            }
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[test]
    fn parses_mouse_with_button() {
        let input = parse_host_input(r#"{"kind":"mouse","phase":"down","button":2,"y":10}"#)
            .expect("valid mouse");
        assert_eq!(
            input,
            Some(HostInput::Mouse {
                kind: MouseEventKind::Down,
                button: MouseButton::Secondary,
                client_y: 10.0,
            })
        );
    }

    #[test]
    fn parses_resize_with_and_without_container() {
        assert_eq!(
            parse_host_input(r#"{"kind":"resize","viewport_height":800}"#).expect("resize"),
            Some(HostInput::Resize(SheetMeasurement::viewport_only(800.0)))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"resize","viewport_height":800,"container_height":640}"#)
                .expect("resize"),
            Some(HostInput::Resize(SheetMeasurement::container(640.0, 800.0)))
        );
    }

    #[test]
    fn lifecycle_kinds() {
        assert_eq!(
            parse_host_input(r#"{"kind":"open","open":false}"#).expect("open"),
            Some(HostInput::SetOpen(false))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"overlay"}"#).expect("overlay"),
            Some(HostInput::OverlayClick)
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"visibility","hidden":false}"#).expect("visible"),
            None
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"keyboard"}"#).expect("unknown kind"),
            None
        );
    }

    #[test]
    fn reports_errors() {
        assert!(matches!(
            parse_host_input("{not json"),
            Err(InputParseError::Json(_))
        ));
        assert_eq!(
            parse_host_input(r#"{"kind":"touch","phase":"hover","id":1,"y":0}"#),
            Err(InputParseError::UnknownPhase("hover".into()))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"mouse","phase":"down"}"#),
            Err(InputParseError::MissingField("y"))
        );
        assert_eq!(
            parse_host_input(r#"{"kind":"open"}"#),
            Err(InputParseError::MissingField("open"))
        );
    }

    #[test]
    fn batch_skips_unmapped() {
        let inputs = parse_host_inputs(
            r#"[{"kind":"touch","phase":"start","id":1,"y":700},{"kind":"scroll"},{"kind":"blur"}]"#,
        )
        .expect("valid batch");
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[1], HostInput::Blur);
    }

    #[test]
    fn options_from_json() {
        let options = parse_sheet_options(
            r##"{"is_open":true,"snap_points":[0.3,0.6,0.9],"container_selector":"#shell"}"##,
        )
        .expect("valid options");
        assert_eq!(options.snap_points, vec![0.3, 0.6, 0.9]);
        assert_eq!(options.container_selector.as_deref(), Some("#shell"));
        assert!(options.show_overlay);
    }
}
