//! Message types for an edit session
//!
//! Every user interaction with the canvas is expressed as one `EditMsg`.
//! Messages deserialize from JSON so an edit can be scripted and replayed.

use serde::{Deserialize, Serialize};

use crate::domain::{StyleChange, Tool};

/// All edit session messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditMsg {
    /// Switch the active tool, cancelling any gesture in progress
    SelectTool { tool: Tool },

    // Pointer input, in view coordinates
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        additive: bool,
    },
    PointerDrag { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    /// Abandon the gesture in progress
    Cancel,

    /// Change a palette field and the selected annotations
    Style { change: StyleChange },

    Undo,
    Redo,
    /// Cut the image down to the pending crop frame
    ApplyCrop,

    // Selection actions
    SelectAll,
    ClearSelection,
    DeleteSelection,
    DuplicateSelection,
    BringToFront,
    Nudge { dx: f32, dy: f32 },
    SetText { text: String },
    SetVisible { visible: bool },
    /// Remove all annotations (keeps the image)
    ClearAnnotations,

    // Viewport
    Zoom {
        factor: f32,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    Pan { dx: f32, dy: f32 },
    ResetView,
}

/// Parse a JSON array of messages
pub fn parse_script(text: &str) -> serde_json::Result<Vec<EditMsg>> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Color;

    #[test]
    fn test_parse_script() {
        let script = r#"[
            {"op": "select_tool", "tool": "rectangle"},
            {"op": "pointer_down", "x": 10, "y": 10},
            {"op": "pointer_up", "x": 30, "y": 30},
            {"op": "style", "change": {"field": "stroke_color", "value": {"r": 1, "g": 0, "b": 0}}},
            {"op": "undo"}
        ]"#;
        let msgs = parse_script(script).unwrap();
        assert_eq!(msgs.len(), 5);
        assert_eq!(msgs[0], EditMsg::SelectTool { tool: Tool::Rectangle });
        assert_eq!(
            msgs[1],
            EditMsg::PointerDown {
                x: 10.0,
                y: 10.0,
                additive: false
            }
        );
        assert_eq!(
            msgs[3],
            EditMsg::Style {
                change: StyleChange::StrokeColor(Color::rgb(1.0, 0.0, 0.0))
            }
        );
        assert_eq!(msgs[4], EditMsg::Undo);
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(parse_script(r#"[{"op": "explode"}]"#).is_err());
    }
}
