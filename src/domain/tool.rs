//! Editing tools

use serde::{Deserialize, Serialize};

/// Tool that interprets pointer gestures on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select, move, resize and rotate existing annotations
    #[default]
    Select,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Highlighter,
    Pencil,
    Text,
    Counter,
    Blur,
    Pixelate,
    Spotlight,
    Crop,
}

impl Tool {
    /// Tools that create their annotation from a press-drag-release gesture
    pub fn is_drag_tool(self) -> bool {
        matches!(
            self,
            Tool::Rectangle
                | Tool::Ellipse
                | Tool::Line
                | Tool::Arrow
                | Tool::Highlighter
                | Tool::Pencil
                | Tool::Blur
                | Tool::Pixelate
                | Tool::Spotlight
                | Tool::Crop
        )
    }

    /// Tools that create their annotation on a single click
    pub fn is_click_tool(self) -> bool {
        matches!(self, Tool::Text | Tool::Counter)
    }
}
