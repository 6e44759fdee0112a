//! Edit session management
//!
//! This module contains:
//! - Canvas state (store, selection, history, palette, viewport)
//! - Message types for canvas interactions
//! - The session tying the canvas to the active tool

pub mod messages;
pub mod state;
pub mod viewport;

use image::RgbaImage;

use crate::annotations::handlers::handle_edit_msg;
use crate::annotations::tools::ToolManager;
use crate::capture::image::BaseImage;
use crate::config::SnapmarkConfig;
use crate::domain::Tool;

use messages::EditMsg;
use state::CanvasState;

/// One editing session over a single base image
#[derive(Debug)]
pub struct CanvasSession {
    pub canvas: CanvasState,
    pub tools: ToolManager,
    pub tool: Tool,
}

impl CanvasSession {
    pub fn new(base: BaseImage) -> Self {
        Self::from_canvas(CanvasState::new(base))
    }

    pub fn from_config(base: BaseImage, config: &SnapmarkConfig) -> Self {
        Self::from_canvas(CanvasState::from_config(base, config))
    }

    pub fn from_canvas(canvas: CanvasState) -> Self {
        Self {
            canvas,
            tools: ToolManager::default(),
            tool: Tool::default(),
        }
    }

    pub fn update(&mut self, msg: EditMsg) {
        handle_edit_msg(self, msg);
    }

    /// Final export image
    pub fn render_final(&mut self) -> Option<RgbaImage> {
        self.canvas.render_final()
    }

    /// Preview including selection chrome and gesture overlays
    pub fn render_live(&mut self) -> Option<RgbaImage> {
        let overlay = self.tools.overlay(self.tool);
        self.canvas.render_live(&overlay)
    }
}
