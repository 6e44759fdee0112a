//! Edit message handlers
//!
//! Handles EditMsg for all canvas operations.

use crate::domain::{Modifiers, Point, Tool};
use crate::session::CanvasSession;
use crate::session::messages::EditMsg;

/// Handle an EditMsg, modifying session state
pub fn handle_edit_msg(session: &mut CanvasSession, msg: EditMsg) {
    match msg {
        EditMsg::SelectTool { tool } => handle_select_tool(session, tool),
        EditMsg::PointerDown { x, y, additive } => {
            handle_pointer_down(session, Point::new(x, y), additive)
        }
        EditMsg::PointerDrag { x, y } => {
            let point = session.canvas.viewport.view_to_image(Point::new(x, y));
            session.tools.pointer_dragged(&mut session.canvas, point);
        }
        EditMsg::PointerUp { x, y } => {
            let point = session.canvas.viewport.view_to_image(Point::new(x, y));
            session.tools.pointer_up(&mut session.canvas, point);
        }
        EditMsg::Cancel => session.tools.cancel(&mut session.canvas),
        EditMsg::Style { change } => {
            session.canvas.apply_style(&change);
        }
        EditMsg::Undo => {
            session.tools.cancel(&mut session.canvas);
            session.canvas.undo();
        }
        EditMsg::Redo => {
            session.tools.cancel(&mut session.canvas);
            session.canvas.redo();
        }
        EditMsg::ApplyCrop => handle_apply_crop(session),
        msg @ (EditMsg::SelectAll
        | EditMsg::ClearSelection
        | EditMsg::DeleteSelection
        | EditMsg::DuplicateSelection
        | EditMsg::BringToFront
        | EditMsg::Nudge { .. }
        | EditMsg::SetText { .. }
        | EditMsg::SetVisible { .. }
        | EditMsg::ClearAnnotations) => handle_selection(session, msg),
        EditMsg::Zoom { factor, x, y } => {
            session.canvas.viewport.zoom_at(factor, Point::new(x, y));
        }
        EditMsg::Pan { dx, dy } => session.canvas.viewport.pan_by(Point::new(dx, dy)),
        EditMsg::ResetView => session.canvas.viewport.reset(),
    }
}

// ============================================================================
// Tool handlers
// ============================================================================

fn handle_select_tool(session: &mut CanvasSession, tool: Tool) {
    if session.tool == tool {
        return;
    }
    session.tools.cancel(&mut session.canvas);
    log::debug!("Tool changed: {:?} -> {:?}", session.tool, tool);
    session.tool = tool;
}

fn handle_pointer_down(session: &mut CanvasSession, view: Point, additive: bool) {
    let point = session.canvas.viewport.view_to_image(view);
    let modifiers = if additive {
        Modifiers::ADDITIVE
    } else {
        Modifiers::NONE
    };
    session
        .tools
        .pointer_down_with_modifiers(&mut session.canvas, point, session.tool, modifiers);
}

// ============================================================================
// Crop handlers
// ============================================================================

fn handle_apply_crop(session: &mut CanvasSession) {
    session.tools.cancel(&mut session.canvas);
    if session.canvas.apply_crop() {
        // the old image coordinates are gone
        session.canvas.viewport.reset();
        session.tool = Tool::Select;
    }
}

// ============================================================================
// Selection handlers
// ============================================================================

fn handle_selection(session: &mut CanvasSession, msg: EditMsg) {
    session.tools.cancel(&mut session.canvas);
    let canvas = &mut session.canvas;
    match msg {
        EditMsg::SelectAll => canvas.select_all(),
        EditMsg::ClearSelection => canvas.clear_selection(),
        EditMsg::DeleteSelection => {
            let removed = canvas.delete_selection();
            log::debug!("Deleted {} annotations", removed);
        }
        EditMsg::DuplicateSelection => {
            canvas.duplicate_selection();
        }
        EditMsg::BringToFront => {
            canvas.bring_to_front();
        }
        EditMsg::Nudge { dx, dy } => {
            canvas.nudge_selection(Point::new(dx, dy));
        }
        EditMsg::SetText { text } => {
            canvas.set_text(&text);
        }
        EditMsg::SetVisible { visible } => {
            canvas.set_visible(visible);
        }
        EditMsg::ClearAnnotations => {
            canvas.clear_annotations();
        }
        _ => {}
    }
}
