//! Selection handle and pointer modifier types

use super::geometry::{Point, Rect};

/// Resize handle of an editable frame
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// North-West corner
    NW,
    /// North edge
    N,
    /// North-East corner
    NE,
    /// East edge
    E,
    /// South-East corner
    SE,
    /// South edge
    S,
    /// South-West corner
    SW,
    /// West edge
    W,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    /// Where this handle sits on `frame`
    pub fn anchor(self, frame: &Rect) -> Point {
        let r = frame.standardized();
        let (left, top, right, bottom) = (r.x, r.y, r.x + r.width, r.y + r.height);
        let mid_x = r.x + r.width * 0.5;
        let mid_y = r.y + r.height * 0.5;
        match self {
            Handle::NW => Point::new(left, top),
            Handle::N => Point::new(mid_x, top),
            Handle::NE => Point::new(right, top),
            Handle::E => Point::new(right, mid_y),
            Handle::SE => Point::new(right, bottom),
            Handle::S => Point::new(mid_x, bottom),
            Handle::SW => Point::new(left, bottom),
            Handle::W => Point::new(left, mid_y),
        }
    }
}

/// Result of probing the handle hotspots of the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Resize(Handle),
    /// Rotation hotspot outside the given corner
    Rotate(Handle),
}

/// Keyboard modifiers held during a pointer gesture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift/Cmd-click: toggle or extend instead of replacing the selection
    pub additive: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { additive: false };
    pub const ADDITIVE: Modifiers = Modifiers { additive: true };
}
