//! Text measurement and drawing
//!
//! The engine never shapes text itself; it goes through [`TextEngine`].
//! [`CellTextEngine`] is the built-in fallback: fixed-advance metrics and
//! one filled cell per visible glyph.

use tiny_skia::{Paint, Pixmap, Rect as SkRect, Transform};

use crate::domain::{Color, FontSpec, Point, Size};

/// Advance of one character relative to the font size
const CELL_ADVANCE: f32 = 0.6;
/// Line height relative to the font size
const LINE_HEIGHT: f32 = 1.2;

pub trait TextEngine {
    /// Size of the box `text` occupies in `font`
    fn measure(&self, text: &str, font: &FontSpec) -> Size;

    /// Draw `text` with its box's top-left corner at `origin`
    fn paint(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        font: &FontSpec,
        origin: Point,
        color: Color,
        transform: Transform,
    );
}

/// Fixed-advance placeholder text engine
#[derive(Clone, Copy, Debug, Default)]
pub struct CellTextEngine;

impl TextEngine for CellTextEngine {
    fn measure(&self, text: &str, font: &FontSpec) -> Size {
        let lines = text.split('\n');
        let (count, widest) = lines.fold((0usize, 0usize), |(count, widest), line| {
            (count + 1, widest.max(line.chars().count()))
        });
        Size::new(
            widest as f32 * font.size * CELL_ADVANCE,
            count.max(1) as f32 * font.size * LINE_HEIGHT,
        )
    }

    fn paint(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        font: &FontSpec,
        origin: Point,
        color: Color,
        transform: Transform,
    ) {
        let [r, g, b, a] = color.to_rgba_u8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        let advance = font.size * CELL_ADVANCE;
        let line_height = font.size * LINE_HEIGHT;
        // glyph body sits inside the cell, leaving side bearing and leading
        let inset_x = advance * if font.bold { 0.08 } else { 0.15 };
        let inset_top = line_height * 0.2;
        let inset_bottom = line_height * 0.1;
        let slant = if font.italic { advance * 0.2 } else { 0.0 };

        for (row, line) in text.split('\n').enumerate() {
            let top = origin.y + row as f32 * line_height;
            for (col, ch) in line.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let left = origin.x + col as f32 * advance + inset_x + slant;
                let Some(cell) = SkRect::from_xywh(
                    left,
                    top + inset_top,
                    advance - inset_x * 2.0,
                    line_height - inset_top - inset_bottom,
                ) else {
                    continue;
                };
                pixmap.fill_rect(cell, &paint, transform, None);
            }
        }
    }
}
