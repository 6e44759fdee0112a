//! Colors, style enums and the shared style palette
//!
//! The palette is a plain value. Every change goes through
//! [`apply_style_change`], which returns the updated palette, so coupled
//! fields (fill following the stroke hue) are updated in one visible place.

use serde::{Deserialize, Serialize};

use super::annotation::{Annotation, AnnotationKind};

/// Serializable RGBA color, channels in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Default for Color {
    fn default() -> Self {
        // Annotation red
        Self::rgb(0.9, 0.1, 0.1)
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same hue with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

/// Arrowhead rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowHead {
    /// Two angled strokes
    #[default]
    Open,
    /// Solid triangle
    Filled,
    /// Plain line, no head
    None,
}

/// Label style for counter annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingStyle {
    #[default]
    Numeric,
    Alphabetic,
    Roman,
}

impl NumberingStyle {
    /// Render `value` (1-based) as a label in this style
    pub fn label(self, value: u32) -> String {
        match self {
            NumberingStyle::Numeric => value.to_string(),
            NumberingStyle::Alphabetic => alphabetic_label(value),
            NumberingStyle::Roman => roman_label(value),
        }
    }
}

/// 1 -> A, 26 -> Z, 27 -> AA
fn alphabetic_label(value: u32) -> String {
    if value == 0 {
        return String::from("0");
    }
    let mut n = value;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

fn roman_label(value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if value == 0 || value > 3999 {
        return value.to_string();
    }
    let mut n = value;
    let mut out = String::new();
    for (step, glyph) in TABLE {
        while n >= step {
            out.push_str(glyph);
            n -= step;
        }
    }
    out
}

/// Current defaults used when new annotations are created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePalette {
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub dashed: bool,
    /// Fill color for rectangles and ellipses (alpha is the fill opacity)
    pub fill_color: Color,
    pub fill_enabled: bool,
    pub corner_radius: f32,
    pub arrow_head: ArrowHead,
    pub font_name: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub text_background: bool,
    pub default_text: String,
    pub highlighter_color: Color,
    pub highlighter_width: f32,
    pub blur_radius: f32,
    /// Pixelation block size (larger = more pixelated, range 2-64)
    pub pixel_block_size: u32,
    /// Opacity of the dimmed area around a spotlight (0.0-1.0)
    pub spotlight_dim: f32,
    pub counter_style: NumberingStyle,
    pub counter_radius: f32,
}

impl Default for StylePalette {
    fn default() -> Self {
        let stroke_color = Color::default();
        Self {
            stroke_color,
            stroke_width: 4.0,
            dashed: false,
            fill_color: stroke_color.with_alpha(0.25),
            fill_enabled: false,
            corner_radius: 0.0,
            arrow_head: ArrowHead::Open,
            font_name: String::from("Sans"),
            font_size: 18.0,
            bold: false,
            italic: false,
            text_background: false,
            default_text: String::from("Text"),
            highlighter_color: Color::rgba(1.0, 0.9, 0.0, 0.4),
            highlighter_width: 18.0,
            blur_radius: 8.0,
            pixel_block_size: 16,
            spotlight_dim: 0.6,
            counter_style: NumberingStyle::Numeric,
            counter_radius: 14.0,
        }
    }
}

impl StylePalette {
    /// Background behind new or restyled text, when enabled
    pub fn text_background_color(&self) -> Option<Color> {
        self.text_background.then_some(self.fill_color)
    }
}

/// A single edit to the palette (and, optionally, to selected annotations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum StyleChange {
    StrokeColor(Color),
    StrokeWidth(f32),
    Dashed(bool),
    FillColor(Color),
    FillEnabled(bool),
    FillOpacity(f32),
    CornerRadius(f32),
    ArrowHead(ArrowHead),
    FontName(String),
    FontSize(f32),
    Bold(bool),
    Italic(bool),
    TextBackground(bool),
    HighlighterColor(Color),
    HighlighterWidth(f32),
    BlurRadius(f32),
    PixelBlockSize(u32),
    SpotlightDim(f32),
    CounterStyle(NumberingStyle),
}

/// Return `palette` with `change` applied
///
/// Setting the stroke color re-tints the fill to the same hue while keeping
/// the current fill opacity.
pub fn apply_style_change(palette: &StylePalette, change: &StyleChange) -> StylePalette {
    let mut next = palette.clone();
    match change {
        StyleChange::StrokeColor(color) => {
            next.stroke_color = *color;
            next.fill_color = color.with_alpha(palette.fill_color.a);
        }
        StyleChange::StrokeWidth(width) => next.stroke_width = width.clamp(1.0, 64.0),
        StyleChange::Dashed(dashed) => next.dashed = *dashed,
        StyleChange::FillColor(color) => next.fill_color = *color,
        StyleChange::FillEnabled(enabled) => next.fill_enabled = *enabled,
        StyleChange::FillOpacity(opacity) => {
            next.fill_color = palette.fill_color.with_alpha(*opacity);
        }
        StyleChange::CornerRadius(radius) => next.corner_radius = radius.max(0.0),
        StyleChange::ArrowHead(head) => next.arrow_head = *head,
        StyleChange::FontName(name) => next.font_name = name.clone(),
        StyleChange::FontSize(size) => next.font_size = size.clamp(4.0, 512.0),
        StyleChange::Bold(bold) => next.bold = *bold,
        StyleChange::Italic(italic) => next.italic = *italic,
        StyleChange::TextBackground(background) => next.text_background = *background,
        StyleChange::HighlighterColor(color) => next.highlighter_color = *color,
        StyleChange::HighlighterWidth(width) => next.highlighter_width = width.clamp(2.0, 128.0),
        StyleChange::BlurRadius(radius) => next.blur_radius = radius.clamp(1.0, 100.0),
        StyleChange::PixelBlockSize(size) => next.pixel_block_size = (*size).clamp(2, 64),
        StyleChange::SpotlightDim(dim) => next.spotlight_dim = dim.clamp(0.0, 1.0),
        StyleChange::CounterStyle(style) => next.counter_style = *style,
    }
    next
}

impl StyleChange {
    /// Apply this change as a per-annotation override
    ///
    /// Uses the already-updated `palette` so clamping matches. Returns `None`
    /// when the change does not concern this kind of annotation. Font
    /// changes on text leave re-measuring to the caller.
    pub fn apply_to(&self, annotation: &Annotation, palette: &StylePalette) -> Option<Annotation> {
        let mut next = annotation.clone();
        let changed = match (&mut next.kind, self) {
            (AnnotationKind::Rectangle(r), StyleChange::StrokeColor(_)) => {
                r.stroke.color = palette.stroke_color;
                if r.fill.is_some() {
                    r.fill = Some(palette.fill_color);
                }
                true
            }
            (AnnotationKind::Ellipse(e), StyleChange::StrokeColor(_)) => {
                e.stroke.color = palette.stroke_color;
                if e.fill.is_some() {
                    e.fill = Some(palette.fill_color);
                }
                true
            }
            (AnnotationKind::Line(l), StyleChange::StrokeColor(_)) => {
                l.stroke.color = palette.stroke_color;
                true
            }
            (AnnotationKind::Arrow(a), StyleChange::StrokeColor(_)) => {
                a.stroke.color = palette.stroke_color;
                true
            }
            (AnnotationKind::Pencil(p), StyleChange::StrokeColor(_)) => {
                p.stroke.color = palette.stroke_color;
                true
            }
            (AnnotationKind::Text(t), StyleChange::StrokeColor(_)) => {
                t.color = palette.stroke_color;
                true
            }
            (AnnotationKind::Counter(c), StyleChange::StrokeColor(_)) => {
                c.color = palette.stroke_color;
                true
            }
            (AnnotationKind::Rectangle(r), StyleChange::StrokeWidth(_)) => {
                r.stroke.width = palette.stroke_width;
                true
            }
            (AnnotationKind::Ellipse(e), StyleChange::StrokeWidth(_)) => {
                e.stroke.width = palette.stroke_width;
                true
            }
            (AnnotationKind::Line(l), StyleChange::StrokeWidth(_)) => {
                l.stroke.width = palette.stroke_width;
                true
            }
            (AnnotationKind::Arrow(a), StyleChange::StrokeWidth(_)) => {
                a.stroke.width = palette.stroke_width;
                true
            }
            (AnnotationKind::Pencil(p), StyleChange::StrokeWidth(_)) => {
                p.stroke.width = palette.stroke_width;
                true
            }
            (AnnotationKind::Rectangle(r), StyleChange::Dashed(_)) => {
                r.stroke.dashed = palette.dashed;
                true
            }
            (AnnotationKind::Ellipse(e), StyleChange::Dashed(_)) => {
                e.stroke.dashed = palette.dashed;
                true
            }
            (AnnotationKind::Line(l), StyleChange::Dashed(_)) => {
                l.stroke.dashed = palette.dashed;
                true
            }
            (AnnotationKind::Arrow(a), StyleChange::Dashed(_)) => {
                a.stroke.dashed = palette.dashed;
                true
            }
            (
                AnnotationKind::Rectangle(r),
                StyleChange::FillColor(_)
                | StyleChange::FillOpacity(_)
                | StyleChange::FillEnabled(_),
            ) => {
                r.fill = palette.fill_enabled.then_some(palette.fill_color);
                true
            }
            (
                AnnotationKind::Ellipse(e),
                StyleChange::FillColor(_)
                | StyleChange::FillOpacity(_)
                | StyleChange::FillEnabled(_),
            ) => {
                e.fill = palette.fill_enabled.then_some(palette.fill_color);
                true
            }
            (AnnotationKind::Rectangle(r), StyleChange::CornerRadius(_)) => {
                r.corner_radius = palette.corner_radius;
                true
            }
            (AnnotationKind::Arrow(a), StyleChange::ArrowHead(_)) => {
                a.head = palette.arrow_head;
                true
            }
            (AnnotationKind::Text(t), StyleChange::FontName(_)) => {
                t.font.name = palette.font_name.clone();
                true
            }
            (AnnotationKind::Text(t), StyleChange::FontSize(_)) => {
                t.font.size = palette.font_size;
                true
            }
            (AnnotationKind::Text(t), StyleChange::Bold(_)) => {
                t.font.bold = palette.bold;
                true
            }
            (AnnotationKind::Text(t), StyleChange::Italic(_)) => {
                t.font.italic = palette.italic;
                true
            }
            (AnnotationKind::Text(t), StyleChange::TextBackground(_)) => {
                t.background = palette.text_background_color();
                true
            }
            (AnnotationKind::Highlighter(h), StyleChange::HighlighterColor(_)) => {
                h.color = palette.highlighter_color;
                true
            }
            (AnnotationKind::Highlighter(h), StyleChange::HighlighterWidth(_)) => {
                h.width = palette.highlighter_width;
                true
            }
            (AnnotationKind::Blur(b), StyleChange::BlurRadius(_)) => {
                b.radius = palette.blur_radius;
                true
            }
            (AnnotationKind::Pixelate(p), StyleChange::PixelBlockSize(_)) => {
                p.block_size = palette.pixel_block_size;
                true
            }
            (AnnotationKind::Spotlight(s), StyleChange::SpotlightDim(_)) => {
                s.dim = palette.spotlight_dim;
                true
            }
            (AnnotationKind::Counter(c), StyleChange::CounterStyle(_)) => {
                c.style = palette.counter_style;
                true
            }
            _ => false,
        };
        (changed && next != *annotation).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotation::{FontSpec, LineAnnotation, TextAnnotation};
    use crate::domain::{Point, Size, StrokeStyle};

    #[test]
    fn test_numbering_labels() {
        assert_eq!(NumberingStyle::Numeric.label(12), "12");
        assert_eq!(NumberingStyle::Alphabetic.label(1), "A");
        assert_eq!(NumberingStyle::Alphabetic.label(26), "Z");
        assert_eq!(NumberingStyle::Alphabetic.label(28), "AB");
        assert_eq!(NumberingStyle::Roman.label(4), "IV");
        assert_eq!(NumberingStyle::Roman.label(1994), "MCMXCIV");
    }

    #[test]
    fn test_stroke_color_retints_fill_keeping_opacity() {
        let palette = StylePalette::default();
        let blue = Color::rgb(0.0, 0.2, 1.0);
        let next = apply_style_change(&palette, &StyleChange::StrokeColor(blue));
        assert_eq!(next.stroke_color, blue);
        assert_eq!(next.fill_color, blue.with_alpha(palette.fill_color.a));
        // input untouched
        assert_eq!(palette.stroke_color, Color::default());
    }

    #[test]
    fn test_fill_opacity_keeps_hue() {
        let palette = StylePalette::default();
        let next = apply_style_change(&palette, &StyleChange::FillOpacity(0.8));
        assert_eq!(next.fill_color.r, palette.fill_color.r);
        assert!((next.fill_color.a - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_change_clamps_values() {
        let palette = StylePalette::default();
        let next = apply_style_change(&palette, &StyleChange::PixelBlockSize(1000));
        assert_eq!(next.pixel_block_size, 64);
        let next = apply_style_change(&palette, &StyleChange::SpotlightDim(-1.0));
        assert_eq!(next.spotlight_dim, 0.0);
    }

    #[test]
    fn test_apply_to_skips_unrelated_kinds() {
        let palette = apply_style_change(&StylePalette::default(), &StyleChange::StrokeWidth(9.0));
        let line = Annotation::new(
            1,
            1,
            AnnotationKind::Line(LineAnnotation {
                start: Point::new(0.0, 0.0),
                end: Point::new(10.0, 10.0),
                stroke: StrokeStyle::default(),
            }),
        );
        let updated = StyleChange::StrokeWidth(9.0).apply_to(&line, &palette).unwrap();
        match updated.kind {
            AnnotationKind::Line(l) => assert_eq!(l.stroke.width, 9.0),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(StyleChange::BlurRadius(3.0).apply_to(&line, &palette).is_none());
    }

    #[test]
    fn test_text_background_follows_palette_fill() {
        let change = StyleChange::TextBackground(true);
        let palette = apply_style_change(&StylePalette::default(), &change);
        let text = Annotation::new(
            1,
            1,
            AnnotationKind::Text(TextAnnotation {
                position: Point::new(5.0, 5.0),
                size: Size::new(40.0, 20.0),
                rotation: 0.0,
                text: String::from("Text"),
                font: FontSpec {
                    name: palette.font_name.clone(),
                    size: palette.font_size,
                    bold: false,
                    italic: false,
                },
                color: palette.stroke_color,
                background: None,
            }),
        );
        let updated = change.apply_to(&text, &palette).unwrap();
        let AnnotationKind::Text(t) = updated.kind else {
            panic!("not text");
        };
        assert_eq!(t.background, Some(palette.fill_color));
        assert_eq!(t.background, palette.text_background_color());

        let off = apply_style_change(&palette, &StyleChange::TextBackground(false));
        assert!(off.text_background_color().is_none());
    }
}
