//! Annotation types for drawing on screenshots
//!
//! All annotation types store coordinates in the coordinate space of the
//! current base image.

use super::geometry::{PixelRect, Point, Rect, Size};
use super::style::{ArrowHead, Color, NumberingStyle};

/// Identifier of an annotation, unique within a store
pub type AnnotationId = u64;

/// Stroke parameters shared by outline shapes
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 4.0,
            dashed: false,
        }
    }
}

/// Font request handed to the text measurement service
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub name: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

/// Which pixels a region-sampling annotation filters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleSource {
    /// Fingerprint of the base image the region was taken from
    pub image: u64,
    /// Sampled region in that image; clipped to the image when drawn
    pub region: PixelRect,
}

/// Outline rectangle, optionally filled and rounded
#[derive(Clone, Debug, PartialEq)]
pub struct RectangleAnnotation {
    pub frame: Rect,
    /// Rotation around the frame center in degrees
    pub rotation: f32,
    pub stroke: StrokeStyle,
    pub fill: Option<Color>,
    pub corner_radius: f32,
}

/// Outline ellipse inscribed in its frame
#[derive(Clone, Debug, PartialEq)]
pub struct EllipseAnnotation {
    pub frame: Rect,
    pub rotation: f32,
    pub stroke: StrokeStyle,
    pub fill: Option<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineAnnotation {
    pub start: Point,
    pub end: Point,
    pub stroke: StrokeStyle,
}

/// Line with a head drawn at `end`
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowAnnotation {
    pub start: Point,
    pub end: Point,
    pub stroke: StrokeStyle,
    pub head: ArrowHead,
}

/// Wide translucent marker line
#[derive(Clone, Debug, PartialEq)]
pub struct HighlighterAnnotation {
    pub start: Point,
    pub end: Point,
    pub color: Color,
    pub width: f32,
}

/// Freehand stroke; points are smoothed when rendered
#[derive(Clone, Debug, PartialEq)]
pub struct PencilAnnotation {
    pub points: Vec<Point>,
    pub stroke: StrokeStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextAnnotation {
    /// Top-left corner of the unrotated text box
    pub position: Point,
    /// Measured size of `text` in `font`
    pub size: Size,
    pub rotation: f32,
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    pub background: Option<Color>,
}

/// Numbered marker badge
#[derive(Clone, Debug, PartialEq)]
pub struct CounterAnnotation {
    pub center: Point,
    pub radius: f32,
    pub value: u32,
    pub style: NumberingStyle,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlurAnnotation {
    pub frame: Rect,
    pub radius: f32,
    pub source: SampleSource,
}

/// Pixelation annotation for obscuring sensitive content with pixelation effect
#[derive(Clone, Debug, PartialEq)]
pub struct PixelateAnnotation {
    pub frame: Rect,
    /// Block size for this pixelation
    pub block_size: u32,
    pub source: SampleSource,
}

/// Dims the whole canvas except `frame`
#[derive(Clone, Debug, PartialEq)]
pub struct SpotlightAnnotation {
    pub frame: Rect,
    /// Opacity of the dimming outside the frame
    pub dim: f32,
}

/// Pending crop region; an editing affordance, never exported
#[derive(Clone, Debug, PartialEq)]
pub struct CropAnnotation {
    pub frame: Rect,
}

/// Variant payload of an annotation
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationKind {
    Rectangle(RectangleAnnotation),
    Ellipse(EllipseAnnotation),
    Line(LineAnnotation),
    Arrow(ArrowAnnotation),
    Highlighter(HighlighterAnnotation),
    Pencil(PencilAnnotation),
    Text(TextAnnotation),
    Counter(CounterAnnotation),
    Blur(BlurAnnotation),
    Pixelate(PixelateAnnotation),
    Spotlight(SpotlightAnnotation),
    Crop(CropAnnotation),
}

/// An annotation instance: identity, draw order, visibility and geometry
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub z: i64,
    pub visible: bool,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(id: AnnotationId, z: i64, kind: AnnotationKind) -> Self {
        Self {
            id,
            z,
            visible: true,
            kind,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            AnnotationKind::Rectangle(_) => "rectangle",
            AnnotationKind::Ellipse(_) => "ellipse",
            AnnotationKind::Line(_) => "line",
            AnnotationKind::Arrow(_) => "arrow",
            AnnotationKind::Highlighter(_) => "highlighter",
            AnnotationKind::Pencil(_) => "pencil",
            AnnotationKind::Text(_) => "text",
            AnnotationKind::Counter(_) => "counter",
            AnnotationKind::Blur(_) => "blur",
            AnnotationKind::Pixelate(_) => "pixelate",
            AnnotationKind::Spotlight(_) => "spotlight",
            AnnotationKind::Crop(_) => "crop",
        }
    }

    pub fn is_crop(&self) -> bool {
        matches!(self.kind, AnnotationKind::Crop(_))
    }

    /// Check if this annotation filters pixels of the base image (blur, pixelate)
    pub fn is_region_sampling(&self) -> bool {
        matches!(self.kind, AnnotationKind::Blur(_) | AnnotationKind::Pixelate(_))
    }

    /// Check if this annotation is defined by points rather than a frame
    pub fn is_line_like(&self) -> bool {
        matches!(
            self.kind,
            AnnotationKind::Line(_)
                | AnnotationKind::Arrow(_)
                | AnnotationKind::Highlighter(_)
                | AnnotationKind::Pencil(_)
        )
    }

    /// Geometry points of line-like variants, empty otherwise
    pub fn points(&self) -> Vec<Point> {
        match &self.kind {
            AnnotationKind::Line(l) => vec![l.start, l.end],
            AnnotationKind::Arrow(a) => vec![a.start, a.end],
            AnnotationKind::Highlighter(h) => vec![h.start, h.end],
            AnnotationKind::Pencil(p) => p.points.clone(),
            _ => Vec::new(),
        }
    }

    /// Stored rotation in degrees; zero for variants without an angle field
    pub fn rotation(&self) -> f32 {
        match &self.kind {
            AnnotationKind::Rectangle(r) => r.rotation,
            AnnotationKind::Ellipse(e) => e.rotation,
            AnnotationKind::Text(t) => t.rotation,
            _ => 0.0,
        }
    }

    /// Half the painted line width, used to pad bounds and hit areas
    pub fn half_stroke(&self) -> f32 {
        match &self.kind {
            AnnotationKind::Rectangle(r) => r.stroke.width * 0.5,
            AnnotationKind::Ellipse(e) => e.stroke.width * 0.5,
            AnnotationKind::Line(l) => l.stroke.width * 0.5,
            AnnotationKind::Arrow(a) => a.stroke.width * 0.5,
            AnnotationKind::Highlighter(h) => h.width * 0.5,
            AnnotationKind::Pencil(p) => p.stroke.width * 0.5,
            _ => 0.0,
        }
    }

    /// Copy with a new identity and draw position
    pub fn duplicate(&self, id: AnnotationId, z: i64) -> Annotation {
        Annotation {
            id,
            z,
            visible: self.visible,
            kind: self.kind.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle() -> Annotation {
        Annotation::new(
            7,
            3,
            AnnotationKind::Rectangle(RectangleAnnotation {
                frame: Rect::new(0.0, 0.0, 10.0, 10.0),
                rotation: 30.0,
                stroke: StrokeStyle::default(),
                fill: None,
                corner_radius: 0.0,
            }),
        )
    }

    #[test]
    fn test_duplicate_gets_new_identity() {
        let original = rectangle();
        let copy = original.duplicate(8, 4);
        assert_eq!(copy.id, 8);
        assert_eq!(copy.z, 4);
        assert_eq!(copy.kind, original.kind);
    }

    #[test]
    fn test_classification() {
        let rect = rectangle();
        assert!(!rect.is_line_like());
        assert!(!rect.is_region_sampling());
        assert_eq!(rect.rotation(), 30.0);
        assert_eq!(rect.kind_name(), "rectangle");

        let pencil = Annotation::new(
            1,
            1,
            AnnotationKind::Pencil(PencilAnnotation {
                points: vec![Point::new(1.0, 1.0), Point::new(2.0, 3.0)],
                stroke: StrokeStyle::default(),
            }),
        );
        assert!(pencil.is_line_like());
        assert_eq!(pencil.points().len(), 2);
        assert_eq!(pencil.rotation(), 0.0);
    }
}
