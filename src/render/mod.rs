//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared by the drawing code
//! - Blur/pixelate filters and their memo cache
//! - Text measurement and drawing
//! - Per-annotation drawing using tiny-skia
//! - Final and live compositing

pub mod compose;
pub mod effects;
pub mod geometry;
pub mod image;
pub mod text;

pub use compose::{LiveOverlay, export_rect, render_final, render_live};
pub use effects::EffectCache;
pub use text::{CellTextEngine, TextEngine};
