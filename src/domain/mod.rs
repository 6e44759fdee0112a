//! Pure domain types with minimal dependencies
//!
//! This module contains the annotation data model and the value types used
//! throughout the engine. Nothing here touches images or rendering.

pub mod annotation;
pub mod geometry;
pub mod selection;
pub mod style;
pub mod tool;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;
pub use style::*;
pub use tool::*;
