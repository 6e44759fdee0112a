//! Annotation editing
//!
//! This module provides:
//! - The annotation store and its undo history
//! - Geometry transforms (translate, resize, rotate)
//! - Selection, hit-testing and handle layout
//! - The per-tool gesture state machine and crop
//! - Message handlers for EditMsg

pub mod crop;
pub mod handlers;
pub mod history;
pub mod selection;
pub mod store;
pub mod tools;
pub mod transform;
