//! Annotation canvas engine for screenshots
//!
//! A base image plus an ordered set of vector and effect annotations, edited
//! through tool gestures with full undo/redo, and flattened into a final
//! image on export.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod domain;
pub mod render;
pub mod session;
