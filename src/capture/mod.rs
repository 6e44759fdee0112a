//! Image input and output
//!
//! This module consolidates:
//! - The captured base image with its content fingerprint (image.rs)
//! - Encoding/saving of rendered results (export.rs)

pub mod export;
pub mod image;
