//! Base image type for captured screenshots

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;

use crate::domain::{PixelRect, Rect};

/// The raster an edit session annotates
///
/// Pixels are shared behind an `Arc` so undo snapshots only copy a handle.
/// The fingerprint is a content hash identifying these exact pixels; effect
/// caches key on it instead of on pointer identity.
#[derive(Clone, Debug)]
pub struct BaseImage {
    rgba: Arc<RgbaImage>,
    fingerprint: u64,
}

impl PartialEq for BaseImage {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.dimensions() == other.dimensions()
    }
}

impl BaseImage {
    /// Wrap a captured image
    pub fn new(rgba: RgbaImage) -> Self {
        let fingerprint = fingerprint(&rgba);
        log::debug!(
            "BaseImage created: {}x{} pixels, fingerprint {:016x}",
            rgba.width(),
            rgba.height(),
            fingerprint
        );
        Self {
            rgba: Arc::new(rgba),
            fingerprint,
        }
    }

    /// Load an image file from disk
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to open image {}", path.display()))?
            .to_rgba8();
        if img.width() == 0 || img.height() == 0 {
            anyhow::bail!("image {} is empty", path.display());
        }
        Ok(Self::new(img))
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rgba.dimensions()
    }

    pub fn pixel_bounds(&self) -> PixelRect {
        PixelRect::of_image(self.width(), self.height())
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Copy out a sub-region as a new base image
    ///
    /// Returns `None` when the region does not overlap the image.
    pub fn cropped(&self, region: PixelRect) -> Option<BaseImage> {
        let clipped = self.pixel_bounds().intersect(region)?;
        let dims = clipped.dimensions()?;
        let sub = image::imageops::crop_imm(
            self.rgba.as_ref(),
            clipped.left as u32,
            clipped.top as u32,
            dims.width(),
            dims.height(),
        )
        .to_image();
        Some(BaseImage::new(sub))
    }

    /// Pixels of `region` (clipped to the image), `None` if empty
    pub fn region(&self, region: PixelRect) -> Option<RgbaImage> {
        let clipped = self.pixel_bounds().intersect(region)?;
        let dims = clipped.dimensions()?;
        Some(
            image::imageops::crop_imm(
                self.rgba.as_ref(),
                clipped.left as u32,
                clipped.top as u32,
                dims.width(),
                dims.height(),
            )
            .to_image(),
        )
    }
}

fn fingerprint(rgba: &RgbaImage) -> u64 {
    let mut hasher = DefaultHasher::new();
    rgba.dimensions().hash(&mut hasher);
    rgba.as_raw().hash(&mut hasher);
    hasher.finish()
}
