//! Region filters for blur and pixelate annotations, plus their memo cache
//!
//! Processed pixels are keyed by a structural description of the input
//! (source image fingerprint, effect, parameter, region), never by the
//! identity of the annotation that asked for them.

use std::collections::{HashMap, HashSet};

use image::RgbaImage;

use crate::capture::image::BaseImage;
use crate::domain::{Annotation, AnnotationKind, PixelRect};

/// Which filter produced a cached image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    Blur,
    Pixelate,
}

/// Cache key: everything that determines the filter output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectKey {
    pub image: u64,
    pub effect: Effect,
    /// Parameter bits (`f32::to_bits` of the radius, or the block size)
    pub param: u32,
    pub region: PixelRect,
}

impl EffectKey {
    /// Key for a region-sampling annotation, with its region clipped to `image`
    ///
    /// `None` for other variants, or when the annotation was sampled from a
    /// different image than `image`.
    pub fn for_annotation(annotation: &Annotation, image: &BaseImage) -> Option<Self> {
        let (effect, param, source) = match &annotation.kind {
            AnnotationKind::Blur(b) => (Effect::Blur, b.radius.to_bits(), b.source),
            AnnotationKind::Pixelate(p) => (Effect::Pixelate, p.block_size, p.source),
            _ => return None,
        };
        if source.image != image.fingerprint() {
            log::debug!(
                "Annotation {} samples image {:x}, not the current base",
                annotation.id,
                source.image
            );
            return None;
        }
        let region = image.pixel_bounds().intersect(source.region)?;
        Some(Self {
            image: source.image,
            effect,
            param,
            region,
        })
    }
}

/// Gaussian blur of a whole sub-image
pub fn blur_region(region: &RgbaImage, radius: f32) -> Option<RgbaImage> {
    if region.width() == 0 || region.height() == 0 || !radius.is_finite() {
        return None;
    }
    if radius <= 0.0 {
        return Some(region.clone());
    }
    Some(image::imageops::blur(region, radius))
}

/// Replace each `block`-sized cell with its average color
pub fn pixelate_region(region: &RgbaImage, block: u32) -> Option<RgbaImage> {
    if region.width() == 0 || region.height() == 0 || block == 0 {
        return None;
    }
    let mut img = region.clone();
    let (width, height) = img.dimensions();

    let mut block_y = 0;
    while block_y < height {
        let block_end_y = (block_y + block).min(height);

        let mut block_x = 0;
        while block_x < width {
            let block_end_x = (block_x + block).min(width);

            // Calculate average color for this block
            let mut totals = [0u64; 4];
            let mut pixel_count: u64 = 0;
            for py in block_y..block_end_y {
                for px in block_x..block_end_x {
                    let pixel = img.get_pixel(px, py);
                    for (total, channel) in totals.iter_mut().zip(pixel.0) {
                        *total += u64::from(channel);
                    }
                    pixel_count += 1;
                }
            }

            if pixel_count > 0 {
                let avg_color = image::Rgba(totals.map(|t| (t / pixel_count) as u8));
                for py in block_y..block_end_y {
                    for px in block_x..block_end_x {
                        img.put_pixel(px, py, avg_color);
                    }
                }
            }

            block_x += block;
        }
        block_y += block;
    }
    Some(img)
}

/// Memoized filter output
#[derive(Clone, Debug, Default)]
pub struct EffectCache {
    entries: HashMap<EffectKey, RgbaImage>,
}

impl EffectCache {
    /// Processed pixels for `key`, computing and storing them on a miss
    ///
    /// A failing filter caches nothing, so the caller leaves the raw region
    /// visible.
    pub fn get_or_compute(&mut self, key: EffectKey, image: &BaseImage) -> Option<&RgbaImage> {
        if !self.entries.contains_key(&key) {
            let Some(processed) = Self::compute(&key, image) else {
                log::debug!("Filter produced nothing for {:?}", key);
                return None;
            };
            self.entries.insert(key, processed);
        }
        self.entries.get(&key)
    }

    fn compute(key: &EffectKey, image: &BaseImage) -> Option<RgbaImage> {
        let source = image.region(key.region)?;
        match key.effect {
            Effect::Blur => blur_region(&source, f32::from_bits(key.param)),
            Effect::Pixelate => pixelate_region(&source, key.param),
        }
    }

    /// Drop every entry computed from the given image
    pub fn invalidate_image(&mut self, fingerprint: u64) {
        self.entries.retain(|key, _| key.image != fingerprint);
    }

    /// Keep only the entries whose key is in `live`
    pub fn retain_keys(&mut self, live: &HashSet<EffectKey>) {
        let before = self.entries.len();
        self.entries.retain(|key, _| live.contains(key));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            log::trace!("Dropped {} stale filter results", dropped);
        }
    }

    pub fn contains(&self, key: &EffectKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
