//! Crop: cut the base image down to the pending crop frame
//!
//! The rebasing itself is pure. It builds a complete replacement store and
//! only hands it back when every annotation made it across, so a failure
//! leaves the caller's store untouched.

use crate::domain::{Annotation, AnnotationKind, CropAnnotation, PixelRect, Rect};

use super::store::AnnotationStore;
use super::transform::{editable_frame, translate_onto};

/// Pixel region a crop would keep
///
/// The crop frame clipped to the image and rounded to whole pixels, or
/// `None` when the clipped frame is smaller than 1x1 before rounding.
pub fn crop_region(store: &AnnotationStore) -> Option<PixelRect> {
    let crop = store.crop()?;
    let clipped = editable_frame(crop).intersection(&store.image_bounds())?;
    if clipped.width < 1.0 || clipped.height < 1.0 {
        return None;
    }
    let region = store
        .base_image()
        .pixel_bounds()
        .intersect(clipped.to_pixel_rect())?;
    region.dimensions()?;
    Some(region)
}

/// Store as it looks after applying the pending crop
///
/// Every non-crop annotation is shifted by the negated origin of the pixel
/// region onto the cropped image. Blur and pixelate rebuild their sample
/// source against it; those that end up outside the new image are kept and
/// simply sample nothing.
pub fn cropped_store(store: &AnnotationStore) -> Option<AnnotationStore> {
    let Some(region) = crop_region(store) else {
        log::debug!("No usable crop region");
        return None;
    };
    let image = store.base_image().cropped(region)?;
    let delta = region.to_rect().origin().negated();

    let mut next = store.empty_with_base(image);
    for annotation in store.iter().filter(|a| !a.is_crop()) {
        let Some(moved) = translate_onto(annotation, delta, next.base_image()) else {
            log::warn!("Could not rebase annotation {}, abandoning crop", annotation.id);
            return None;
        };
        if !next.add(moved) {
            return None;
        }
    }
    log::info!(
        "Cropped to {}x{} at ({}, {})",
        region.width(),
        region.height(),
        region.left,
        region.top
    );
    Some(next)
}

/// z-order for a crop: above every other annotation
pub fn crop_z(store: &AnnotationStore) -> i64 {
    store
        .iter()
        .filter(|a| !a.is_crop())
        .map(|a| a.z)
        .max()
        .map_or(0, |z| z.saturating_add(1))
}

/// Crop annotation covering `frame`, reusing the id of the pending crop
pub fn crop_annotation(store: &mut AnnotationStore, frame: Rect) -> Annotation {
    let id = match store.crop() {
        Some(existing) => existing.id,
        None => store.next_id(),
    };
    Annotation::new(id, crop_z(store), AnnotationKind::Crop(CropAnnotation { frame }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::transform::sample_source_for;
    use crate::capture::image::BaseImage;
    use crate::domain::{BlurAnnotation, LineAnnotation, Point, RectangleAnnotation, StrokeStyle};
    use image::{Rgba, RgbaImage};

    fn store(width: u32, height: u32) -> AnnotationStore {
        AnnotationStore::new(BaseImage::new(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, 0, 255])
        })))
    }

    fn add_crop(store: &mut AnnotationStore, frame: Rect) {
        let crop = crop_annotation(store, frame);
        store.replace(crop);
    }

    #[test]
    fn test_crop_rebases_everything() {
        let mut s = store(120, 90);
        let rect = s.prepare(AnnotationKind::Rectangle(RectangleAnnotation {
            frame: Rect::new(30.0, 20.0, 10.0, 10.0),
            rotation: 0.0,
            stroke: StrokeStyle::default(),
            fill: None,
            corner_radius: 0.0,
        }));
        s.add(rect.clone());
        let line = s.prepare(AnnotationKind::Line(LineAnnotation {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 80.0),
            stroke: StrokeStyle::default(),
        }));
        s.add(line.clone());
        add_crop(&mut s, Rect::new(20.0, 10.0, 50.0, 40.0));

        let next = cropped_store(&s).unwrap();
        assert_eq!(next.base_image().dimensions(), (50, 40));
        assert_eq!(next.base_image().rgba().get_pixel(0, 0), &Rgba([20, 10, 0, 255]));
        assert!(next.crop().is_none());
        assert_eq!(next.len(), 2);

        let moved = next.get(rect.id).unwrap();
        assert!(editable_frame(moved).approx_eq(&Rect::new(10.0, 10.0, 10.0, 10.0)));
        let pts = next.get(line.id).unwrap().points();
        assert!(pts[0].approx_eq(Point::new(-20.0, -10.0)));
        assert!(pts[1].approx_eq(Point::new(80.0, 70.0)));
        // ids keep flowing from the old store
        assert_eq!(next.peek_next_id(), s.peek_next_id());
    }

    #[test]
    fn test_crop_clips_to_image() {
        let mut s = store(40, 40);
        add_crop(&mut s, Rect::new(30.0, -5.0, 30.0, 20.0));
        assert_eq!(crop_region(&s), Some(PixelRect::new(30, 0, 40, 15)));
        let next = cropped_store(&s).unwrap();
        assert_eq!(next.base_image().dimensions(), (10, 15));
    }

    #[test]
    fn test_crop_rejects_degenerate_regions() {
        let mut s = store(40, 40);
        assert!(cropped_store(&s).is_none());

        add_crop(&mut s, Rect::new(50.0, 50.0, 10.0, 10.0));
        assert!(crop_region(&s).is_none());

        add_crop(&mut s, Rect::new(10.0, 10.0, 0.4, 20.0));
        assert!(crop_region(&s).is_none());
    }

    #[test]
    fn test_crop_narrower_than_one_pixel_is_rejected() {
        let mut s = store(40, 40);
        // would round up to a 1px column
        add_crop(&mut s, Rect::new(10.0, 10.0, 0.6, 20.0));
        assert!(crop_region(&s).is_none());
        assert!(cropped_store(&s).is_none());

        // clipped by the image edge down to half a pixel
        add_crop(&mut s, Rect::new(39.5, 0.0, 10.0, 10.0));
        assert!(crop_region(&s).is_none());

        add_crop(&mut s, Rect::new(10.0, 10.0, 1.0, 1.0));
        assert_eq!(crop_region(&s), Some(PixelRect::new(10, 10, 11, 11)));
    }

    #[test]
    fn test_fractional_crop_offsets_by_pixel_origin() {
        let mut s = store(120, 90);
        let rect = s.prepare(AnnotationKind::Rectangle(RectangleAnnotation {
            frame: Rect::new(30.0, 30.0, 20.0, 10.0),
            rotation: 0.0,
            stroke: StrokeStyle::default(),
            fill: None,
            corner_radius: 0.0,
        }));
        s.add(rect.clone());
        add_crop(&mut s, Rect::new(20.4, 10.4, 50.0, 40.0));
        let region = crop_region(&s).unwrap();
        assert_eq!(region, PixelRect::new(20, 10, 70, 50));

        let next = cropped_store(&s).unwrap();
        assert_eq!(next.base_image().dimensions(), (50, 40));
        assert_eq!(next.base_image().rgba().get_pixel(0, 0), &Rgba([20, 10, 0, 255]));
        let moved = editable_frame(next.get(rect.id).unwrap());
        // shifted by the whole-pixel origin, not the fractional frame origin
        assert!(moved.approx_eq(&Rect::new(10.0, 20.0, 20.0, 10.0)));
    }

    #[test]
    fn test_blur_outside_crop_is_kept_with_empty_source() {
        let mut s = store(100, 100);
        let frame = Rect::new(80.0, 80.0, 10.0, 10.0);
        let blur = s.prepare(AnnotationKind::Blur(BlurAnnotation {
            frame,
            radius: 4.0,
            source: sample_source_for(&frame, s.base_image()),
        }));
        s.add(blur.clone());
        add_crop(&mut s, Rect::new(0.0, 0.0, 50.0, 50.0));

        let next = cropped_store(&s).unwrap();
        let kept = next.get(blur.id).unwrap();
        let AnnotationKind::Blur(b) = &kept.kind else {
            panic!("kind changed");
        };
        assert_eq!(b.source.image, next.base_image().fingerprint());
        assert!(b.source.region.dimensions().is_none());
    }

    #[test]
    fn test_crop_annotation_reuses_pending_id() {
        let mut s = store(40, 40);
        add_crop(&mut s, Rect::new(0.0, 0.0, 10.0, 10.0));
        let first = s.crop().unwrap().clone();
        let second = crop_annotation(&mut s, Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(first.id, second.id);
        assert_eq!(first.z, second.z);
    }
}
