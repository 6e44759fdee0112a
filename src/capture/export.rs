//! Encoding and saving rendered images

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::config::SaveLocation;

/// Default quality for lossy formats
pub const DEFAULT_QUALITY: u8 = 90;

/// File format of an exported image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Tiff => "tiff",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "tif" | "tiff" => Some(ExportFormat::Tiff),
            _ => None,
        }
    }
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Encode `img` into bytes; `quality` (1-100) only affects JPEG
pub fn encode_image(img: &RgbaImage, format: ExportFormat, quality: u8) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        ExportFormat::Png => write_png(&mut buffer, img).context("failed to encode PNG")?,
        ExportFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            encoder
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .context("failed to encode JPEG")?;
        }
        ExportFormat::Tiff => {
            let mut cursor = Cursor::new(&mut buffer);
            TiffEncoder::new(&mut cursor)
                .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
                .context("failed to encode TIFF")?;
        }
    }
    log::debug!(
        "Encoded {}x{} image as {} ({} bytes)",
        img.width(),
        img.height(),
        format.extension(),
        buffer.len()
    );
    Ok(buffer)
}

/// Encode and write `img` to `path`
pub fn save_image(
    img: &RgbaImage,
    path: &Path,
    format: ExportFormat,
    quality: u8,
) -> anyhow::Result<()> {
    let bytes = encode_image(img, format, quality)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Saved screenshot to {}", path.display());
    Ok(())
}

/// Timestamped file path in the configured save location
pub fn default_output_path(location: SaveLocation, format: ExportFormat) -> Option<PathBuf> {
    let mut path = match location {
        SaveLocation::Pictures => {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        }
        SaveLocation::Documents => {
            dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        }
    }?;
    let name = chrono::Local::now()
        .format(&format!("Screenshot_%Y-%m-%d_%H-%M-%S.{}", format.extension()))
        .to_string();
    path.push(name);

    Some(path)
}
