//! Pure Rust raster codec on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (JPEG, PNG, WebP, GIF) | `image::load_from_memory` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use super::backend::{BackendError, Dimensions, ImageBackend, Raster};
use super::params::{OutputFormat, Quality};
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageReader, RgbaImage};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn to_rgba_image(raster: &Raster) -> Result<RgbaImage, BackendError> {
    RgbaImage::from_raw(raster.width, raster.height, raster.pixels.clone()).ok_or_else(|| {
        BackendError::Encode(format!(
            "pixel buffer does not match {}x{}",
            raster.width, raster.height
        ))
    })
}

fn from_rgba_image(img: RgbaImage) -> Raster {
    let (width, height) = img.dimensions();
    Raster {
        width,
        height,
        pixels: img.into_raw(),
    }
}

/// Encode as baseline JPEG. Alpha is dropped; JPEG has no alpha channel.
fn encode_jpeg(img: RgbaImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
    let mut buffer = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.value() as u8)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buffer)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Raster, BackendError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| BackendError::Decode(format!("Failed to decode image: {e}")))?;
        Ok(from_rgba_image(img.to_rgba8()))
    }

    fn resize(&self, raster: &Raster, width: u32, height: u32) -> Result<Raster, BackendError> {
        let img = to_rgba_image(raster)?;
        let resized = image::imageops::resize(&img, width, height, FilterType::Lanczos3);
        Ok(from_rgba_image(resized))
    }

    fn encode(
        &self,
        raster: &Raster,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let img = to_rgba_image(raster)?;
        match format {
            OutputFormat::Jpeg => encode_jpeg(img, quality),
        }
    }
}
