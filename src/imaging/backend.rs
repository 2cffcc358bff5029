//! Raster codec trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between compression logic and the
//! platform's imaging library: identify, decode, resize and encode, all on
//! in-memory buffers. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::{OutputFormat, Quality};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Input bytes are not a decodable image.
    #[error("Decode failed: {0}")]
    Decode(String),
    /// The encoder failed or produced no output.
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decoded pixels, RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Trait for raster codec backends.
///
/// `Sync` so a single backend can serve a rayon batch.
pub trait ImageBackend: Sync {
    /// Read dimensions without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode an encoded image into RGBA pixels.
    fn decode(&self, bytes: &[u8]) -> Result<Raster, BackendError>;

    /// Resample to exactly `width` x `height`.
    fn resize(&self, raster: &Raster, width: u32, height: u32) -> Result<Raster, BackendError>;

    /// Encode pixels in a lossy format.
    fn encode(
        &self,
        raster: &Raster,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
