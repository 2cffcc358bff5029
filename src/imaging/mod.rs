//! Image compression in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | Lanczos3 |
//! | **Encode** | JPEG at a fixed quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Quality and output format
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`compress`] / [`compress_many`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Raster};
pub use calculations::{exceeds, fit_within};
pub use operations::{
    CompressError, CompressSettings, CompressedFile, Rejection, accepts, compress, compress_many,
};
pub use params::{OutputFormat, Quality};
pub use rust_backend::RustBackend;
