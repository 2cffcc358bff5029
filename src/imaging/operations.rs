//! High-level image operations.
//!
//! These functions combine the dimension calculations with backend
//! execution: decide whether an image needs work, compute the target size,
//! and drive decode → resize → encode.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{exceeds, fit_within};
use super::params::{OutputFormat, Quality};
use crate::config::{CompressionConfig, UploadConfig};
use crate::naming::with_extension;
use crate::types::ImageFile;
use chrono::Utc;
use rayon::prelude::*;
use thiserror::Error;

/// A compression failure, tagged with the file it happened on.
#[derive(Error, Debug)]
#[error("{name}: {source}")]
pub struct CompressError {
    pub name: String,
    #[source]
    pub source: BackendError,
}

impl CompressError {
    fn new(file: &ImageFile, source: BackendError) -> Self {
        Self {
            name: file.name.clone(),
            source,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self.source, BackendError::Decode(_))
    }

    pub fn is_encode(&self) -> bool {
        matches!(self.source, BackendError::Encode(_))
    }
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, CompressError>;

/// Output of [`compress`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedFile {
    pub file: ImageFile,
    /// Output dimensions. `None` only when the input was small enough to be
    /// passed through and its header could not be read.
    pub dimensions: Option<Dimensions>,
    /// Whether the bytes were re-encoded.
    pub recompressed: bool,
}

/// Settings for a compression run, from [`CompressionConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressSettings {
    pub target_size_bytes: u64,
    pub max_dimensions: (u32, u32),
    pub quality: Quality,
    pub format: OutputFormat,
}

impl From<&CompressionConfig> for CompressSettings {
    fn from(config: &CompressionConfig) -> Self {
        Self {
            target_size_bytes: config.target_size_bytes(),
            max_dimensions: (config.max_width, config.max_height),
            quality: Quality::new(config.quality),
            format: OutputFormat::Jpeg,
        }
    }
}

impl Default for CompressSettings {
    fn default() -> Self {
        Self::from(&CompressionConfig::default())
    }
}

fn kib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Compress one image so it fits the size and dimension budget.
///
/// Files at or under the target size are returned untouched. Everything
/// else is decoded, scaled to fit `max_dimensions` (never up) and
/// re-encoded as JPEG named `<stem>.jpg`.
pub fn compress(
    backend: &impl ImageBackend,
    file: &ImageFile,
    settings: &CompressSettings,
) -> Result<CompressedFile> {
    if file.size() <= settings.target_size_bytes {
        log::info!(
            "{}: already small enough ({:.1}KB)",
            file.name,
            kib(file.size())
        );
        return Ok(CompressedFile {
            file: file.clone(),
            dimensions: backend.identify(&file.bytes).ok(),
            recompressed: false,
        });
    }

    let raster = backend
        .decode(&file.bytes)
        .map_err(|e| CompressError::new(file, e))?;
    let source = raster.dimensions().as_tuple();

    let raster = if exceeds(source, settings.max_dimensions) {
        let (width, height) = fit_within(source, settings.max_dimensions);
        backend
            .resize(&raster, width, height)
            .map_err(|e| CompressError::new(file, e))?
    } else {
        raster
    };
    let output = raster.dimensions();

    let bytes = backend
        .encode(&raster, settings.format, settings.quality)
        .map_err(|e| CompressError::new(file, e))?;
    if bytes.is_empty() {
        return Err(CompressError::new(
            file,
            BackendError::Encode("encoder produced no output".to_string()),
        ));
    }

    let compressed = ImageFile {
        name: with_extension(&file.name, settings.format.extension()),
        content_type: settings.format.content_type().to_string(),
        bytes,
        last_modified: Utc::now(),
    };

    log::info!(
        "{}: {:.1}KB → {:.1}KB ({}x{} → {}x{})",
        file.name,
        kib(file.size()),
        kib(compressed.size()),
        source.0,
        source.1,
        output.width,
        output.height
    );

    Ok(CompressedFile {
        file: compressed,
        dimensions: Some(output),
        recompressed: true,
    })
}

/// Compress a batch in parallel.
///
/// The output order always matches `files`. Any failure fails the batch;
/// when several files fail, the error for the earliest one is returned.
pub fn compress_many(
    backend: &impl ImageBackend,
    files: &[ImageFile],
    settings: &CompressSettings,
) -> Result<Vec<CompressedFile>> {
    let results: Vec<Result<CompressedFile>> = files
        .par_iter()
        .map(|file| compress(backend, file, settings))
        .collect();
    results.into_iter().collect()
}

/// Media types the picker hands to the compressor.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Extensions accepted alongside [`ACCEPTED_CONTENT_TYPES`].
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Why a picked file was refused before compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedType(String),
    TooLarge { size: u64, limit: u64 },
}

/// Picker-side filter: supported image type and within the intake size limit.
pub fn accepts(file: &ImageFile, upload: &UploadConfig) -> std::result::Result<(), Rejection> {
    let type_ok = ACCEPTED_CONTENT_TYPES.contains(&file.content_type.as_str())
        && file
            .extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()));
    if !type_ok {
        return Err(Rejection::UnsupportedType(file.name.clone()));
    }
    let limit = upload.max_file_size_bytes();
    if file.size() > limit {
        return Err(Rejection::TooLarge {
            size: file.size(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, mock_bytes};

    const MB: usize = 1024 * 1024;

    fn mock_file(name: &str, width: u32, height: u32, len: usize) -> ImageFile {
        ImageFile::new(name, "image/png", mock_bytes(width, height, len))
    }

    // =========================================================================
    // compress with mock backend
    // =========================================================================

    #[test]
    fn small_file_is_passed_through() {
        let backend = MockBackend::new();
        let file = mock_file("tiny.png", 4000, 3000, 500 * 1024);

        let result = compress(&backend, &file, &CompressSettings::default()).unwrap();

        assert!(!result.recompressed);
        assert_eq!(result.file, file);
        assert_eq!(result.dimensions.map(Dimensions::as_tuple), Some((4000, 3000)));
        // identify only; no decode, no encode
        assert_eq!(backend.get_operations(), vec![RecordedOp::Identify(4000, 3000)]);
    }

    #[test]
    fn file_exactly_at_threshold_is_passed_through() {
        let backend = MockBackend::new();
        let file = mock_file("edge.png", 100, 100, 1000 * 1024);
        let result = compress(&backend, &file, &CompressSettings::default()).unwrap();
        assert!(!result.recompressed);
    }

    #[test]
    fn small_unidentifiable_file_still_passes() {
        let backend = MockBackend::new();
        let file = ImageFile::new("odd.webp", "image/webp", vec![0xff; 100]);
        let result = compress(&backend, &file, &CompressSettings::default()).unwrap();
        assert_eq!(result.dimensions, None);
        assert_eq!(result.file.bytes, file.bytes);
    }

    #[test]
    fn large_file_is_resized_and_renamed() {
        let backend = MockBackend::new();
        let file = mock_file("IMG_0042.PNG", 4000, 3000, 2 * MB);

        let result = compress(&backend, &file, &CompressSettings::default()).unwrap();

        assert!(result.recompressed);
        assert_eq!(result.file.name, "IMG_0042.jpg");
        assert_eq!(result.file.content_type, "image/jpeg");
        assert_eq!(result.dimensions.unwrap().as_tuple(), (1920, 1440));
        assert!(result.file.last_modified >= file.last_modified);

        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![
                RecordedOp::Decode(4000, 3000),
                RecordedOp::Resize {
                    from: (4000, 3000),
                    to: (1920, 1440)
                },
                RecordedOp::Encode {
                    width: 1920,
                    height: 1440,
                    quality: 80
                },
            ]
        );
    }

    #[test]
    fn large_file_within_bounds_is_reencoded_without_resize() {
        let backend = MockBackend::new();
        let file = mock_file("scan.png", 1200, 900, 3 * MB);

        let result = compress(&backend, &file, &CompressSettings::default()).unwrap();

        assert_eq!(result.dimensions.unwrap().as_tuple(), (1200, 900));
        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Resize { .. })));
        assert!(matches!(ops.last(), Some(RecordedOp::Encode { .. })));
    }

    #[test]
    fn input_is_not_mutated() {
        let backend = MockBackend::new();
        let file = mock_file("a.png", 3000, 3000, 2 * MB);
        let before = file.clone();
        compress(&backend, &file, &CompressSettings::default()).unwrap();
        assert_eq!(file, before);
    }

    #[test]
    fn undecodable_input_is_decode_error() {
        let backend = MockBackend::new();
        let file = ImageFile::new("notes.jpg", "image/jpeg", vec![0xff; 2 * MB]);

        let err = compress(&backend, &file, &CompressSettings::default()).unwrap_err();

        assert!(err.is_decode());
        assert_eq!(err.name, "notes.jpg");
    }

    #[test]
    fn empty_encoder_output_is_encode_error() {
        let backend = MockBackend::failing_encoder();
        let file = mock_file("a.png", 3000, 2000, 2 * MB);

        let err = compress(&backend, &file, &CompressSettings::default()).unwrap_err();

        assert!(err.is_encode());
    }

    #[test]
    fn custom_quality_reaches_encoder() {
        let backend = MockBackend::new();
        let settings = CompressSettings {
            quality: Quality::new(55),
            ..CompressSettings::default()
        };
        compress(&backend, &mock_file("a.png", 800, 800, 2 * MB), &settings).unwrap();
        assert!(
            backend
                .get_operations()
                .contains(&RecordedOp::Encode {
                    width: 800,
                    height: 800,
                    quality: 55
                })
        );
    }

    // =========================================================================
    // compress_many
    // =========================================================================

    #[test]
    fn compress_many_preserves_input_order() {
        let backend = MockBackend::new();
        let files: Vec<ImageFile> = (0..24)
            .map(|i| mock_file(&format!("{i:02}.png"), 2000 + i, 1000, 2 * MB))
            .collect();

        let results = compress_many(&backend, &files, &CompressSettings::default()).unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.file.name.as_str()).collect();
        let expected: Vec<String> = (0..24).map(|i| format!("{i:02}.jpg")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn compress_many_mixed_sizes() {
        let backend = MockBackend::new();
        let files = vec![
            mock_file("imgA.png", 4000, 3000, 2 * MB),
            mock_file("imgB.png", 1000, 750, MB / 2),
        ];

        let results = compress_many(&backend, &files, &CompressSettings::default()).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].recompressed);
        let dims = results[0].dimensions.unwrap();
        assert!(dims.width.max(dims.height) <= 1920);
        assert!(!results[1].recompressed);
        assert_eq!(results[1].file, files[1]);
    }

    #[test]
    fn compress_many_fails_whole_batch() {
        let backend = MockBackend::new();
        let files = vec![
            mock_file("ok.png", 4000, 3000, 2 * MB),
            ImageFile::new("broken.png", "image/png", vec![0; 2 * MB]),
            mock_file("ok2.png", 4000, 3000, 2 * MB),
        ];

        let err = compress_many(&backend, &files, &CompressSettings::default()).unwrap_err();
        assert_eq!(err.name, "broken.png");
    }

    #[test]
    fn compress_many_empty_batch() {
        let backend = MockBackend::new();
        let results = compress_many(&backend, &[], &CompressSettings::default()).unwrap();
        assert!(results.is_empty());
    }

    // =========================================================================
    // accepts
    // =========================================================================

    #[test]
    fn accepts_supported_types() {
        let upload = UploadConfig::default();
        for (name, ct) in [
            ("a.jpg", "image/jpeg"),
            ("a.JPEG", "image/jpeg"),
            ("a.png", "image/png"),
            ("a.webp", "image/webp"),
        ] {
            let file = ImageFile::new(name, ct, vec![0; 10]);
            assert_eq!(accepts(&file, &upload), Ok(()), "{name}");
        }
    }

    #[test]
    fn rejects_unsupported_type() {
        let file = ImageFile::new("anim.gif", "image/gif", vec![0; 10]);
        assert_eq!(
            accepts(&file, &UploadConfig::default()),
            Err(Rejection::UnsupportedType("anim.gif".to_string()))
        );
    }

    #[test]
    fn rejects_oversized_file() {
        let file = ImageFile::new("huge.jpg", "image/jpeg", vec![0; 10 * MB + 1]);
        assert!(matches!(
            accepts(&file, &UploadConfig::default()),
            Err(Rejection::TooLarge { .. })
        ));
    }
}
