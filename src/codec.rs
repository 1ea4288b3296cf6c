//! Image decode, resize and in-place encode.
//!
//! The batch only talks to the [`ImageCodec`] trait. [`PngCodec`] is the
//! production implementation on top of the `image` crate: bilinear
//! resampling, written back over the source file atomically in the format
//! its extension names. PNG output uses the fastest compression preset.

use std::io;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

use crate::atomic;

/// Errors raised by an [`ImageCodec`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The file could not be opened or decoded as an image.
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        /// Image path
        path: PathBuf,
        /// The underlying image error
        #[source]
        source: image::ImageError,
    },

    /// The image could not be encoded.
    #[error("Failed to encode image {path}: {source}")]
    Encode {
        /// Image path
        path: PathBuf,
        /// The underlying image error
        #[source]
        source: image::ImageError,
    },

    /// Writing the encoded image failed.
    #[error("I/O error writing image {path}: {source}")]
    Io {
        /// Image path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// The image operations the batch needs.
///
/// Implementations must be shareable across worker threads. Images are
/// owned by a single worker and dropped when it finishes with the path.
pub trait ImageCodec: Send + Sync {
    /// Decoded image type.
    type Image;

    /// Decode the image stored at `path`.
    fn decode(&self, path: &Path) -> Result<Self::Image, CodecError>;

    /// Current `(width, height)` in pixels.
    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    /// Resample to exactly `width` x `height`.
    fn resize(&self, image: &Self::Image, width: u32, height: u32) -> Self::Image;

    /// Encode `image` and overwrite `path` with the result.
    fn encode(&self, image: &Self::Image, path: &Path) -> Result<(), CodecError>;
}

/// Codec backed by the `image` crate, tuned for PNG thumbnails.
///
/// Other enabled raster formats (BMP, GIF, TIFF, WebP) are re-encoded as
/// themselves with the encoder defaults.
#[derive(Debug, Clone, Copy)]
pub struct PngCodec {
    filter: FilterType,
    compression: CompressionType,
}

impl Default for PngCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl PngCodec {
    /// Bilinear resampling with the fastest PNG compression.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
            compression: CompressionType::Fast,
        }
    }
}

impl ImageCodec for PngCodec {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        image::open(path).map_err(|source| CodecError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    fn dimensions(&self, image: &DynamicImage) -> (u32, u32) {
        (image.width(), image.height())
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, self.filter)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> Result<(), CodecError> {
        let format = ImageFormat::from_path(path).map_err(|source| CodecError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        let mut encode_error = None;

        let written = atomic::replace_file(path, |writer| {
            let result = match format {
                ImageFormat::Png => image.write_with_encoder(PngEncoder::new_with_quality(
                    writer,
                    self.compression,
                    PngFilterType::Adaptive,
                )),
                other => image.write_to(writer, other),
            };
            result.map_err(|e| {
                let message = e.to_string();
                encode_error = Some(e);
                io::Error::other(message)
            })
        });

        match (written, encode_error) {
            (Ok(()), _) => Ok(()),
            (Err(_), Some(source)) => Err(CodecError::Encode {
                path: path.to_path_buf(),
                source,
            }),
            (Err(source), None) => Err(CodecError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
