//! Raster access layer.
//!
//! Decodes an image file once and hands out fixed-layout sample buffers to the
//! analyzers. Every buffer is 8 bits per channel regardless of the source bit
//! depth; 16-bit TIFFs are scaled down by the `image` crate during conversion
//! and their original depth is kept as metadata for the composite scorer.
//!
//! | Buffer | Channels | Used by |
//! |---|---|---|
//! | [`PixelFormat::Gray`] | 1 | sharpness, dynamic range, compression, noise |
//! | [`PixelFormat::Rgb`] | 3 | source for the other two |
//! | [`PixelFormat::YCrCb`] | 3 | noise (chroma channels) |
//!
//! Grayscale and YCrCb use the BT.601 luma weights, so the numbers match what
//! most photo tooling reports for "brightness".

use image::{DynamicImage, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted at the boundary. Anything else is rejected before
/// decoding with [`RasterError::UnsupportedFormat`].
const SUPPORTED_EXTENSIONS: &[(&str, SourceFormat)] = &[
    ("jpg", SourceFormat::Jpeg),
    ("jpeg", SourceFormat::Jpeg),
    ("tif", SourceFormat::Tiff),
    ("tiff", SourceFormat::Tiff),
];

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("buffer has {actual} samples, layout requires {expected}")]
    InvalidBuffer { expected: usize, actual: usize },
}

/// Encoding family of the source file, used by the compression analyzer to
/// skip block-artifact measurement on uncompressed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Tiff,
    Other,
}

impl SourceFormat {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
                    .map(|(_, format)| *format)
            })
            .unwrap_or(SourceFormat::Other)
    }

    fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => SourceFormat::Jpeg,
            ImageFormat::Tiff => SourceFormat::Tiff,
            _ => SourceFormat::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Tiff => "tiff",
            SourceFormat::Other => "other",
        }
    }

    /// True for formats stored without lossy block compression.
    pub fn is_uncompressed(self) -> bool {
        matches!(self, SourceFormat::Tiff)
    }
}

/// Returns the file extensions the CLI and batch collaborators accept.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    SUPPORTED_EXTENSIONS.iter().map(|(ext, _)| *ext)
}

/// Reject paths whose extension is not JPEG or TIFF.
pub fn ensure_supported(path: &Path) -> Result<(), RasterError> {
    match SourceFormat::from_path(path) {
        SourceFormat::Other => Err(RasterError::UnsupportedFormat(path.to_path_buf())),
        _ => Ok(()),
    }
}

/// Channel layout of a [`RasterBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray,
    Rgb,
    /// Luma followed by the red-difference and blue-difference chroma channels.
    YCrCb,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb | PixelFormat::YCrCb => 3,
        }
    }
}

/// Interleaved, row-major 8-bit samples with a validated layout.
///
/// `samples.len() == width * height * format.channels()` always holds; the
/// only constructor checks it.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    bit_depth: u8,
    format: PixelFormat,
    samples: Vec<u8>,
}

impl RasterBuffer {
    pub fn new(
        width: usize,
        height: usize,
        bit_depth: u8,
        format: PixelFormat,
        samples: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let expected = width * height * format.channels();
        if samples.len() != expected {
            return Err(RasterError::InvalidBuffer {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bit_depth,
            format,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bit depth of the source file per channel (not of the stored samples).
    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Sample of channel `c` at column `x`, row `y`. Panics when out of bounds.
    pub fn get(&self, x: usize, y: usize, c: usize) -> u8 {
        let channels = self.format.channels();
        debug_assert!(x < self.width && y < self.height && c < channels);
        self.samples[(y * self.width + x) * channels + c]
    }

    /// One row of a single-channel buffer.
    pub fn row(&self, y: usize) -> &[u8] {
        debug_assert_eq!(self.format, PixelFormat::Gray);
        &self.samples[y * self.width..(y + 1) * self.width]
    }

    /// Extract one channel as a new grayscale buffer.
    pub fn channel(&self, c: usize) -> RasterBuffer {
        let channels = self.format.channels();
        let samples = self.samples.iter().skip(c).step_by(channels).copied().collect();
        RasterBuffer {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
            format: PixelFormat::Gray,
            samples,
        }
    }

    /// Copy a rectangular region of a single-channel buffer.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> RasterBuffer {
        debug_assert_eq!(self.format, PixelFormat::Gray);
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let mut samples = Vec::with_capacity(width * height);
        for row in y..y + height {
            let start = row * self.width + x;
            samples.extend_from_slice(&self.samples[start..start + width]);
        }
        RasterBuffer {
            width,
            height,
            bit_depth: self.bit_depth,
            format: PixelFormat::Gray,
            samples,
        }
    }

    /// Samples widened to `f64` for the filter pipeline.
    pub fn to_f64(&self) -> Vec<f64> {
        self.samples.iter().map(|&v| f64::from(v)).collect()
    }

    /// Convert to grayscale with BT.601 weights. Gray input is cloned; YCrCb
    /// input returns its luma channel.
    pub fn to_gray(&self) -> RasterBuffer {
        match self.format {
            PixelFormat::Gray => self.clone(),
            PixelFormat::YCrCb => self.channel(0),
            PixelFormat::Rgb => {
                let samples = self
                    .samples
                    .chunks_exact(3)
                    .map(|px| to_u8(luma(px[0], px[1], px[2])))
                    .collect();
                RasterBuffer {
                    width: self.width,
                    height: self.height,
                    bit_depth: self.bit_depth,
                    format: PixelFormat::Gray,
                    samples,
                }
            }
        }
    }

    /// Convert an RGB buffer to YCrCb (luma + two chroma channels, 128-centered).
    pub fn to_ycrcb(&self) -> RasterBuffer {
        let rgb;
        let source = match self.format {
            PixelFormat::YCrCb => return self.clone(),
            PixelFormat::Rgb => self,
            PixelFormat::Gray => {
                rgb = self.gray_to_rgb();
                &rgb
            }
        };
        let mut samples = Vec::with_capacity(source.samples.len());
        for px in source.samples.chunks_exact(3) {
            let (r, b) = (f64::from(px[0]), f64::from(px[2]));
            let y = luma(px[0], px[1], px[2]);
            samples.push(to_u8(y));
            samples.push(to_u8((r - y) * 0.713 + 128.0));
            samples.push(to_u8((b - y) * 0.564 + 128.0));
        }
        RasterBuffer {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
            format: PixelFormat::YCrCb,
            samples,
        }
    }

    fn gray_to_rgb(&self) -> RasterBuffer {
        let samples = self.samples.iter().flat_map(|&v| [v, v, v]).collect();
        RasterBuffer {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
            format: PixelFormat::Rgb,
            samples,
        }
    }
}

fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// A decoded image: the color buffer plus what the analyzers need to know
/// about where it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub color: RasterBuffer,
}

impl SourceImage {
    /// Wrap an already-decoded image. Used by [`decode`] and by tests that
    /// build pixels in memory.
    pub fn from_dynamic(path: &Path, format: SourceFormat, image: &DynamicImage) -> Self {
        let color_type = image.color();
        let channels = u16::from(color_type.channel_count()).max(1);
        let bit_depth = (color_type.bits_per_pixel() / channels) as u8;
        let rgb = image.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let color = RasterBuffer {
            width,
            height,
            bit_depth,
            format: PixelFormat::Rgb,
            samples: rgb.into_raw(),
        };
        Self {
            path: path.to_path_buf(),
            format,
            color,
        }
    }

    pub fn width(&self) -> usize {
        self.color.width()
    }

    pub fn height(&self) -> usize {
        self.color.height()
    }

    pub fn bit_depth(&self) -> u8 {
        self.color.bit_depth()
    }

    pub fn grayscale(&self) -> RasterBuffer {
        self.color.to_gray()
    }

    pub fn perceptual(&self) -> RasterBuffer {
        self.color.to_ycrcb()
    }
}

/// Decode an image file into a [`SourceImage`].
///
/// Pixels are decoded from the sniffed container, so a mislabeled file still
/// decodes. [`SourceImage::format`] follows the path's extension and only
/// falls back to the sniffed container when the extension is unknown. No
/// allow-listing happens here; callers that need it use [`ensure_supported`]
/// first.
pub fn decode(path: &Path) -> Result<SourceImage, RasterError> {
    let reader = ImageReader::open(path)
        .map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let format = match SourceFormat::from_path(path) {
        SourceFormat::Other => reader
            .format()
            .map(SourceFormat::from_image_format)
            .unwrap_or(SourceFormat::Other),
        known => known,
    };

    let image = reader.decode().map_err(|source| RasterError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image"
    );

    Ok(SourceImage::from_dynamic(path, format, &image))
}
