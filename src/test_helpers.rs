//! Shared test utilities for the print-grade test suite.
//!
//! Provides synthetic pixel buffers, a deterministic noise source, and
//! ready-made analyzer results for scorer tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut rng = Lcg::new(1);
//! let gray = gray_buffer(64, 64, |_, _| rng.next_range(100, 140) as u8);
//! let result = crate::analysis::sharpness::analyze(&gray);
//! ```

use crate::analysis::{CompressionResult, DynamicRangeResult, NoiseResult, SharpnessResult, SoftZone};
use crate::grade::{self, Grade};
use crate::raster::{PixelFormat, RasterBuffer};

// =========================================================================
// Pixel buffers
// =========================================================================

/// Build an 8-bit gray buffer from a per-pixel function, row by row.
pub fn gray_buffer(
    width: usize,
    height: usize,
    mut f: impl FnMut(usize, usize) -> u8,
) -> RasterBuffer {
    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            samples.push(f(x, y));
        }
    }
    RasterBuffer::new(width, height, 8, PixelFormat::Gray, samples).unwrap()
}

/// Build an 8-bit RGB buffer from a per-pixel function, row by row.
pub fn rgb_buffer(
    width: usize,
    height: usize,
    mut f: impl FnMut(usize, usize) -> [u8; 3],
) -> RasterBuffer {
    let mut samples = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            samples.extend_from_slice(&f(x, y));
        }
    }
    RasterBuffer::new(width, height, 8, PixelFormat::Rgb, samples).unwrap()
}

/// Seeded 64-bit linear congruential generator for reproducible noise
/// fixtures.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform in `lo..hi`.
    pub fn next_range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next_u32() % (hi - lo)
    }
}

// =========================================================================
// Analyzer results
// =========================================================================

pub fn sharpness_of(overall: f64, soft_zones: Vec<SoftZone>) -> SharpnessResult {
    SharpnessResult {
        overall,
        zones: [[overall; 5]; 5],
        soft_zones,
        grade: grade::SHARPNESS.grade(overall),
    }
}

pub fn clean_noise(overall: f64) -> NoiseResult {
    NoiseResult {
        luminance: overall,
        chrominance: 0.0,
        overall,
        grade: grade::LOWER_IS_BETTER.grade(overall),
        uniform_pixels: 10_000,
    }
}

pub fn clean_dynamic_range() -> DynamicRangeResult {
    DynamicRangeResult {
        highlights_clipped_pct: 0.0,
        highlights_near_pct: 0.0,
        shadows_clipped_pct: 0.0,
        shadows_near_pct: 0.0,
        usable_range: 255,
        highlights_grade: Grade::A,
        shadows_grade: Grade::A,
        grade: Grade::A,
    }
}

pub fn clean_compression(artifact_score: f64) -> CompressionResult {
    CompressionResult {
        artifact_score,
        banding_detected: false,
        grade: grade::LOWER_IS_BETTER.grade(artifact_score),
    }
}
