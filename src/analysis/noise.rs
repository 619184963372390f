//! Sensor noise estimation in flat regions.
//!
//! Noise is only measurable where the scene itself carries no detail: skies,
//! walls, still water. Those regions are found by high-passing the grayscale
//! plane (original minus a 7×7 box blur) and taking the local variance of that
//! residual over a 15×15 window. The quietest 20% of pixels by local variance
//! form the uniform mask.
//!
//! - Luminance noise is the standard deviation of gray values inside the mask.
//! - Chrominance noise is the mean of the Cr and Cb standard deviations inside
//!   the same mask.
//! - With fewer than [`MIN_UNIFORM_PIXELS`] in the mask, luminance falls back to
//!   a MAD estimate over the Laplacian and chrominance is reported as 0.
//!
//! The overall score weights chroma double: color speckle is far more visible
//! on paper than grain.

use super::calculations::{box_blur, laplacian, median, percentile, std_dev};
use crate::grade::{self, Grade};
use crate::raster::{PixelFormat, RasterBuffer};
use serde::{Deserialize, Serialize};

const SMOOTHING_WINDOW: usize = 7;
const VARIANCE_WINDOW: usize = 15;
const UNIFORM_PERCENTILE: f64 = 20.0;
pub const MIN_UNIFORM_PIXELS: usize = 1000;
/// MAD → σ for normally distributed noise.
const MAD_TO_SIGMA: f64 = 0.6745;
const CHROMA_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseResult {
    pub luminance: f64,
    pub chrominance: f64,
    pub overall: f64,
    pub grade: Grade,
    /// Pixels in the uniform mask; 0 when the MAD fallback was used.
    pub uniform_pixels: usize,
}

/// Mask of pixels whose local residual variance is at or below the 20th
/// percentile.
pub fn uniform_mask(gray: &[f64], width: usize, height: usize) -> Vec<bool> {
    let smoothed = box_blur(gray, width, height, SMOOTHING_WINDOW);
    let residual: Vec<f64> = gray.iter().zip(&smoothed).map(|(g, s)| g - s).collect();
    let residual_sq: Vec<f64> = residual.iter().map(|r| r * r).collect();

    let local_mean = box_blur(&residual, width, height, VARIANCE_WINDOW);
    let local_sq = box_blur(&residual_sq, width, height, VARIANCE_WINDOW);
    // clamp float cancellation below zero
    let local_var: Vec<f64> = local_sq
        .iter()
        .zip(&local_mean)
        .map(|(sq, m)| (sq - m * m).max(0.0))
        .collect();

    let threshold = percentile(&local_var, UNIFORM_PERCENTILE);
    local_var.iter().map(|&v| v <= threshold).collect()
}

fn masked(values: impl Iterator<Item = f64>, mask: &[bool]) -> Vec<f64> {
    values
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| v)
        .collect()
}

/// Robust σ estimate from the Laplacian when no usable flat region exists.
fn mad_sigma(gray: &[f64], width: usize, height: usize) -> f64 {
    let response = laplacian(gray, width, height);
    let center = median(&response);
    let deviations: Vec<f64> = response.iter().map(|v| (v - center).abs()).collect();
    median(&deviations) / MAD_TO_SIGMA
}

/// Estimate noise from an RGB (or already-gray) color buffer.
pub fn analyze(color: &RasterBuffer) -> NoiseResult {
    let (width, height) = (color.width(), color.height());
    let gray = color.to_gray().to_f64();

    let mask = uniform_mask(&gray, width, height);
    let uniform_pixels = mask.iter().filter(|&&m| m).count();

    let (luminance, chrominance, uniform_pixels) = if uniform_pixels >= MIN_UNIFORM_PIXELS {
        let luminance = std_dev(&masked(gray.iter().copied(), &mask));
        let chrominance = if color.format() == PixelFormat::Gray {
            0.0
        } else {
            let ycc = color.to_ycrcb();
            let cr = masked(ycc.channel(1).to_f64().into_iter(), &mask);
            let cb = masked(ycc.channel(2).to_f64().into_iter(), &mask);
            (std_dev(&cr) + std_dev(&cb)) / 2.0
        };
        (luminance, chrominance, uniform_pixels)
    } else {
        (mad_sigma(&gray, width, height), 0.0, 0)
    };

    let overall = luminance + CHROMA_WEIGHT * chrominance;
    let grade = grade::LOWER_IS_BETTER.grade(overall);
    tracing::debug!(
        luminance,
        chrominance,
        overall,
        uniform_pixels,
        %grade,
        "noise"
    );

    NoiseResult {
        luminance,
        chrominance,
        overall,
        grade,
        uniform_pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Lcg, rgb_buffer};

    #[test]
    fn uniform_image_has_zero_noise_via_mask() {
        let color = rgb_buffer(64, 64, |_, _| [120, 130, 140]);
        let result = analyze(&color);
        assert_eq!(result.uniform_pixels, 64 * 64);
        assert_eq!(result.luminance, 0.0);
        assert_eq!(result.chrominance, 0.0);
        assert_eq!(result.overall, 0.0);
        assert_eq!(result.grade, Grade::A);
    }

    #[test]
    fn small_image_uses_mad_fallback() {
        // 20x20 = 400 pixels, mask can never reach 1000
        let mut rng = Lcg::new(7);
        let color = rgb_buffer(20, 20, |_, _| {
            let v = rng.next_range(100, 156) as u8;
            [v, v, v]
        });
        let result = analyze(&color);
        assert_eq!(result.uniform_pixels, 0);
        assert_eq!(result.chrominance, 0.0);
        assert!(result.luminance > 0.0);
        assert_eq!(result.overall, result.luminance);
    }

    #[test]
    fn noisy_image_scores_worse_than_clean() {
        let mut rng = Lcg::new(42);
        let noisy = rgb_buffer(80, 80, |_, _| {
            [
                rng.next_range(60, 196) as u8,
                rng.next_range(60, 196) as u8,
                rng.next_range(60, 196) as u8,
            ]
        });
        let mut rng = Lcg::new(42);
        let clean = rgb_buffer(80, 80, |_, _| {
            let v = rng.next_range(126, 130) as u8;
            [v, v, v]
        });

        let noisy = analyze(&noisy);
        let clean = analyze(&clean);
        assert!(noisy.overall > clean.overall);
        assert!(noisy.chrominance > 0.0);
        assert!(noisy.grade > clean.grade);
    }

    #[test]
    fn chroma_counts_double() {
        let mut rng = Lcg::new(3);
        let color = rgb_buffer(64, 64, |_, _| {
            [rng.next_range(110, 150) as u8, 128, rng.next_range(110, 150) as u8]
        });
        let result = analyze(&color);
        let expected = result.luminance + 2.0 * result.chrominance;
        assert!((result.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn mask_of_constant_plane_covers_everything() {
        let plane = vec![5.0; 40 * 30];
        let mask = uniform_mask(&plane, 40, 30);
        assert!(mask.iter().all(|&m| m));
    }

    #[test]
    fn mask_prefers_flat_half() {
        // left half flat, right half checkerboard
        let (w, h) = (60, 40);
        let plane: Vec<f64> = (0..h)
            .flat_map(|y| {
                (0..w).map(move |x| {
                    if x < w / 2 {
                        100.0
                    } else if (x + y) % 2 == 0 {
                        0.0
                    } else {
                        255.0
                    }
                })
            })
            .collect();
        let mask = uniform_mask(&plane, w, h);
        assert!(mask[5 * w + 2]);
        assert!(!mask[5 * w + w - 3]);
    }
}
