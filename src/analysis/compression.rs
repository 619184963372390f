//! JPEG blocking and tonal banding.
//!
//! ## Blocking
//!
//! JPEG codes the image in independent 8×8 blocks, so heavy compression leaves
//! a step at every block edge. For each adjacent pair of rows `(i-1, i)` the
//! mean absolute difference is computed; the pair is a *boundary* pair when
//! `i % 8 == 0` and an *interior* pair otherwise. Columns are treated the same
//! way and both orientations feed the same two pools. The ratio of the pool
//! averages is turned into a score:
//!
//! ```text
//! score = max(0, (boundary_avg / interior_avg - 1) * 100)
//! ```
//!
//! A ratio of 1.0 means block edges look like any other edge (score 0); by
//! 1.3 the blocking is visible in print.
//!
//! Uncompressed sources (TIFF) skip the measurement entirely and report a
//! clean result.
//!
//! ## Banding
//!
//! Banding is checked in the top 30% of the frame where skies usually sit.
//! Each row's horizontal first differences are reduced to a variance; the rows
//! at or below the 20th percentile of that variance are "smooth". If any of the
//! first ten smooth rows uses fewer than 5% distinct levels across its width,
//! the gradient has posterized.

use super::calculations::{mean, percentile, variance};
use crate::grade::{self, Grade};
use crate::raster::{RasterBuffer, SourceFormat};
use serde::{Deserialize, Serialize};

const BLOCK_SIZE: usize = 8;
/// Ratio reported when every discontinuity sits on the block grid.
pub const SATURATED_RATIO: f64 = 2.0;

const BANDING_REGION: f64 = 0.3;
const MIN_BANDING_ROWS: usize = 20;
const SMOOTH_ROW_PERCENTILE: f64 = 20.0;
const MIN_SMOOTH_ROWS: usize = 5;
const MAX_ROWS_CHECKED: usize = 10;
const MAX_UNIQUE_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub artifact_score: f64,
    pub banding_detected: bool,
    pub grade: Grade,
}

impl CompressionResult {
    fn uncompressed() -> Self {
        Self {
            artifact_score: 0.0,
            banding_detected: false,
            grade: Grade::A,
        }
    }
}

fn mean_abs_diff(a: impl Iterator<Item = u8>, b: impl Iterator<Item = u8>) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for (x, y) in a.zip(b) {
        sum += u64::from(x.abs_diff(y));
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Ratio of mean discontinuity across 8×8 block edges to mean discontinuity
/// elsewhere.
///
/// Returns 1.0 when either pool is empty or the whole image is flat. A flat
/// interior with steps on the block grid saturates at [`SATURATED_RATIO`].
pub fn blockiness_ratio(gray: &RasterBuffer) -> f64 {
    let (width, height) = (gray.width(), gray.height());
    let mut boundary = Vec::new();
    let mut interior = Vec::new();

    for i in 1..height {
        let diff = mean_abs_diff(gray.row(i - 1).iter().copied(), gray.row(i).iter().copied());
        if i % BLOCK_SIZE == 0 {
            boundary.push(diff);
        } else {
            interior.push(diff);
        }
    }
    for j in 1..width {
        let left = (0..height).map(|y| gray.get(j - 1, y, 0));
        let right = (0..height).map(|y| gray.get(j, y, 0));
        let diff = mean_abs_diff(left, right);
        if j % BLOCK_SIZE == 0 {
            boundary.push(diff);
        } else {
            interior.push(diff);
        }
    }

    if boundary.is_empty() || interior.is_empty() {
        return 1.0;
    }
    let boundary_avg = mean(&boundary);
    let interior_avg = mean(&interior);
    if interior_avg <= 0.0 {
        return if boundary_avg > 0.0 { SATURATED_RATIO } else { 1.0 };
    }
    boundary_avg / interior_avg
}

/// Artifact score from a blockiness ratio. Never negative.
pub fn artifact_score(ratio: f64) -> f64 {
    ((ratio - 1.0) * 100.0).max(0.0)
}

/// Posterization check over the top of the frame.
pub fn detect_banding(gray: &RasterBuffer) -> bool {
    let rows = (gray.height() as f64 * BANDING_REGION) as usize;
    if rows < MIN_BANDING_ROWS || gray.width() == 0 {
        return false;
    }

    let row_variances: Vec<f64> = (0..rows)
        .map(|y| {
            let row = gray.row(y);
            let diffs: Vec<f64> = row
                .windows(2)
                .map(|w| f64::from(w[1]) - f64::from(w[0]))
                .collect();
            variance(&diffs)
        })
        .collect();

    let threshold = percentile(&row_variances, SMOOTH_ROW_PERCENTILE);
    let smooth: Vec<usize> = row_variances
        .iter()
        .enumerate()
        .filter(|(_, v)| **v <= threshold)
        .map(|(y, _)| y)
        .collect();
    if smooth.len() < MIN_SMOOTH_ROWS {
        return false;
    }

    smooth.iter().take(MAX_ROWS_CHECKED).any(|&y| {
        let row = gray.row(y);
        let mut seen = [false; 256];
        for &v in row {
            seen[usize::from(v)] = true;
        }
        let unique = seen.iter().filter(|&&s| s).count();
        (unique as f64 / row.len() as f64) < MAX_UNIQUE_FRACTION
    })
}

/// Grade compression artifacts. `format` decides whether measurement runs at all.
pub fn analyze(format: SourceFormat, gray: &RasterBuffer) -> CompressionResult {
    if format.is_uncompressed() {
        tracing::debug!(?format, "compression skipped for uncompressed source");
        return CompressionResult::uncompressed();
    }

    let ratio = blockiness_ratio(gray);
    let artifact_score = artifact_score(ratio);
    let banding_detected = detect_banding(gray);
    let grade = grade::LOWER_IS_BETTER.grade(artifact_score);
    tracing::debug!(ratio, artifact_score, banding_detected, %grade, "compression");

    CompressionResult {
        artifact_score,
        banding_detected,
        grade,
    }
}
