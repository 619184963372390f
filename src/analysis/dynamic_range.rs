//! Highlight and shadow clipping from the intensity histogram.

use crate::grade::{self, Grade};
use crate::raster::RasterBuffer;
use serde::{Deserialize, Serialize};

/// Levels from either end still counted as "near" clipping.
const NEAR_CLIP_LEVELS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicRangeResult {
    /// Percent of pixels at 255.
    pub highlights_clipped_pct: f64,
    /// Percent of pixels at 250 or above.
    pub highlights_near_pct: f64,
    /// Percent of pixels at 0.
    pub shadows_clipped_pct: f64,
    /// Percent of pixels at 5 or below.
    pub shadows_near_pct: f64,
    /// Span between the darkest and brightest occupied levels.
    pub usable_range: u8,
    pub highlights_grade: Grade,
    pub shadows_grade: Grade,
    pub grade: Grade,
}

/// 256-bin histogram of an 8-bit gray buffer.
pub fn histogram(gray: &RasterBuffer) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &v in gray.samples() {
        bins[usize::from(v)] += 1;
    }
    bins
}

fn pct(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn analyze(gray: &RasterBuffer) -> DynamicRangeResult {
    let bins = histogram(gray);
    let total: u64 = bins.iter().sum();

    let near_high = usize::from(u8::MAX - NEAR_CLIP_LEVELS);
    let near_low = usize::from(NEAR_CLIP_LEVELS);

    let highlights_clipped_pct = pct(bins[255], total);
    let highlights_near_pct = pct(bins[near_high..].iter().sum(), total);
    let shadows_clipped_pct = pct(bins[0], total);
    let shadows_near_pct = pct(bins[..=near_low].iter().sum(), total);

    let lowest = bins.iter().position(|&c| c > 0);
    let highest = bins.iter().rposition(|&c| c > 0);
    let usable_range = match (lowest, highest) {
        (Some(lo), Some(hi)) => (hi - lo) as u8,
        _ => 0,
    };

    let highlights_grade = grade::HIGHLIGHT_CLIPPING.grade(highlights_clipped_pct);
    let shadows_grade = grade::SHADOW_CLIPPING.grade(shadows_clipped_pct);
    let grade = highlights_grade.worst(shadows_grade);

    tracing::debug!(
        highlights_clipped_pct,
        shadows_clipped_pct,
        usable_range,
        %grade,
        "dynamic range"
    );

    DynamicRangeResult {
        highlights_clipped_pct,
        highlights_near_pct,
        shadows_clipped_pct,
        shadows_near_pct,
        usable_range,
        highlights_grade,
        shadows_grade,
        grade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gray_buffer;

    #[test]
    fn uniform_midtone_is_clean() {
        let result = analyze(&gray_buffer(10, 10, |_, _| 128));
        assert_eq!(result.highlights_clipped_pct, 0.0);
        assert_eq!(result.shadows_clipped_pct, 0.0);
        assert_eq!(result.usable_range, 0);
        assert_eq!(result.grade, Grade::A);
    }

    #[test]
    fn uniform_white_is_fully_clipped() {
        let result = analyze(&gray_buffer(10, 10, |_, _| 255));
        assert_eq!(result.highlights_clipped_pct, 100.0);
        assert_eq!(result.highlights_grade, Grade::D);
        assert_eq!(result.grade, Grade::D);
    }

    #[test]
    fn uniform_black_is_fully_crushed() {
        let result = analyze(&gray_buffer(10, 10, |_, _| 0));
        assert_eq!(result.shadows_clipped_pct, 100.0);
        assert_eq!(result.shadows_near_pct, 100.0);
        assert_eq!(result.highlights_clipped_pct, 0.0);
        assert_eq!(result.shadows_grade, Grade::D);
        assert_eq!(result.highlights_grade, Grade::A);
        assert_eq!(result.grade, Grade::D);
        assert_eq!(result.usable_range, 0);
    }

    #[test]
    fn six_percent_white_grades_d_regardless_of_shadows() {
        // 6 of 100 pixels at 255, the rest midtone
        let result = analyze(&gray_buffer(10, 10, |x, y| if y == 0 && x < 6 { 255 } else { 100 }));
        assert!((result.highlights_clipped_pct - 6.0).abs() < 1e-9);
        assert_eq!(result.highlights_grade, Grade::D);
        assert_eq!(result.shadows_grade, Grade::A);
        assert_eq!(result.grade, Grade::D);
    }

    #[test]
    fn near_clip_counts_include_clipped() {
        let result = analyze(&gray_buffer(4, 1, |x, _| [0, 3, 252, 255][x]));
        assert_eq!(result.highlights_clipped_pct, 25.0);
        assert_eq!(result.highlights_near_pct, 50.0);
        assert_eq!(result.shadows_clipped_pct, 25.0);
        assert_eq!(result.shadows_near_pct, 50.0);
        assert!(result.highlights_near_pct >= result.highlights_clipped_pct);
        assert!(result.shadows_near_pct >= result.shadows_clipped_pct);
    }

    #[test]
    fn near_boundaries_are_inclusive() {
        let result = analyze(&gray_buffer(4, 1, |x, _| [5, 6, 249, 250][x]));
        assert_eq!(result.shadows_near_pct, 25.0);
        assert_eq!(result.highlights_near_pct, 25.0);
    }

    #[test]
    fn usable_range_spans_occupied_levels() {
        let result = analyze(&gray_buffer(3, 1, |x, _| [20, 90, 220][x]));
        assert_eq!(result.usable_range, 200);
    }

    #[test]
    fn shadow_grade_drives_overall_when_worse() {
        // 4% black → shadow C, no highlights → A
        let result = analyze(&gray_buffer(25, 4, |x, y| if y == 0 && x < 4 { 0 } else { 128 }));
        assert_eq!(result.shadows_grade, Grade::C);
        assert_eq!(result.highlights_grade, Grade::A);
        assert_eq!(result.grade, Grade::C);
    }
}
