//! Composite score, overall grade, issues, and recommendation.
//!
//! Each analyzer is normalized onto 0–100 and blended with fixed weights:
//!
//! | Signal | Normalization | Weight |
//! |---|---|---|
//! | Sharpness | `min(100, score / 5)` | 0.40 |
//! | Noise | `clamp(100 - score * 2, 0, 100)` | 0.20 |
//! | Dynamic range | grade points | 0.15 |
//! | Compression | grade points | 0.10 |
//! | Color depth | 95 for ≥16-bit, else 75 | 0.15 |
//!
//! Grade points are A 95, B 80, C 65, D 45, F 20.

use crate::analysis::{CompressionResult, DynamicRangeResult, NoiseResult, SharpnessResult};
use crate::grade::{self, Grade};
use crate::print_size::PrintSizeReport;
use serde::{Deserialize, Serialize};

pub const SHARPNESS_WEIGHT: f64 = 0.40;
pub const NOISE_WEIGHT: f64 = 0.20;
pub const DYNAMIC_RANGE_WEIGHT: f64 = 0.15;
pub const COMPRESSION_WEIGHT: f64 = 0.10;
pub const COLOR_DEPTH_WEIGHT: f64 = 0.15;

const MAX_SOFT_ZONE_ISSUES: usize = 3;
const NOISE_ISSUE_THRESHOLD: f64 = 15.0;
const HIGHLIGHT_ISSUE_PCT: f64 = 2.0;
const SHADOW_ISSUE_PCT: f64 = 3.0;

/// Normalized 0–100 inputs to the composite, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sharpness: f64,
    pub noise: f64,
    pub dynamic_range: f64,
    pub compression: f64,
    pub color_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub composite: f64,
    pub grade: Grade,
    pub breakdown: ScoreBreakdown,
    pub issues: Vec<String>,
    pub recommendation: String,
}

/// Borrowed view of everything the scorer consumes.
pub struct ScoreInputs<'a> {
    pub sharpness: &'a SharpnessResult,
    pub noise: &'a NoiseResult,
    pub dynamic_range: &'a DynamicRangeResult,
    pub compression: &'a CompressionResult,
    pub print_sizes: &'a PrintSizeReport,
    pub bit_depth: u8,
}

pub fn normalize_sharpness(score: f64) -> f64 {
    (score / 5.0).clamp(0.0, 100.0)
}

pub fn normalize_noise(score: f64) -> f64 {
    (100.0 - score * 2.0).clamp(0.0, 100.0)
}

pub fn normalize_color_depth(bit_depth: u8) -> f64 {
    if bit_depth >= 16 { 95.0 } else { 75.0 }
}

pub fn breakdown(inputs: &ScoreInputs<'_>) -> ScoreBreakdown {
    ScoreBreakdown {
        sharpness: normalize_sharpness(inputs.sharpness.overall),
        noise: normalize_noise(inputs.noise.overall),
        dynamic_range: inputs.dynamic_range.grade.points(),
        compression: inputs.compression.grade.points(),
        color_depth: normalize_color_depth(inputs.bit_depth),
    }
}

/// Weighted sum rounded to one decimal.
pub fn composite_score(b: &ScoreBreakdown) -> f64 {
    let raw = b.sharpness * SHARPNESS_WEIGHT
        + b.noise * NOISE_WEIGHT
        + b.dynamic_range * DYNAMIC_RANGE_WEIGHT
        + b.compression * COMPRESSION_WEIGHT
        + b.color_depth * COLOR_DEPTH_WEIGHT;
    (raw * 10.0).round() / 10.0
}

/// Issue strings in fixed order: soft zones, noise, highlights, shadows, banding.
pub fn issues(inputs: &ScoreInputs<'_>) -> Vec<String> {
    let mut issues: Vec<String> = inputs
        .sharpness
        .soft_zones
        .iter()
        .take(MAX_SOFT_ZONE_ISSUES)
        .map(|z| z.describe())
        .collect();

    if inputs.noise.overall > NOISE_ISSUE_THRESHOLD {
        issues.push(format!(
            "Elevated noise (score {:.1}, grade {})",
            inputs.noise.overall, inputs.noise.grade
        ));
    }
    if inputs.dynamic_range.highlights_clipped_pct > HIGHLIGHT_ISSUE_PCT {
        issues.push(format!(
            "Blown highlights: {:.1}% of pixels clipped to white",
            inputs.dynamic_range.highlights_clipped_pct
        ));
    }
    if inputs.dynamic_range.shadows_clipped_pct > SHADOW_ISSUE_PCT {
        issues.push(format!(
            "Crushed shadows: {:.1}% of pixels clipped to black",
            inputs.dynamic_range.shadows_clipped_pct
        ));
    }
    if inputs.compression.banding_detected {
        issues.push("Tonal banding detected in smooth gradients".to_string());
    }
    issues
}

pub fn recommendation(print_sizes: &PrintSizeReport) -> String {
    let Some(max) = print_sizes.max_sellable else {
        return "Not recommended for sale at any evaluated print size.".to_string();
    };
    let dpi = print_sizes
        .entries
        .iter()
        .find(|e| e.size == max)
        .map(|e| e.dpi)
        .unwrap_or_default();
    let mut text = format!("Maximum sellable print size: {max} inches ({dpi} DPI).");
    if let Some(best) = print_sizes.best_quality_below_max() {
        text.push_str(&format!(
            " For best quality (grade {}), print at {} inches ({} DPI).",
            best.grade, best.size, best.dpi
        ));
    }
    text
}

pub fn score(inputs: &ScoreInputs<'_>) -> Verdict {
    let breakdown = breakdown(inputs);
    let composite = composite_score(&breakdown);
    let grade = grade::COMPOSITE.grade(composite);
    Verdict {
        composite,
        grade,
        issues: issues(inputs),
        recommendation: recommendation(inputs.print_sizes),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SoftZone;
    use crate::print_size::{PrintSize, grade_print_sizes};
    use crate::test_helpers::{clean_compression, clean_dynamic_range, clean_noise, sharpness_of};

    #[test]
    fn weights_sum_to_one() {
        let sum = SHARPNESS_WEIGHT
            + NOISE_WEIGHT
            + DYNAMIC_RANGE_WEIGHT
            + COMPRESSION_WEIGHT
            + COLOR_DEPTH_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalizers_clamp() {
        assert_eq!(normalize_sharpness(1000.0), 100.0);
        assert_eq!(normalize_sharpness(250.0), 50.0);
        assert_eq!(normalize_noise(0.0), 100.0);
        assert_eq!(normalize_noise(8.0), 84.0);
        assert_eq!(normalize_noise(80.0), 0.0);
        assert_eq!(normalize_color_depth(16), 95.0);
        assert_eq!(normalize_color_depth(8), 75.0);
    }

    #[test]
    fn composite_bounds() {
        let best = ScoreBreakdown {
            sharpness: 100.0,
            noise: 100.0,
            dynamic_range: 95.0,
            compression: 95.0,
            color_depth: 95.0,
        };
        let worst = ScoreBreakdown {
            sharpness: 0.0,
            noise: 0.0,
            dynamic_range: 20.0,
            compression: 20.0,
            color_depth: 75.0,
        };
        assert!(composite_score(&best) <= 100.0);
        assert!(composite_score(&worst) >= 0.0);
    }

    #[test]
    fn sharp_clean_eight_bit_image_grades_a() {
        let sharpness = sharpness_of(600.0, vec![]);
        let noise = clean_noise(8.0);
        let dr = clean_dynamic_range();
        let compression = clean_compression(2.0);
        let sizes = grade_print_sizes(6000, 4000, 600.0, &[]);
        let verdict = score(&ScoreInputs {
            sharpness: &sharpness,
            noise: &noise,
            dynamic_range: &dr,
            compression: &compression,
            print_sizes: &sizes,
            bit_depth: 8,
        });
        // 40 + 16.8 + 14.25 + 9.5 + 11.25
        assert_eq!(verdict.composite, 91.8);
        assert_eq!(verdict.grade, Grade::A);
        assert!(verdict.issues.is_empty());
        assert_eq!(
            verdict.recommendation,
            "Maximum sellable print size: 24x36 inches (166 DPI). \
             For best quality (grade B), print at 20x30 inches (200 DPI)."
        );
    }

    #[test]
    fn unsellable_recommendation() {
        let sizes = grade_print_sizes(6000, 4000, 10.0, &[]);
        assert_eq!(
            recommendation(&sizes),
            "Not recommended for sale at any evaluated print size."
        );
    }

    #[test]
    fn recommendation_without_better_smaller_size() {
        let sizes = grade_print_sizes(6000, 4000, 600.0, &[PrintSize::new(24, 36)]);
        assert_eq!(
            recommendation(&sizes),
            "Maximum sellable print size: 24x36 inches (166 DPI)."
        );
    }

    #[test]
    fn issues_follow_fixed_order_and_cap_soft_zones() {
        let zones: Vec<SoftZone> = (0..5)
            .map(|col| SoftZone {
                row: 0,
                col,
                score: 10.0,
                relative: 0.1,
                label: crate::analysis::zone_label(0, col),
            })
            .collect();
        let sharpness = sharpness_of(100.0, zones);
        let noise = clean_noise(20.0);
        let mut dr = clean_dynamic_range();
        dr.highlights_clipped_pct = 2.5;
        dr.shadows_clipped_pct = 3.5;
        let mut compression = clean_compression(0.0);
        compression.banding_detected = true;
        let sizes = grade_print_sizes(100, 100, 100.0, &[]);

        let issues = issues(&ScoreInputs {
            sharpness: &sharpness,
            noise: &noise,
            dynamic_range: &dr,
            compression: &compression,
            print_sizes: &sizes,
            bit_depth: 8,
        });
        assert_eq!(issues.len(), 7);
        assert!(issues[0].contains("top left"));
        assert!(issues[2].contains("top center"));
        assert!(issues[3].starts_with("Elevated noise"));
        assert!(issues[4].starts_with("Blown highlights: 2.5%"));
        assert!(issues[5].starts_with("Crushed shadows: 3.5%"));
        assert!(issues[6].contains("banding"));
    }

    #[test]
    fn thresholds_are_exclusive() {
        let sharpness = sharpness_of(600.0, vec![]);
        let noise = clean_noise(15.0);
        let mut dr = clean_dynamic_range();
        dr.highlights_clipped_pct = 2.0;
        dr.shadows_clipped_pct = 3.0;
        let compression = clean_compression(0.0);
        let sizes = grade_print_sizes(6000, 4000, 600.0, &[]);
        let issues = issues(&ScoreInputs {
            sharpness: &sharpness,
            noise: &noise,
            dynamic_range: &dr,
            compression: &compression,
            print_sizes: &sizes,
            bit_depth: 16,
        });
        assert!(issues.is_empty());
    }
}
