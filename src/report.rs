//! Single-image analysis entry points.
//!
//! [`analyze`] decodes a file once, runs the four analyzers over buffers
//! derived from it, grades print sizes against the sharpness score, and hands
//! everything to the composite scorer. Nothing is cached or shared between
//! calls; two calls on the same file produce equal reports.
//!
//! A decode failure aborts the whole image. Degenerate pixel content (uniform
//! frames, tiny crops) never fails: it produces a complete, low-grade report.

use crate::analysis::{
    self, CompressionResult, DynamicRangeResult, NoiseResult, SharpnessResult,
};
use crate::grade::Grade;
use crate::print_size::{self, PrintCheck, PrintSize, PrintSizeReport};
use crate::raster::{self, RasterError, SourceFormat, SourceImage};
use crate::scoring::{self, ScoreBreakdown, ScoreInputs};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Dimensions and encoding of the analyzed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub format: SourceFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub path: PathBuf,
    pub info: ImageInfo,
    pub sharpness: SharpnessResult,
    pub noise: NoiseResult,
    pub dynamic_range: DynamicRangeResult,
    pub compression: CompressionResult,
    pub print_sizes: PrintSizeReport,
    /// Composite 0–100, one decimal.
    pub score: f64,
    pub grade: Grade,
    pub breakdown: ScoreBreakdown,
    pub issues: Vec<String>,
    pub max_sellable_size: Option<PrintSize>,
    pub recommendation: String,
}

/// Analyze an image file. An empty `sizes` filter evaluates the whole catalog.
pub fn analyze(path: &Path, sizes: &[PrintSize]) -> Result<QualityReport, AnalysisError> {
    let source = raster::decode(path)?;
    Ok(analyze_source(&source, sizes))
}

/// Analyze an already-decoded image.
pub fn analyze_source(source: &SourceImage, sizes: &[PrintSize]) -> QualityReport {
    let gray = source.grayscale();

    let sharpness = analysis::sharpness::analyze(&gray);
    let noise = analysis::noise::analyze(&source.color);
    let dynamic_range = analysis::dynamic_range::analyze(&gray);
    let compression = analysis::compression::analyze(source.format, &gray);

    let (width, height) = (source.width() as u32, source.height() as u32);
    let print_sizes = print_size::grade_print_sizes(width, height, sharpness.overall, sizes);

    let verdict = scoring::score(&ScoreInputs {
        sharpness: &sharpness,
        noise: &noise,
        dynamic_range: &dynamic_range,
        compression: &compression,
        print_sizes: &print_sizes,
        bit_depth: source.bit_depth(),
    });

    tracing::info!(
        path = %source.path.display(),
        score = verdict.composite,
        grade = %verdict.grade,
        "analyzed"
    );

    QualityReport {
        path: source.path.clone(),
        info: ImageInfo {
            width,
            height,
            bit_depth: source.bit_depth(),
            format: source.format,
        },
        max_sellable_size: print_sizes.max_sellable,
        sharpness,
        noise,
        dynamic_range,
        compression,
        print_sizes,
        score: verdict.composite,
        grade: verdict.grade,
        breakdown: verdict.breakdown,
        issues: verdict.issues,
        recommendation: verdict.recommendation,
    }
}

/// Check one physical print size for a file against a DPI threshold.
///
/// Only the sharpness analyzer runs; the size need not be in the catalog.
pub fn check_print_size(
    path: &Path,
    size: PrintSize,
    min_dpi: u32,
) -> Result<PrintCheck, AnalysisError> {
    let source = raster::decode(path)?;
    let sharpness = analysis::sharpness::analyze(&source.grayscale());
    Ok(print_size::grade_print_size(
        source.width() as u32,
        source.height() as u32,
        sharpness.overall,
        size,
        min_dpi,
    ))
}

/// Which of two images did better on a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    First,
    Second,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub first: f64,
    pub second: f64,
    pub winner: Winner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub first: QualityReport,
    pub second: QualityReport,
    pub metrics: Vec<MetricComparison>,
    pub overall: Winner,
}

fn pick(first: f64, second: f64, higher_is_better: bool) -> Winner {
    let ordering = first.total_cmp(&second);
    let ordering = if higher_is_better {
        ordering
    } else {
        ordering.reverse()
    };
    match ordering {
        Ordering::Greater => Winner::First,
        Ordering::Less => Winner::Second,
        Ordering::Equal => Winner::Tie,
    }
}

/// Side-by-side comparison of two finished reports.
pub fn compare_reports(first: QualityReport, second: QualityReport) -> Comparison {
    let rows: [(&str, f64, f64, bool); 5] = [
        ("sharpness", first.sharpness.overall, second.sharpness.overall, true),
        ("noise", first.noise.overall, second.noise.overall, false),
        (
            "highlight clipping",
            first.dynamic_range.highlights_clipped_pct,
            second.dynamic_range.highlights_clipped_pct,
            false,
        ),
        (
            "compression artifacts",
            first.compression.artifact_score,
            second.compression.artifact_score,
            false,
        ),
        ("composite", first.score, second.score, true),
    ];
    let metrics: Vec<MetricComparison> = rows
        .iter()
        .map(|&(metric, a, b, higher)| MetricComparison {
            metric: metric.to_string(),
            first: a,
            second: b,
            winner: pick(a, b, higher),
        })
        .collect();
    let overall = pick(first.score, second.score, true);
    Comparison {
        first,
        second,
        metrics,
        overall,
    }
}

/// Analyze two files and compare them.
pub fn compare(
    first: &Path,
    second: &Path,
    sizes: &[PrintSize],
) -> Result<Comparison, AnalysisError> {
    let a = analyze(first, sizes)?;
    let b = analyze(second, sizes)?;
    Ok(compare_reports(a, b))
}
