//! CLI output formatting for every command.
//!
//! # Measurement-First Display
//!
//! Output leads with the verdict (grade and composite score), then lists one
//! line per measurement with its raw value and letter grade, then the print
//! table. Paths appear once, as the header, so a folder run reads as an
//! inventory of grades rather than a file listing.
//!
//! # Output Format
//!
//! ## Analyze
//!
//! ```text
//! dawn.jpg (6000x4000, 8-bit jpeg)
//! Grade A (91.8/100)
//!
//! Sharpness        612.4  A
//! Noise              8.0  B  luma 8.0, chroma 0.0
//! Dynamic range           A  highlights 0.0% clipped, shadows 0.0% clipped
//! Compression        2.0  A
//!
//! Print sizes (resolution multiplier 1.00)
//!     8x10      400 DPI  A  sellable
//!     24x36     166 DPI  C  sellable
//!     30x40     133 DPI  D
//!
//! Recommendation
//!     Maximum sellable print size: 24x36 inches (166 DPI).
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 A  91.8  dawn.jpg  max 24x36
//! 002 F  31.0  fog.jpg   not sellable
//! 003 --       broken.jpg  failed: ...
//!
//! 2 analyzed, 1 failed
//! Grades: A 1, F 1
//! Cache: 1 cached, 1 analyzed (2 total)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchOutcome, BatchReport};
use crate::grade::Grade;
use crate::print_size::{PrintCheck, PrintVerdict};
use crate::report::{Comparison, QualityReport, Winner};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Path relative to `root` when possible, for folder listings.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// One measurement row: label, optional value, grade, optional detail.
fn metric_line(label: &str, value: Option<f64>, grade: Grade, detail: &str) -> String {
    let value = value.map(|v| format!("{v:.1}")).unwrap_or_default();
    let line = format!("{label:<15} {value:>7}  {grade}");
    if detail.is_empty() {
        line
    } else {
        format!("{line}  {detail}")
    }
}

// ============================================================================
// Analyze
// ============================================================================

pub fn format_report(report: &QualityReport) -> Vec<String> {
    let mut lines = Vec::new();
    let info = &report.info;
    lines.push(format!(
        "{} ({}x{}, {}-bit {})",
        file_name(&report.path),
        info.width,
        info.height,
        info.bit_depth,
        info.format.as_str()
    ));
    lines.push(format!("Grade {} ({:.1}/100)", report.grade, report.score));
    lines.push(String::new());

    lines.push(metric_line(
        "Sharpness",
        Some(report.sharpness.overall),
        report.sharpness.grade,
        "",
    ));
    for zone in &report.sharpness.soft_zones {
        lines.push(format!(
            "{}soft: {} ({:.0}%)",
            indent(1),
            zone.label,
            zone.relative * 100.0
        ));
    }
    lines.push(metric_line(
        "Noise",
        Some(report.noise.overall),
        report.noise.grade,
        &format!(
            "luma {:.1}, chroma {:.1}",
            report.noise.luminance, report.noise.chrominance
        ),
    ));
    let dr = &report.dynamic_range;
    lines.push(metric_line(
        "Dynamic range",
        None,
        dr.grade,
        &format!(
            "highlights {:.1}% clipped, shadows {:.1}% clipped",
            dr.highlights_clipped_pct, dr.shadows_clipped_pct
        ),
    ));
    lines.push(metric_line(
        "Compression",
        Some(report.compression.artifact_score),
        report.compression.grade,
        if report.compression.banding_detected {
            "banding"
        } else {
            ""
        },
    ));
    lines.push(String::new());

    lines.push(format!(
        "Print sizes (resolution multiplier {:.2})",
        report.print_sizes.multiplier
    ));
    for entry in &report.print_sizes.entries {
        let size = entry.size.to_string();
        let mut line = format!("{}{:<8} {:>4} DPI  {}", indent(1), size, entry.dpi, entry.grade);
        if entry.sellable {
            line.push_str("  sellable");
        }
        lines.push(line);
    }

    if !report.issues.is_empty() {
        lines.push(String::new());
        lines.push("Issues".to_string());
        for issue in &report.issues {
            lines.push(format!("{}{}", indent(1), issue));
        }
    }

    lines.push(String::new());
    lines.push("Recommendation".to_string());
    lines.push(format!("{}{}", indent(1), report.recommendation));
    lines
}

pub fn print_report(report: &QualityReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

pub fn format_batch(batch: &BatchReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in batch.entries.iter().enumerate() {
        let name = relative(&entry.path, &batch.root);
        let line = match &entry.outcome {
            BatchOutcome::Analyzed { report } => {
                let sellable = match report.max_sellable_size {
                    Some(size) => format!("max {size}"),
                    None => "not sellable".to_string(),
                };
                format!(
                    "{} {}  {:>5.1}  {}  {}",
                    format_index(i + 1),
                    report.grade,
                    report.score,
                    name,
                    sellable
                )
            }
            BatchOutcome::Failed { error } => {
                format!("{} --         {}  failed: {}", format_index(i + 1), name, error)
            }
        };
        lines.push(line);
    }

    let summary = &batch.summary;
    if !batch.entries.is_empty() {
        lines.push(String::new());
    }
    if summary.failed > 0 {
        lines.push(format!(
            "{} analyzed, {} failed",
            summary.analyzed, summary.failed
        ));
    } else {
        lines.push(format!("{} analyzed", summary.analyzed));
    }
    if !summary.grades.is_empty() {
        let histogram: Vec<String> = summary
            .grades
            .iter()
            .map(|(grade, count)| format!("{grade} {count}"))
            .collect();
        lines.push(format!("Grades: {}", histogram.join(", ")));
    }
    lines.push(format!("Cache: {}", batch.cache));
    lines
}

pub fn print_batch(batch: &BatchReport) {
    for line in format_batch(batch) {
        println!("{}", line);
    }
}

// ============================================================================
// Compare
// ============================================================================

fn winner_label(winner: Winner, first: &str, second: &str) -> String {
    match winner {
        Winner::First => first.to_string(),
        Winner::Second => second.to_string(),
        Winner::Tie => "tie".to_string(),
    }
}

pub fn format_comparison(cmp: &Comparison) -> Vec<String> {
    let a = file_name(&cmp.first.path);
    let b = file_name(&cmp.second.path);
    let mut lines = vec![
        format!("A: {} (grade {}, {:.1})", a, cmp.first.grade, cmp.first.score),
        format!("B: {} (grade {}, {:.1})", b, cmp.second.grade, cmp.second.score),
        String::new(),
    ];
    for metric in &cmp.metrics {
        lines.push(format!(
            "{:<22} {:>8.1} {:>8.1}  {}",
            metric.metric,
            metric.first,
            metric.second,
            winner_label(metric.winner, "A", "B")
        ));
    }
    lines.push(String::new());
    lines.push(match cmp.overall {
        Winner::Tie => "Overall: tie".to_string(),
        w => format!("Overall: {}", winner_label(w, &a, &b)),
    });
    lines
}

pub fn print_comparison(cmp: &Comparison) {
    for line in format_comparison(cmp) {
        println!("{}", line);
    }
}

// ============================================================================
// Check size
// ============================================================================

pub fn format_print_check(path: &Path, check: &PrintCheck) -> Vec<String> {
    let verdict = match check.verdict {
        PrintVerdict::Pass => "PASS",
        PrintVerdict::Fail => "FAIL",
    };
    vec![
        format!("{} at {} inches", file_name(path), check.size),
        format!(
            "{}{} DPI (minimum {}, resolution multiplier {:.2})",
            indent(1),
            check.dpi,
            check.min_dpi,
            check.multiplier
        ),
        format!("{}{}", indent(1), verdict),
    ]
}

pub fn print_print_check(path: &Path, check: &PrintCheck) {
    for line in format_print_check(path, check) {
        println!("{}", line);
    }
}
