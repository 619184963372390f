//! Letter grades and threshold ladders.
//!
//! Every analyzer maps a raw measurement onto `A`–`F` through a [`GradeLadder`]:
//! an ordered list of `(threshold, grade)` rungs checked top to bottom, plus a
//! fallback grade when no rung matches. The comparison mode decides which side
//! of the threshold is good:
//!
//! | Mode | Rung matches when | Used by |
//! |---|---|---|
//! | [`Comparison::AtLeast`] | `value >= threshold` | sharpness, print DPI, composite |
//! | [`Comparison::AtMost`] | `value <= threshold` | noise, compression artifacts |
//! | [`Comparison::Below`] | `value < threshold` | clipping percentages |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade. Ordering follows quality: `A < B < ... < F`, so the *worse*
/// of two grades is their `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Numeric value used by the composite scorer.
    pub fn points(self) -> f64 {
        match self {
            Grade::A => 95.0,
            Grade::B => 80.0,
            Grade::C => 65.0,
            Grade::D => 45.0,
            Grade::F => 20.0,
        }
    }

    /// The worse of two grades. On a tie `self` is returned.
    pub fn worst(self, other: Grade) -> Grade {
        if other > self { other } else { self }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast,
    AtMost,
    Below,
}

impl Comparison {
    fn matches(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::AtLeast => value >= threshold,
            Comparison::AtMost => value <= threshold,
            Comparison::Below => value < threshold,
        }
    }
}

/// Ordered threshold table with a fallback grade.
#[derive(Debug, Clone, Copy)]
pub struct GradeLadder {
    pub comparison: Comparison,
    pub rungs: &'static [(f64, Grade)],
    pub fallback: Grade,
}

impl GradeLadder {
    pub const fn new(
        comparison: Comparison,
        rungs: &'static [(f64, Grade)],
        fallback: Grade,
    ) -> Self {
        Self {
            comparison,
            rungs,
            fallback,
        }
    }

    /// First rung that matches `value`, else the fallback. NaN never matches.
    pub fn grade(&self, value: f64) -> Grade {
        self.rungs
            .iter()
            .find(|(threshold, _)| self.comparison.matches(value, *threshold))
            .map(|(_, grade)| *grade)
            .unwrap_or(self.fallback)
    }
}

/// Laplacian variance → grade.
pub const SHARPNESS: GradeLadder = GradeLadder::new(
    Comparison::AtLeast,
    &[
        (500.0, Grade::A),
        (200.0, Grade::B),
        (100.0, Grade::C),
        (50.0, Grade::D),
    ],
    Grade::F,
);

/// Shared by noise score and compression artifact score.
pub const LOWER_IS_BETTER: GradeLadder = GradeLadder::new(
    Comparison::AtMost,
    &[
        (5.0, Grade::A),
        (15.0, Grade::B),
        (30.0, Grade::C),
        (50.0, Grade::D),
    ],
    Grade::F,
);

/// Highlight clipping percentage → grade. No F tier.
pub const HIGHLIGHT_CLIPPING: GradeLadder = GradeLadder::new(
    Comparison::Below,
    &[(0.5, Grade::A), (2.0, Grade::B), (5.0, Grade::C)],
    Grade::D,
);

/// Shadow clipping percentage → grade. No F tier.
pub const SHADOW_CLIPPING: GradeLadder = GradeLadder::new(
    Comparison::Below,
    &[(1.0, Grade::A), (3.0, Grade::B), (7.0, Grade::C)],
    Grade::D,
);

/// Achievable print DPI → grade.
pub const PRINT_DPI: GradeLadder = GradeLadder::new(
    Comparison::AtLeast,
    &[
        (300.0, Grade::A),
        (200.0, Grade::B),
        (150.0, Grade::C),
        (100.0, Grade::D),
    ],
    Grade::F,
);

/// Composite 0–100 score → overall grade.
pub const COMPOSITE: GradeLadder = GradeLadder::new(
    Comparison::AtLeast,
    &[
        (90.0, Grade::A),
        (75.0, Grade::B),
        (60.0, Grade::C),
        (40.0, Grade::D),
    ],
    Grade::F,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_order_best_first() {
        assert!(Grade::A < Grade::B);
        assert!(Grade::D < Grade::F);
    }

    #[test]
    fn worst_picks_lower_quality() {
        assert_eq!(Grade::A.worst(Grade::D), Grade::D);
        assert_eq!(Grade::F.worst(Grade::B), Grade::F);
        assert_eq!(Grade::C.worst(Grade::C), Grade::C);
    }

    #[test]
    fn points_table() {
        let points: Vec<f64> = Grade::ALL.iter().map(|g| g.points()).collect();
        assert_eq!(points, vec![95.0, 80.0, 65.0, 45.0, 20.0]);
    }

    #[test]
    fn sharpness_ladder_boundaries() {
        assert_eq!(SHARPNESS.grade(500.0), Grade::A);
        assert_eq!(SHARPNESS.grade(499.9), Grade::B);
        assert_eq!(SHARPNESS.grade(200.0), Grade::B);
        assert_eq!(SHARPNESS.grade(100.0), Grade::C);
        assert_eq!(SHARPNESS.grade(50.0), Grade::D);
        assert_eq!(SHARPNESS.grade(49.9), Grade::F);
        assert_eq!(SHARPNESS.grade(0.0), Grade::F);
    }

    #[test]
    fn lower_is_better_boundaries_are_inclusive() {
        assert_eq!(LOWER_IS_BETTER.grade(0.0), Grade::A);
        assert_eq!(LOWER_IS_BETTER.grade(5.0), Grade::A);
        assert_eq!(LOWER_IS_BETTER.grade(5.1), Grade::B);
        assert_eq!(LOWER_IS_BETTER.grade(15.0), Grade::B);
        assert_eq!(LOWER_IS_BETTER.grade(30.0), Grade::C);
        assert_eq!(LOWER_IS_BETTER.grade(50.0), Grade::D);
        assert_eq!(LOWER_IS_BETTER.grade(50.1), Grade::F);
    }

    #[test]
    fn clipping_ladders_are_strict_and_bottom_out_at_d() {
        assert_eq!(HIGHLIGHT_CLIPPING.grade(0.49), Grade::A);
        assert_eq!(HIGHLIGHT_CLIPPING.grade(0.5), Grade::B);
        assert_eq!(HIGHLIGHT_CLIPPING.grade(4.99), Grade::C);
        assert_eq!(HIGHLIGHT_CLIPPING.grade(100.0), Grade::D);

        assert_eq!(SHADOW_CLIPPING.grade(0.0), Grade::A);
        assert_eq!(SHADOW_CLIPPING.grade(1.0), Grade::B);
        assert_eq!(SHADOW_CLIPPING.grade(3.0), Grade::C);
        assert_eq!(SHADOW_CLIPPING.grade(7.0), Grade::D);
    }

    #[test]
    fn print_dpi_ladder() {
        assert_eq!(PRINT_DPI.grade(300.0), Grade::A);
        assert_eq!(PRINT_DPI.grade(250.0), Grade::B);
        assert_eq!(PRINT_DPI.grade(166.0), Grade::C);
        assert_eq!(PRINT_DPI.grade(100.0), Grade::D);
        assert_eq!(PRINT_DPI.grade(6.0), Grade::F);
    }

    #[test]
    fn nan_falls_through_to_fallback() {
        assert_eq!(SHARPNESS.grade(f64::NAN), Grade::F);
        assert_eq!(LOWER_IS_BETTER.grade(f64::NAN), Grade::F);
    }

    #[test]
    fn display_is_letter() {
        assert_eq!(Grade::B.to_string(), "B");
    }
}
