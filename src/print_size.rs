//! Print size grading.
//!
//! Converts pixel dimensions into achievable DPI for each size in a fixed
//! catalog of fine-art print sizes, and decides which sizes are sellable.
//!
//! ## Effective resolution
//!
//! A soft image cannot use its full pixel count: upscaling blur only makes
//! bigger blur. Before DPI is computed the native dimensions are scaled by
//!
//! ```text
//! multiplier = min(1.0, sharpness / 300)
//! ```
//!
//! so an image needs a Laplacian variance of 300 to claim its native size.
//!
//! ## Orientation
//!
//! Catalog sizes are listed portrait (`8x10`, `24x36`). DPI is computed in
//! both orientations and the better one wins, so landscape frames are not
//! penalized by the label.

use crate::grade::{self, Grade};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sharpness at which an image earns its full native resolution.
pub const FULL_RESOLUTION_SHARPNESS: f64 = 300.0;

/// Minimum DPI for a size to be offered for sale.
pub const SELLABLE_DPI: u32 = 150;

/// Standard sizes in inches, smallest first.
pub const CATALOG: &[PrintSize] = &[
    PrintSize::new(8, 10),
    PrintSize::new(11, 14),
    PrintSize::new(12, 18),
    PrintSize::new(16, 20),
    PrintSize::new(18, 24),
    PrintSize::new(20, 30),
    PrintSize::new(24, 36),
    PrintSize::new(30, 40),
    PrintSize::new(40, 60),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrintSizeError {
    #[error("invalid print size '{0}', expected WIDTHxHEIGHT in inches (e.g. 16x20)")]
    Invalid(String),
}

/// Physical print size in whole inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintSize {
    pub width: u32,
    pub height: u32,
}

impl PrintSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same size with width and height swapped.
    pub fn rotated(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// True when `other` names the same paper regardless of orientation.
    pub fn same_paper(self, other: PrintSize) -> bool {
        self == other || self == other.rotated()
    }
}

impl fmt::Display for PrintSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for PrintSize {
    type Err = PrintSizeError;

    /// Parses `"16x20"`, `"16X20"`, `"16 x 20"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PrintSizeError::Invalid(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self::new(width, height))
    }
}

impl Serialize for PrintSize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PrintSize {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a list of size strings, failing on the first malformed one.
pub fn parse_sizes<S: AsRef<str>>(sizes: &[S]) -> Result<Vec<PrintSize>, PrintSizeError> {
    sizes.iter().map(|s| s.as_ref().parse()).collect()
}

/// Catalog entries to evaluate, in catalog order.
///
/// An empty filter selects the whole catalog. Requested sizes that are not in
/// the catalog are ignored with a warning.
pub fn select_sizes(filter: &[PrintSize]) -> Vec<PrintSize> {
    if filter.is_empty() {
        return CATALOG.to_vec();
    }
    for requested in filter {
        if !CATALOG.iter().any(|c| c.same_paper(*requested)) {
            tracing::warn!(size = %requested, "print size not in catalog, ignoring");
        }
    }
    CATALOG
        .iter()
        .copied()
        .filter(|c| filter.iter().any(|f| c.same_paper(*f)))
        .collect()
}

/// Pixel scaling applied for soft images, in `[0, 1]`.
pub fn resolution_multiplier(sharpness: f64) -> f64 {
    (sharpness / FULL_RESOLUTION_SHARPNESS).clamp(0.0, 1.0)
}

/// Best achievable DPI over both orientations, truncated to whole dots.
pub fn achievable_dpi(pixel_width: u32, pixel_height: u32, multiplier: f64, size: PrintSize) -> u32 {
    let eff_w = f64::from(pixel_width) * multiplier;
    let eff_h = f64::from(pixel_height) * multiplier;
    let (sw, sh) = (f64::from(size.width), f64::from(size.height));
    let as_labeled = (eff_w / sw).min(eff_h / sh);
    let rotated = (eff_w / sh).min(eff_h / sw);
    as_labeled.max(rotated) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSizeEntry {
    pub size: PrintSize,
    pub dpi: u32,
    pub grade: Grade,
    pub sellable: bool,
}

/// Result of grading a set of catalog sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSizeReport {
    pub multiplier: f64,
    pub entries: Vec<PrintSizeEntry>,
    pub max_sellable: Option<PrintSize>,
}

impl PrintSizeReport {
    fn entry(&self, size: PrintSize) -> Option<(usize, &PrintSizeEntry)> {
        self.entries.iter().enumerate().find(|(_, e)| e.size == size)
    }

    /// The largest evaluated size below `max_sellable` that still grades A or B.
    pub fn best_quality_below_max(&self) -> Option<&PrintSizeEntry> {
        let max = self.max_sellable?;
        let (index, _) = self.entry(max)?;
        self.entries[..index]
            .iter()
            .rev()
            .find(|e| e.grade <= Grade::B)
    }
}

/// Grade every selected catalog size for an image.
pub fn grade_print_sizes(
    pixel_width: u32,
    pixel_height: u32,
    sharpness: f64,
    filter: &[PrintSize],
) -> PrintSizeReport {
    let multiplier = resolution_multiplier(sharpness);
    let entries: Vec<PrintSizeEntry> = select_sizes(filter)
        .into_iter()
        .map(|size| {
            let dpi = achievable_dpi(pixel_width, pixel_height, multiplier, size);
            PrintSizeEntry {
                size,
                dpi,
                grade: grade::PRINT_DPI.grade(f64::from(dpi)),
                sellable: dpi >= SELLABLE_DPI,
            }
        })
        .collect();
    let max_sellable = entries.iter().rev().find(|e| e.sellable).map(|e| e.size);

    tracing::debug!(
        multiplier,
        max_sellable = ?max_sellable.map(|s| s.to_string()),
        "print sizes"
    );

    PrintSizeReport {
        multiplier,
        entries,
        max_sellable,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintVerdict {
    Pass,
    Fail,
}

/// Answer to "can this image print at this size?".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintCheck {
    pub size: PrintSize,
    pub dpi: u32,
    pub min_dpi: u32,
    pub multiplier: f64,
    pub verdict: PrintVerdict,
}

/// Check a single physical size against a caller-chosen DPI threshold.
///
/// Uses the same multiplier and orientation rules as [`grade_print_sizes`], but
/// the size need not be in the catalog and the verdict ignores the letter
/// grade table.
pub fn grade_print_size(
    pixel_width: u32,
    pixel_height: u32,
    sharpness: f64,
    size: PrintSize,
    min_dpi: u32,
) -> PrintCheck {
    let multiplier = resolution_multiplier(sharpness);
    let dpi = achievable_dpi(pixel_width, pixel_height, multiplier, size);
    let verdict = if dpi >= min_dpi {
        PrintVerdict::Pass
    } else {
        PrintVerdict::Fail
    };
    PrintCheck {
        size,
        dpi,
        min_dpi,
        multiplier,
        verdict,
    }
}
