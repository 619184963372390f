//! Focus measurement by Laplacian variance.
//!
//! The global score is the variance of the 4-neighbour Laplacian over the
//! whole grayscale frame. The frame is then cut into a 5×5 grid and every zone
//! is scored on its own crop, so a soft corner or an out-of-focus foreground
//! shows up even when the subject is crisp. Integer division sizes the zones;
//! the last row and column of zones absorb the remainder.
//!
//! A uniform frame scores 0 and grades F. That is a legitimate result, not an
//! error.

use super::calculations::laplacian_variance;
use crate::grade::{self, Grade};
use crate::raster::RasterBuffer;
use serde::{Deserialize, Serialize};

pub const GRID_SIZE: usize = 5;

/// Zones scoring below this fraction of the global score are flagged soft.
pub const SOFT_ZONE_RATIO: f64 = 0.6;

const VERTICAL_BANDS: [&str; GRID_SIZE] = ["top", "upper", "center", "lower", "bottom"];
const HORIZONTAL_BANDS: [&str; GRID_SIZE] =
    ["left", "center-left", "center", "center-right", "right"];

/// A grid zone noticeably softer than the frame as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftZone {
    pub row: usize,
    pub col: usize,
    pub score: f64,
    /// `score / global score`.
    pub relative: f64,
    pub label: String,
}

impl SoftZone {
    /// One-line issue text, e.g. `"Soft focus in top left zone (41% of frame sharpness)"`.
    pub fn describe(&self) -> String {
        format!(
            "Soft focus in {} zone ({:.0}% of frame sharpness)",
            self.label,
            self.relative * 100.0
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpnessResult {
    pub overall: f64,
    /// `zones[row][col]`, row 0 at the top.
    pub zones: [[f64; GRID_SIZE]; GRID_SIZE],
    pub soft_zones: Vec<SoftZone>,
    pub grade: Grade,
}

/// Human label for a grid position: `"top left"`, `"lower center-right"`,
/// and plain `"center"` for the middle zone.
pub fn zone_label(row: usize, col: usize) -> String {
    let vertical = VERTICAL_BANDS[row.min(GRID_SIZE - 1)];
    let horizontal = HORIZONTAL_BANDS[col.min(GRID_SIZE - 1)];
    if vertical == "center" && horizontal == "center" {
        "center".to_string()
    } else {
        format!("{vertical} {horizontal}")
    }
}

/// Start offset and length of zone `index` along an axis of `extent` pixels.
fn zone_span(index: usize, extent: usize) -> (usize, usize) {
    let step = extent / GRID_SIZE;
    let start = index * step;
    let len = if index == GRID_SIZE - 1 {
        extent - start
    } else {
        step
    };
    (start, len)
}

fn buffer_score(gray: &RasterBuffer) -> f64 {
    laplacian_variance(&gray.to_f64(), gray.width(), gray.height())
}

/// Score a grayscale buffer globally and per zone.
pub fn analyze(gray: &RasterBuffer) -> SharpnessResult {
    let overall = buffer_score(gray);

    let mut zones = [[0.0; GRID_SIZE]; GRID_SIZE];
    let mut soft_zones = Vec::new();
    for (row, zone_row) in zones.iter_mut().enumerate() {
        let (y, h) = zone_span(row, gray.height());
        for (col, zone) in zone_row.iter_mut().enumerate() {
            let (x, w) = zone_span(col, gray.width());
            // frames narrower than the grid leave leading zones empty
            if w == 0 || h == 0 {
                continue;
            }
            let score = buffer_score(&gray.crop(x, y, w, h));
            *zone = score;
            if overall > 0.0 && score < overall * SOFT_ZONE_RATIO {
                soft_zones.push(SoftZone {
                    row,
                    col,
                    score,
                    relative: score / overall,
                    label: zone_label(row, col),
                });
            }
        }
    }

    let grade = grade::SHARPNESS.grade(overall);
    tracing::debug!(
        overall,
        soft_zones = soft_zones.len(),
        %grade,
        "sharpness"
    );

    SharpnessResult {
        overall,
        zones,
        soft_zones,
        grade,
    }
}
