//! Pixel measurements. Pure functions of a buffer, no I/O.
//!
//! | Analyzer | Input | Measures |
//! |---|---|---|
//! | [`sharpness`] | gray | Laplacian variance, globally and on a 5×5 grid |
//! | [`noise`] | color | luma/chroma σ in flat regions |
//! | [`dynamic_range`] | gray | clipped and near-clipped percentages |
//! | [`compression`] | gray + format | 8×8 blocking ratio, sky banding |
//!
//! Analyzers are independent: none reads another's result, and each returns
//! a plain owned record. [`calculations`] holds the shared statistics and
//! filters.

pub mod calculations;
pub mod compression;
pub mod dynamic_range;
pub mod noise;
pub mod sharpness;

pub use compression::CompressionResult;
pub use dynamic_range::DynamicRangeResult;
pub use noise::NoiseResult;
pub use sharpness::{SharpnessResult, SoftZone, zone_label};
