//! # Print Grade
//!
//! Technical quality grading for fine art photographs. Given a JPEG or TIFF,
//! print-grade measures what a print buyer would notice (softness, noise,
//! clipped tones, compression damage) and answers the seller's question:
//! how large can this frame be printed?
//!
//! # Architecture: Measure, Grade, Score
//!
//! ```text
//! 1. Decode    file      →  SourceImage       (color buffer + format + bit depth)
//! 2. Measure   buffers   →  four results      (sharpness, noise, range, compression)
//! 3. Grade     sharpness →  print-size table  (DPI per catalog size)
//! 4. Score     results   →  QualityReport     (composite, grade, issues, advice)
//! ```
//!
//! Every analyzer is a pure function of a pixel buffer. Nothing is shared
//! between analyzers or between images, so a folder of files is analyzed in
//! parallel by running whole images on separate rayon workers.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`raster`] | Decoding and the owned pixel buffer the analyzers read |
//! | [`analysis`] | The four measurements plus shared statistics and filters |
//! | [`grade`] | Letter grades and the threshold ladders that assign them |
//! | [`print_size`] | Print catalog, DPI math, sellability |
//! | [`scoring`] | Weighted composite, overall grade, issues, recommendation |
//! | [`report`] | `analyze` and `compare` entry points, `QualityReport` |
//! | [`batch`] | Parallel folder analysis with per-file failure isolation |
//! | [`cache`] | Content-addressed report cache for folder re-runs |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Fixed Thresholds
//!
//! Grade ladders, weights, and the sellable DPI are constants. A grade of `B`
//! means the same thing on every machine and in every saved report, so reports
//! from different runs can be compared directly. The only tunable is which
//! print sizes to evaluate.
//!
//! ## Softness Costs Print Size
//!
//! A soft image cannot be enlarged as far as its pixel count suggests. The
//! print grader scales the effective resolution by `min(1, sharpness / 300)`
//! before computing DPI, so a frame with half the reference sharpness prints
//! at half the size.
//!
//! ## Uncompressed Input Skips Block Analysis
//!
//! TIFF files cannot carry JPEG block artifacts, so the compression analyzer
//! reports a clean result for them without measuring. Every other format is
//! measured.
//!
//! ## Decode Errors Stop One Image, Not the Run
//!
//! [`report::analyze`] fails on an unreadable file. [`batch::analyze_folder`]
//! records that failure against the file and keeps going.

pub mod analysis;
pub mod batch;
pub mod cache;
pub mod config;
pub mod grade;
pub mod output;
pub mod print_size;
pub mod raster;
pub mod report;
pub mod scoring;

pub use print_size::{PrintCheck, PrintSize, PrintVerdict, grade_print_size};
pub use report::{AnalysisError, QualityReport, analyze, compare};

#[cfg(test)]
pub(crate) mod test_helpers;
