//! Readers for LTspice simulation output.
//!
//! This crate provides:
//! - Parsing of `.raw` waveform files (binary or ASCII, UTF-16 or 8-bit headers)
//! - Splitting stepped runs into per-step point ranges
//! - Extraction of `.step` parameter values from `.log` files

pub mod error;
pub mod rawfile;
pub mod steps;
pub mod text;
pub mod types;
pub mod units;

pub use error::{Error, Result};
pub use rawfile::parse_rawfile;
pub use steps::{StepParameters, parse_step_log, read_step_log};
pub use text::decode_text;
pub use types::{AxisKind, RawFile, RawHeader, RawVariable};
pub use units::parse_spice_number;

/// Read and parse a rawfile from disk.
pub fn read_rawfile(path: &std::path::Path) -> Result<RawFile> {
    let data = std::fs::read(path)?;
    parse_rawfile(&data)
}
