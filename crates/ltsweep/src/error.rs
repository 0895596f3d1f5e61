//! Error types for the sweep pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for sweep operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing, simulating or exporting a run.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input (circuit, template, config value) is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The simulator executable does not exist.
    #[error("simulator executable not found: {}", path.display())]
    ExecutableNotFound { path: PathBuf },

    /// Input is a netlist from another tool.
    #[error(
        "{kind} netlists are not supported; export a SPICE netlist or use the .asc schematic"
    )]
    UnsupportedFormat { kind: String },

    /// Input format could not be recognised.
    #[error(
        "could not detect the format of {}; provide an .asc schematic or a SPICE netlist",
        path.display()
    )]
    UnknownFormat { path: PathBuf },

    /// Named encoding label is not known or cannot be written.
    #[error("unknown or unwritable text encoding: {0}")]
    UnknownEncoding(String),

    /// Component to edit is not present in the circuit.
    #[error("component not found: {0}")]
    ComponentNotFound(String),

    /// Component exists but its value cannot be edited.
    #[error("cannot set value of {reference}: {reason}")]
    ComponentNotEditable { reference: String, reason: String },

    /// Every invocation variant exited unsuccessfully.
    #[error("simulator batch execution failed\ntried: {tried:?}\nlast error: {last_error}")]
    SimulationFailed {
        tried: Vec<Vec<String>>,
        last_error: String,
    },

    /// The simulator timed out.
    #[error("simulator timed out after {0} seconds")]
    SimulatorTimeout(u64),

    /// The simulator finished without a waveform file but left a log.
    #[error(
        "simulation finished without producing a RAW file\nlog: {}\n\
         ---- log tail ----\n{tail}\n------------------",
        log.display()
    )]
    NoRawOutput { log: PathBuf, tail: String },

    /// The simulator finished without a waveform file or a log.
    #[error("expected RAW file not found: {}", path.display())]
    RawNotFound { path: PathBuf },

    /// Target trace is absent from the waveform file.
    #[error(
        "trace for node '{node}' not found in RAW file. Available traces: {}",
        available.join(", ")
    )]
    TraceNotFound {
        node: String,
        available: Vec<String>,
    },

    /// Waveform or log parsing failed.
    #[error("rawfile error: {0}")]
    Raw(#[from] ltsweep_raw::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
