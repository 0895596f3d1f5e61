//! LTspice parameter-sweep automation.
//!
//! This crate provides:
//! - Circuit format detection and encoding-aware text I/O
//! - Schematic (`.asc`) and netlist editing with guaranteed restoration
//! - Batch simulator invocation with invocation-variant fallback
//! - Node response extraction and CSV export
//! - Orchestration of scenario × variant sweeps
//!
//! # Example
//!
//! ```rust,no_run
//! use ltsweep::{SweepConfig, SweepRunner};
//!
//! let config = SweepConfig::load("sweep.json".as_ref())?;
//! let report = SweepRunner::new(config)?.run()?;
//! println!("wrote {} files to {}", report.written.len(), report.output_dir.display());
//! # Ok::<(), ltsweep::Error>(())
//! ```

pub mod config;
pub mod editor;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod input;
pub mod simulator;
pub mod sweep;
pub mod transform;

pub use config::{Scenario, SweepConfig, SweepVariant};
pub use editor::{CircuitEditor, EditSession, Removal};
pub use encoding::{TextCodec, normalize_micro_symbols};
pub use error::{Error, Result};
pub use extract::{ResultRow, ResultTable, extract, write_csv};
pub use input::{CircuitKind, detect_format};
pub use simulator::{Launcher, Simulator, SimulatorConfig, check_artifact};
pub use sweep::{RunFailure, SweepReport, SweepRunner};
pub use transform::TextTransform;
