//! Types for parsed LTspice waveform files.

use std::ops::Range;

use num_complex::Complex64;

/// Kind of the independent variable (column 0 of the rawfile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisKind {
    /// AC analysis frequency.
    Frequency,
    /// Transient analysis time.
    Time,
    /// Any other sweep variable (DC source, temperature, ...).
    Other(String),
}

impl AxisKind {
    /// Classify an axis from its variable type string.
    pub fn from_var_type(var_type: &str) -> Self {
        match var_type.to_lowercase().as_str() {
            "frequency" => AxisKind::Frequency,
            "time" => AxisKind::Time,
            other => AxisKind::Other(other.to_string()),
        }
    }
}

/// A variable in the rawfile (column in the data).
#[derive(Debug, Clone)]
pub struct RawVariable {
    /// Variable index (0-based).
    pub index: usize,
    /// Variable name (e.g., "frequency", "V(out)", "I(R1)").
    pub name: String,
    /// Variable type (e.g., "frequency", "voltage", "device_current").
    pub var_type: String,
}

/// Parsed rawfile header information.
#[derive(Debug, Clone, Default)]
pub struct RawHeader {
    /// Title of the simulation (usually the circuit path).
    pub title: String,
    /// Date line, when present.
    pub date: Option<String>,
    /// Plot name (e.g., "AC Analysis", "Transient Analysis").
    pub plotname: String,
    /// Lower-cased flag words (e.g., "complex", "forward", "stepped").
    pub flags: Vec<String>,
    /// Number of variables including the axis.
    pub num_variables: usize,
    /// Number of data points across all steps.
    pub num_points: usize,
    /// Axis offset declared by the simulator.
    pub offset: f64,
    /// Simulator banner from the `Command:` line.
    pub command: Option<String>,
    /// Variable definitions.
    pub variables: Vec<RawVariable>,
    /// Whether data follows a `Binary:` marker.
    pub is_binary: bool,
}

impl RawHeader {
    fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Whether samples are complex (AC analysis).
    pub fn is_complex(&self) -> bool {
        self.has_flag("complex")
    }

    /// Whether the file holds several `.step` runs back to back.
    pub fn is_stepped(&self) -> bool {
        self.has_flag("stepped")
    }

    /// Whether real traces are stored as f64 instead of f32.
    pub fn is_double(&self) -> bool {
        self.has_flag("double")
    }

    /// Whether the data is in the column-major "fast access" layout.
    pub fn is_fastaccess(&self) -> bool {
        self.has_flag("fastaccess")
    }
}

/// A fully parsed waveform file.
#[derive(Debug, Clone)]
pub struct RawFile {
    /// Header information.
    pub header: RawHeader,
    /// Samples per variable: `columns[var][point]`. Real files carry a zero
    /// imaginary part.
    pub(crate) columns: Vec<Vec<Complex64>>,
    /// Contiguous point ranges, one per step.
    pub(crate) steps: Vec<Range<usize>>,
}

impl RawFile {
    /// Build a waveform from already decoded columns.
    ///
    /// `columns[0]` is the axis. Step ranges are derived from the header flags.
    pub fn from_columns(header: RawHeader, columns: Vec<Vec<Complex64>>) -> Self {
        let steps = if header.is_stepped() {
            split_steps(columns.first().map(Vec::as_slice).unwrap_or(&[]))
        } else {
            let len = columns.first().map(Vec::len).unwrap_or(0);
            vec![0..len]
        };
        RawFile {
            header,
            columns,
            steps,
        }
    }

    /// Names of every trace, axis included, in file order.
    pub fn trace_names(&self) -> Vec<&str> {
        self.header
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .collect()
    }

    /// Find a variable by name (case-insensitive).
    pub fn find_trace(&self, name: &str) -> Option<&RawVariable> {
        let name_lower = name.to_lowercase();
        self.header
            .variables
            .iter()
            .find(|v| v.name.to_lowercase() == name_lower)
    }

    /// Kind of the independent variable.
    pub fn axis_kind(&self) -> AxisKind {
        self.header
            .variables
            .first()
            .map(|v| AxisKind::from_var_type(&v.var_type))
            .unwrap_or(AxisKind::Other(String::new()))
    }

    /// Name of the independent variable.
    pub fn axis_name(&self) -> &str {
        self.header
            .variables
            .first()
            .map(|v| v.name.as_str())
            .unwrap_or("")
    }

    /// Number of steps (at least one).
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Point ranges of every step.
    pub fn steps(&self) -> &[Range<usize>] {
        &self.steps
    }

    /// Real-valued axis of one step.
    pub fn axis(&self, step: usize) -> Option<Vec<f64>> {
        self.wave(0, step)
            .map(|samples| samples.iter().map(|c| c.re).collect())
    }

    /// Samples of one variable within one step.
    pub fn wave(&self, var_index: usize, step: usize) -> Option<&[Complex64]> {
        let range = self.steps.get(step)?.clone();
        self.columns.get(var_index)?.get(range)
    }
}

/// Split an axis into steps: a new step starts wherever the axis returns to
/// its first value.
fn split_steps(axis: &[Complex64]) -> Vec<Range<usize>> {
    let Some(first) = axis.first().map(|c| c.re) else {
        return vec![0..0];
    };

    let mut steps = Vec::new();
    let mut start = 0;
    for (i, sample) in axis.iter().enumerate().skip(1) {
        if sample.re == first {
            steps.push(start..i);
            start = i;
        }
    }
    steps.push(start..axis.len());
    steps
}
