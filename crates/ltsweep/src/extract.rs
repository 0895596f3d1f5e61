//! Node response extraction and CSV export.

use std::path::Path;

use ltsweep_raw::{AxisKind, RawFile, StepParameters};
use num_complex::Complex64;

use crate::error::{Error, Result};

/// Magnitude in dB; a zero magnitude is floored to the smallest positive
/// normal f64 so the result stays finite.
pub fn magnitude_db(z: Complex64) -> f64 {
    let mag = z.norm();
    let mag = if mag > 0.0 { mag } else { f64::MIN_POSITIVE };
    20.0 * mag.log10()
}

/// Phase in degrees, in `(-180, 180]`.
pub fn phase_deg(z: Complex64) -> f64 {
    z.arg().to_degrees()
}

/// One sample of the exported response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub axis: f64,
    pub mag_db: f64,
    pub phase_deg: f64,
    pub step_index: usize,
    /// Step parameters of the row's step; empty when the run was not stepped.
    pub params: StepParameters,
}

/// Response of one node across every step of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    /// Header of the axis column.
    pub axis_column: String,
    /// Step parameter names in first-seen order.
    pub param_names: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Column headers in output order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![
            self.axis_column.clone(),
            "mag_dB".to_string(),
            "phase_deg".to_string(),
            "step_index".to_string(),
        ];
        columns.extend(self.param_names.iter().map(|name| format!("step_{name}")));
        columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Header of the axis column for a waveform.
fn axis_column(raw: &RawFile) -> String {
    match raw.axis_kind() {
        AxisKind::Frequency => "frequency_Hz".to_string(),
        AxisKind::Time => "time_s".to_string(),
        AxisKind::Other(_) => raw.axis_name().to_string(),
    }
}

/// Trace name for a node: `amp-in` is looked up as `V(amp-in)`; names
/// already written as `V(...)` or `I(...)` are used as given.
fn trace_name(node: &str) -> String {
    let lower = node.to_lowercase();
    if (lower.starts_with("v(") || lower.starts_with("i(")) && lower.ends_with(')') {
        node.to_string()
    } else {
        format!("V({node})")
    }
}

/// Extract the response of `node` for every step of `raw`.
///
/// `steps[i]` holds the parameters of step `i`, as read from the simulator
/// log; steps without an entry get no parameter values.
pub fn extract(raw: &RawFile, node: &str, steps: &[StepParameters]) -> Result<ResultTable> {
    let trace = raw
        .find_trace(&trace_name(node))
        .filter(|v| v.index != 0)
        .ok_or_else(|| Error::TraceNotFound {
            node: node.to_string(),
            available: raw.trace_names().iter().map(|s| s.to_string()).collect(),
        })?;

    if !steps.is_empty() && steps.len() != raw.step_count() {
        log::warn!(
            "log lists {} steps but the waveform has {}",
            steps.len(),
            raw.step_count()
        );
    }

    let mut param_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(raw.header.num_points);

    for step in 0..raw.step_count() {
        let (Some(axis), Some(wave)) = (raw.axis(step), raw.wave(trace.index, step)) else {
            continue;
        };
        let params = steps.get(step).cloned().unwrap_or_default();
        for name in params.keys() {
            if !param_names.contains(name) {
                param_names.push(name.clone());
            }
        }

        rows.extend(axis.iter().zip(wave).map(|(&x, &z)| ResultRow {
            axis: x,
            mag_db: magnitude_db(z),
            phase_deg: phase_deg(z),
            step_index: step,
            params: params.clone(),
        }));
    }

    Ok(ResultTable {
        axis_column: axis_column(raw),
        param_names,
        rows,
    })
}

/// Write a table as CSV with a header row.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;

    for row in &table.rows {
        let mut record = vec![
            row.axis.to_string(),
            row.mag_db.to_string(),
            row.phase_deg.to_string(),
            row.step_index.to_string(),
        ];
        record.extend(table.param_names.iter().map(|name| {
            row.params
                .get(name)
                .map(f64::to_string)
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltsweep_raw::{RawHeader, RawVariable};

    fn ac_raw(stepped: bool, freqs: &[f64], amp: &[Complex64]) -> RawFile {
        let names = [
            ("frequency", "frequency"),
            ("V(AMP-IN)", "voltage"),
            ("V(out)", "voltage"),
        ];
        let header = RawHeader {
            plotname: "AC Analysis".to_string(),
            flags: if stepped {
                vec!["complex".into(), "forward".into(), "log".into(), "stepped".into()]
            } else {
                vec!["complex".into(), "forward".into(), "log".into()]
            },
            num_variables: 3,
            num_points: freqs.len(),
            variables: names
                .iter()
                .enumerate()
                .map(|(index, (name, var_type))| RawVariable {
                    index,
                    name: name.to_string(),
                    var_type: var_type.to_string(),
                })
                .collect(),
            is_binary: true,
            ..Default::default()
        };
        let axis = freqs.iter().map(|&f| Complex64::new(f, 0.0)).collect();
        let out = vec![Complex64::new(1.0, 0.0); freqs.len()];
        RawFile::from_columns(header, vec![axis, amp.to_vec(), out])
    }

    fn params(pairs: &[(&str, f64)]) -> StepParameters {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_magnitude_and_phase() {
        assert!((magnitude_db(Complex64::new(10.0, 0.0)) - 20.0).abs() < 1e-12);
        assert!((phase_deg(Complex64::new(0.0, 1.0)) - 90.0).abs() < 1e-12);
        assert!((phase_deg(Complex64::new(-1.0, 0.0)) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_magnitude_is_finite() {
        let db = magnitude_db(Complex64::new(0.0, 0.0));
        assert!(db.is_finite());
        assert!((db - 20.0 * f64::MIN_POSITIVE.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_node_matched_case_insensitively() {
        let raw = ac_raw(false, &[10.0, 100.0], &[Complex64::new(1.0, 0.0); 2]);
        let table = extract(&raw, "amp-in", &[]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["frequency_Hz", "mag_dB", "phase_deg", "step_index"]);
        assert_eq!(table.rows[1].axis, 100.0);
        assert_eq!(table.rows[1].mag_db, 0.0);

        assert!(extract(&raw, "V(Amp-In)", &[]).is_ok());
    }

    #[test]
    fn test_missing_node_lists_traces() {
        let raw = ac_raw(false, &[10.0], &[Complex64::new(1.0, 0.0)]);
        match extract(&raw, "tone", &[]).unwrap_err() {
            Error::TraceNotFound { node, available } => {
                assert_eq!(node, "tone");
                assert_eq!(available, ["frequency", "V(AMP-IN)", "V(out)"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stepped_rows_carry_parameters() {
        let freqs = [10.0, 100.0, 10.0, 100.0];
        let amp = [
            Complex64::new(1.0, 0.0),
            Complex64::new(0.5, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 2.0),
        ];
        let raw = ac_raw(true, &freqs, &amp);
        let steps = [params(&[("j", 0.1)]), params(&[("j", 0.5)])];

        let table = extract(&raw, "amp-in", &steps).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.param_names, ["j"]);
        assert_eq!(table.rows[0].step_index, 0);
        assert_eq!(table.rows[3].step_index, 1);
        assert_eq!(table.rows[3].params["j"], 0.5);
        assert!(table.rows.iter().all(|r| r.mag_db.is_finite()));
        assert!((table.rows[3].phase_deg - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AM-Pro__Neck_Tone.csv");
        let raw = ac_raw(true, &[10.0, 10.0], &[Complex64::new(1.0, 0.0); 2]);
        let steps = [params(&[("j", 0.1)])];

        let table = extract(&raw, "amp-in", &steps).unwrap();
        write_csv(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "frequency_Hz,mag_dB,phase_deg,step_index,step_j");
        assert_eq!(lines[1], "10,0,0,0,0.1");
        assert_eq!(lines[2], "10,0,0,1,");
    }
}
