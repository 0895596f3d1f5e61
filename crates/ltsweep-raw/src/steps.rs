//! Step parameter extraction from LTspice log files.
//!
//! A stepped run writes one line per step to the log, in step order:
//!
//! ```text
//! .step j=0
//! .step j=0.111
//! .step k=0.111 j=0.5
//! ```

use std::path::Path;

use indexmap::IndexMap;

use crate::text::decode_text;
use crate::units::parse_spice_number;

/// Parameter values of one step, in the order the simulator printed them.
pub type StepParameters = IndexMap<String, f64>;

/// Parse `.step` lines out of log text.
///
/// Returns an empty list when the run was not stepped.
pub fn parse_step_log(text: &str) -> Vec<StepParameters> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line
                .get(..6)
                .filter(|head| head.eq_ignore_ascii_case(".step "))
                .map(|_| &line[6..])?;

            let mut params = StepParameters::new();
            for assignment in rest.split_whitespace() {
                let Some((name, value)) = assignment.split_once('=') else {
                    continue;
                };
                match parse_spice_number(value) {
                    Some(v) => {
                        params.insert(name.to_string(), v);
                    }
                    None => log::warn!("ignoring non-numeric step value {name}={value}"),
                }
            }
            // ".step param j 0 1 0.1" echoed from the netlist has no assignments
            (!params.is_empty()).then_some(params)
        })
        .collect()
}

/// Read step parameters from a log file, if it exists.
///
/// A missing or unreadable log yields no step information.
pub fn read_step_log(path: &Path) -> Vec<StepParameters> {
    match std::fs::read(path) {
        Ok(bytes) => parse_step_log(&decode_text(&bytes)),
        Err(e) => {
            log::debug!("no step log at {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_parameter() {
        let log = "Circuit: * AM-Pro\n\n.step j=0\n.step j=0.111\nDate: today\n";
        let steps = parse_step_log(log);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["j"], 0.0);
        assert_eq!(steps[1]["j"], 0.111);
    }

    #[test]
    fn test_parse_multiple_parameters_keep_order() {
        let steps = parse_step_log(".STEP k=0.111 j=1k\n");
        let names: Vec<&str> = steps[0].keys().map(String::as_str).collect();
        assert_eq!(names, vec!["k", "j"]);
        assert_eq!(steps[0]["j"], 1000.0);
    }

    #[test]
    fn test_unstepped_log_has_no_steps() {
        let log = "Circuit: * test\nDirect Newton iteration for .op point succeeded.\n";
        assert!(parse_step_log(log).is_empty());
    }

    #[test]
    fn test_step_directive_text_is_not_a_step() {
        // Netlist echoes like ".stepper" must not match
        assert!(parse_step_log(".stepper x=1\n").is_empty());
    }

    #[test]
    fn test_echoed_step_directive_is_skipped() {
        let log = ".step param j 0 0.999 0.111\n.step j=0\n";
        assert_eq!(parse_step_log(log).len(), 1);
    }

    #[test]
    fn test_missing_log_file() {
        assert!(read_step_log(Path::new("/nonexistent/run.log")).is_empty());
    }
}
