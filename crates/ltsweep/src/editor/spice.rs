//! Editor for SPICE text netlists.

use std::path::Path;

use super::{CircuitEditor, Removal, split_eol, split_lines};
use crate::encoding::{TextCodec, normalize_micro_symbols};
use crate::error::{Error, Result};
use crate::input::CircuitKind;

/// Line-oriented netlist editor.
#[derive(Debug, Clone)]
pub struct SpiceEditor {
    lines: Vec<String>,
    codec: TextCodec,
}

/// Number of nodes for a device letter, or `None` when the device has no
/// plain value field.
fn node_count(letter: char) -> Option<usize> {
    match letter.to_ascii_uppercase() {
        'R' | 'C' | 'L' | 'V' | 'I' | 'D' => Some(2),
        'Q' | 'J' | 'Z' => Some(3),
        'M' | 'E' | 'G' | 'S' | 'T' => Some(4),
        _ => None,
    }
}

impl SpiceEditor {
    /// Load a netlist from text.
    pub fn new(text: &str, codec: TextCodec) -> Self {
        Self {
            lines: split_lines(text),
            codec,
        }
    }

    /// Index of the top-level element line whose designator is `reference`.
    ///
    /// Lines inside `.subckt` ... `.ends` bodies are skipped.
    fn find_element(&self, reference: &str) -> Option<usize> {
        let mut depth = 0usize;
        for (index, line) in self.lines.iter().enumerate() {
            let Some(first) = split_eol(line).0.split_whitespace().next() else {
                continue;
            };
            if first.eq_ignore_ascii_case(".subckt") {
                depth += 1;
            } else if first.eq_ignore_ascii_case(".ends") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && first.eq_ignore_ascii_case(reference) {
                return Some(index);
            }
        }
        None
    }
}

impl CircuitEditor for SpiceEditor {
    fn kind(&self) -> CircuitKind {
        CircuitKind::Netlist
    }

    fn text(&self) -> String {
        self.lines.concat()
    }

    fn set_component_value(&mut self, reference: &str, value: &str) -> Result<()> {
        let index = self
            .find_element(reference)
            .ok_or_else(|| Error::ComponentNotFound(reference.to_string()))?;

        let not_editable = |reason: &str| Error::ComponentNotEditable {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let (content, eol) = split_eol(&self.lines[index]);
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let nodes = tokens[0]
            .chars()
            .next()
            .and_then(node_count)
            .ok_or_else(|| not_editable("device type has no value field"))?;

        let value_start = 1 + nodes;
        if tokens.len() < value_start {
            return Err(not_editable("element line is missing nodes"));
        }
        // Instance parameters and trailing comments are kept
        let value_end = tokens[value_start..]
            .iter()
            .position(|t| t.contains('=') || t.starts_with(';'))
            .map_or(tokens.len(), |p| value_start + p);
        if value_end == value_start {
            return Err(not_editable("element has no value field"));
        }

        let mut rebuilt: Vec<&str> = tokens[..value_start].to_vec();
        rebuilt.push(value);
        rebuilt.extend_from_slice(&tokens[value_end..]);
        self.lines[index] = format!("{}{eol}", rebuilt.join(" "));
        Ok(())
    }

    fn remove_instruction(&mut self, keyword: &str) -> Removal {
        let keyword = keyword.to_lowercase();
        let mut removed = 0;
        let mut in_removed = false;

        self.lines.retain(|line| {
            let trimmed = line.trim_start();
            if in_removed && trimmed.starts_with('+') {
                return false;
            }
            let lower = trimmed.to_lowercase();
            let matches = lower
                .strip_prefix(&keyword)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace));
            in_removed = matches;
            if matches {
                removed += 1;
            }
            !matches
        });

        if removed == 0 {
            Removal::Absent
        } else {
            Removal::Removed(removed)
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.codec.write(path, &normalize_micro_symbols(&self.text()))
    }
}
