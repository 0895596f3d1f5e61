//! Editor for LTspice schematic (`.asc`) files.
//!
//! Components are `SYMBOL` blocks whose attributes follow on `WINDOW` and
//! `SYMATTR` lines:
//!
//! ```text
//! SYMBOL voltage 128 96 R0
//! WINDOW 123 0 0 Left 0
//! SYMATTR InstName V2
//! SYMATTR Value 5
//! ```
//!
//! SPICE directives are `TEXT` items whose text starts with `!`; several
//! directive lines in one item are joined with a literal `\n`.

use std::path::Path;

use super::{CircuitEditor, Removal, split_eol, split_lines};
use crate::encoding::{TextCodec, normalize_micro_symbols};
use crate::error::{Error, Result};
use crate::input::CircuitKind;

const INST_NAME: &str = "SYMATTR InstName ";
const VALUE: &str = "SYMATTR Value ";

/// Line-oriented schematic editor.
#[derive(Debug, Clone)]
pub struct AscEditor {
    lines: Vec<String>,
    codec: TextCodec,
}

impl AscEditor {
    /// Load a schematic from text.
    pub fn new(text: &str, codec: TextCodec) -> Self {
        Self {
            lines: split_lines(text),
            codec,
        }
    }

    /// Line range `[start, end)` of the SYMBOL block named `reference`.
    fn find_symbol(&self, reference: &str) -> Option<(usize, usize)> {
        let mut i = 0;
        while i < self.lines.len() {
            if !self.lines[i].starts_with("SYMBOL ") {
                i += 1;
                continue;
            }
            let start = i;
            i += 1;
            while i < self.lines.len()
                && (self.lines[i].starts_with("WINDOW ") || self.lines[i].starts_with("SYMATTR "))
            {
                i += 1;
            }
            let named = self.lines[start..i].iter().any(|line| {
                split_eol(line)
                    .0
                    .strip_prefix(INST_NAME)
                    .is_some_and(|name| name.trim().eq_ignore_ascii_case(reference))
            });
            if named {
                return Some((start, i));
            }
        }
        None
    }

    /// Line terminator used by the file.
    fn eol(&self) -> &'static str {
        match self.lines.first() {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }
}

impl CircuitEditor for AscEditor {
    fn kind(&self) -> CircuitKind {
        CircuitKind::Schematic
    }

    fn text(&self) -> String {
        self.lines.concat()
    }

    fn set_component_value(&mut self, reference: &str, value: &str) -> Result<()> {
        let (start, end) = self
            .find_symbol(reference)
            .ok_or_else(|| Error::ComponentNotFound(reference.to_string()))?;

        let existing = (start..end).find(|&i| self.lines[i].starts_with(VALUE));
        match existing {
            Some(i) => {
                let eol = split_eol(&self.lines[i]).1.to_string();
                self.lines[i] = format!("{VALUE}{value}{eol}");
            }
            None => {
                // Attribute order does not matter to LTspice; append to the block
                let eol = self.eol();
                let last = &mut self.lines[end - 1];
                let tail = if last.ends_with('\n') {
                    split_eol(last).1.to_string()
                } else {
                    last.push_str(eol);
                    String::new()
                };
                self.lines.insert(end, format!("{VALUE}{value}{tail}"));
            }
        }
        Ok(())
    }

    fn remove_instruction(&mut self, keyword: &str) -> Removal {
        let keyword = keyword.to_lowercase();
        let mut removed = 0;

        self.lines.retain_mut(|line| {
            let rebuilt = {
                let (content, eol) = split_eol(line);
                // The first '!' or ';' separates the item header from its text
                let marker = content
                    .starts_with("TEXT ")
                    .then(|| content.find(['!', ';']))
                    .flatten();
                let Some(bang) = marker.filter(|&i| content.as_bytes()[i] == b'!') else {
                    return true;
                };

                let (head, body) = content.split_at(bang + 1);
                let kept: Vec<&str> = body
                    .split("\\n")
                    .filter(|directive| {
                        let matches = directive.trim_start().to_lowercase().starts_with(&keyword);
                        if matches {
                            removed += 1;
                        }
                        !matches
                    })
                    .collect();

                if kept.is_empty() {
                    return false;
                }
                format!("{head}{}{eol}", kept.join("\\n"))
            };
            *line = rebuilt;
            true
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

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMATIC: &str = "Version 4\n\
SHEET 1 880 680\n\
SYMBOL voltage 128 96 R0\n\
WINDOW 123 0 0 Left 0\n\
SYMATTR InstName V2\n\
SYMATTR Value 0\n\
SYMBOL voltage 256 96 R0\n\
SYMATTR InstName V3\n\
SYMBOL cap 320 112 R0\n\
SYMATTR InstName C1\n\
SYMATTR Value 22n\n\
TEXT -48 456 Left 2 !.ac dec 100 10 20k\n\
TEXT -48 488 Left 2 !.wrdata out.txt V(amp-in)\n\
TEXT -48 520 Left 2 !.param x=10\\n.WRDATA other.txt V(out)\n\
TEXT -48 552 Left 2 ;.wrdata in a comment!\n";

    #[test]
    fn test_set_existing_value() {
        let mut editor = AscEditor::new(SCHEMATIC, TextCodec::default());
        editor.set_component_value("v2", "5").unwrap();
        assert!(editor.text().contains("SYMATTR InstName V2\nSYMATTR Value 5\n"));
        assert!(editor.text().contains("SYMATTR Value 22n\n"));
    }

    #[test]
    fn test_set_missing_value_attribute() {
        let mut editor = AscEditor::new(SCHEMATIC, TextCodec::default());
        editor.set_component_value("V3", "5").unwrap();
        assert!(editor.text().contains("SYMATTR InstName V3\nSYMATTR Value 5\nSYMBOL cap"));
    }

    #[test]
    fn test_unknown_component() {
        let mut editor = AscEditor::new(SCHEMATIC, TextCodec::default());
        let err = editor.set_component_value("V9", "5").unwrap_err();
        assert!(matches!(err, Error::ComponentNotFound(ref r) if r == "V9"));
    }

    #[test]
    fn test_remove_wrdata_directives() {
        let mut editor = AscEditor::new(SCHEMATIC, TextCodec::default());
        assert_eq!(editor.remove_instruction(".wrdata"), Removal::Removed(2));

        let text = editor.text();
        assert!(!text.contains("!.wrdata"));
        assert!(text.contains("TEXT -48 520 Left 2 !.param x=10\n"));
        assert!(text.contains(";.wrdata in a comment"));
        assert!(text.contains("!.ac dec 100 10 20k"));
    }

    #[test]
    fn test_remove_absent_directive() {
        let mut editor = AscEditor::new("Version 4\nTEXT 0 0 Left 2 !.op\n", TextCodec::default());
        assert_eq!(editor.remove_instruction(".wrdata"), Removal::Absent);
    }
}
