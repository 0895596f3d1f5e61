//! Circuit editing and working-copy management.
//!
//! An [`EditSession`] owns the working copy of a circuit for one run. It is
//! created from the input file (format detected, micro signs normalized,
//! text transform applied) and writes the untransformed text back to the
//! working copy when restored or dropped, whether or not the run succeeded.

mod asc;
mod spice;

use std::path::{Path, PathBuf};

pub use asc::AscEditor;
pub use spice::SpiceEditor;

use crate::encoding::{TextCodec, normalize_micro_symbols};
use crate::error::{Error, Result};
use crate::input::{CircuitKind, detect_format};
use crate::transform::TextTransform;

/// Header prepended to netlists that do not start with a comment, so the
/// first real line is not swallowed as the title.
pub const NETLIST_HEADER: &str = "* converted for SpiceEditor\r\n";

/// Outcome of removing a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// This many directive lines were removed.
    Removed(usize),
    /// The directive was not present.
    Absent,
    /// The editor cannot remove directives.
    Unsupported,
}

/// In-memory editor bound to one circuit text.
pub trait CircuitEditor {
    /// Format handled by this editor.
    fn kind(&self) -> CircuitKind;

    /// Current circuit text.
    fn text(&self) -> String;

    /// Set the value of a component by reference designator (e.g. `V2`).
    fn set_component_value(&mut self, reference: &str, value: &str) -> Result<()>;

    /// Remove every directive starting with `keyword` (e.g. `.wrdata`).
    fn remove_instruction(&mut self, keyword: &str) -> Removal {
        let _ = keyword;
        Removal::Unsupported
    }

    /// Write the circuit to `path` in the editor's encoding, micro signs normalized.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Build the editor for a circuit kind.
pub fn editor_for(kind: CircuitKind, text: &str, codec: TextCodec) -> Box<dyn CircuitEditor> {
    match kind {
        CircuitKind::Schematic => Box::new(AscEditor::new(text, codec)),
        CircuitKind::Netlist => Box::new(SpiceEditor::new(text, codec)),
    }
}

/// Remove a directive if the circuit mentions it.
///
/// A circuit without the directive is left untouched without any
/// diagnostics. An editor without removal support is logged and skipped.
pub fn remove_existing_directive(editor: &mut dyn CircuitEditor, keyword: &str) -> Removal {
    if !editor
        .text()
        .to_lowercase()
        .contains(&keyword.to_lowercase())
    {
        return Removal::Absent;
    }

    let outcome = editor.remove_instruction(keyword);
    match outcome {
        Removal::Removed(n) => log::debug!("removed {n} existing {keyword} directive(s)"),
        Removal::Unsupported => log::warn!(
            "{} editor cannot remove {keyword} directives; leaving them in place",
            editor.kind().as_str()
        ),
        Removal::Absent => {}
    }
    outcome
}

/// Working copy of a circuit for one run.
pub struct EditSession {
    path: PathBuf,
    restore_text: String,
    kind: CircuitKind,
    editor: Box<dyn CircuitEditor>,
    codec: TextCodec,
    restore_attempted: bool,
}

impl EditSession {
    /// Create the working copy of `input` inside `work_dir`.
    ///
    /// Schematics keep their file name; netlists are written as `<stem>.cir`.
    pub fn prepare(
        input: &Path,
        work_dir: &Path,
        transform: Option<&TextTransform>,
        codec: TextCodec,
    ) -> Result<Self> {
        let kind = detect_format(input, &codec)?;
        std::fs::create_dir_all(work_dir)?;

        let normalized = normalize_micro_symbols(&codec.read(input)?);
        let transformed = match transform {
            Some(t) => t.apply(&normalized),
            None => normalized.clone(),
        };

        let (path, restore_text, working_text) = match kind {
            CircuitKind::Schematic => {
                let name = input.file_name().unwrap_or(input.as_os_str());
                (work_dir.join(name), normalized, transformed)
            }
            CircuitKind::Netlist => {
                let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
                name.push(".cir");
                let path = work_dir.join(name);
                if normalized.trim_start().starts_with('*') {
                    (path, normalized, transformed)
                } else {
                    (
                        path,
                        format!("{NETLIST_HEADER}{normalized}"),
                        format!("{NETLIST_HEADER}{transformed}"),
                    )
                }
            }
        };

        if path == input {
            return Err(Error::Config(format!(
                "working copy {} would overwrite the input circuit",
                path.display()
            )));
        }

        codec.write(&path, &working_text)?;
        log::debug!(
            "prepared {} working copy {} ({})",
            kind.as_str(),
            path.display(),
            codec.name()
        );

        Ok(Self {
            editor: editor_for(kind, &working_text, codec),
            path,
            restore_text,
            kind,
            codec,
            restore_attempted: false,
        })
    }

    /// Path of the working copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected circuit kind.
    pub fn kind(&self) -> CircuitKind {
        self.kind
    }

    /// Text written back on restore.
    pub fn restore_text(&self) -> &str {
        &self.restore_text
    }

    /// Editor for the working copy.
    pub fn editor(&self) -> &dyn CircuitEditor {
        self.editor.as_ref()
    }

    /// Mutable editor for the working copy.
    pub fn editor_mut(&mut self) -> &mut dyn CircuitEditor {
        self.editor.as_mut()
    }

    /// Write the edited circuit to the working copy.
    pub fn save(&self) -> Result<()> {
        self.editor.save(&self.path)
    }

    /// Write the original text back to the working copy.
    ///
    /// A failed restore is not retried on drop.
    pub fn restore(&mut self) -> Result<()> {
        self.restore_attempted = true;
        self.codec.write(&self.path, &self.restore_text)
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        if self.restore_attempted {
            return;
        }
        if let Err(e) = self.restore() {
            log::error!("failed to restore {}: {}", self.path.display(), e);
        }
    }
}

/// Split text into lines that keep their terminators.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Split a line into its content and terminator.
pub(crate) fn split_eol(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\r', '\n']);
    (content, &line[content.len()..])
}
