//! Text-level netlist transforms.
//!
//! LTspice treats a line starting with `;` as a comment, so a directive such
//! as `.step param j 0 0.999 0.111` is switched off by rewriting it to
//! `;step param j 0 0.999 0.111`. The same text appears in schematics inside
//! `TEXT ... !` directive blocks, so transforms work on raw text for both
//! circuit kinds.

use serde::{Deserialize, Serialize};

/// One edit of a [`TextTransform`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformStep {
    /// Enable or disable a directive by flipping its leading `.`/`;`.
    Toggle {
        /// Directive text with its leading `.` (e.g. `.step param k 0.111 0.999 0.111`).
        directive: String,
        /// Desired state after the edit.
        enabled: bool,
    },
    /// Replace every occurrence of a literal string.
    Replace { from: String, to: String },
}

/// Ordered list of text edits applied before a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextTransform {
    steps: Vec<TransformStep>,
}

impl TextTransform {
    /// An empty transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step that enables a directive.
    pub fn enable(mut self, directive: &str) -> Self {
        self.steps.push(TransformStep::Toggle {
            directive: directive.to_string(),
            enabled: true,
        });
        self
    }

    /// Append a step that disables a directive.
    pub fn disable(mut self, directive: &str) -> Self {
        self.steps.push(TransformStep::Toggle {
            directive: directive.to_string(),
            enabled: false,
        });
        self
    }

    /// Append a literal replacement.
    pub fn replace(mut self, from: &str, to: &str) -> Self {
        self.steps.push(TransformStep::Replace {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Whether the transform leaves text unchanged.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order.
    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();
        for step in &self.steps {
            text = match step {
                TransformStep::Toggle { directive, enabled } => {
                    let body = directive
                        .strip_prefix(['.', ';'])
                        .unwrap_or(directive.as_str());
                    let (from, to) = if *enabled {
                        (format!(";{body}"), format!(".{body}"))
                    } else {
                        (format!(".{body}"), format!(";{body}"))
                    };
                    text.replace(&from, &to)
                }
                TransformStep::Replace { from, to } => text.replace(from.as_str(), to),
            };
        }
        text
    }

    /// The tone-sweep transform of the default pickup catalog: step the tone
    /// pot `j`, hold the volume pot `k` fixed at full.
    pub fn tone_sweep() -> Self {
        Self::new()
            .enable(".step param j 0 0.999 0.111")
            .enable(".param Pt=(x**j-1)/(x-1)")
            .disable(".param Pt=1")
            .disable(".step param k 0.111 0.999 0.111")
            .disable(".param Px=(x**k-1)/(x-1)")
            .enable(".param Px=1")
    }
}
