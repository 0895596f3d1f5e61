//! Circuit file format detection.

use std::path::Path;

use crate::encoding::TextCodec;
use crate::error::{Error, Result};

/// Leading text that marks a SPICE netlist.
const NETLIST_PREFIXES: [&str; 3] = ["*", ".title", ".include"];

/// Marker strings of netlist formats from other tools.
const FOREIGN_MARKERS: [(&str, &str); 1] = [("ExpressPCB Netlist", "ExpressPCB")];

/// Kind of an input circuit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitKind {
    /// LTspice schematic capture (`.asc`).
    Schematic,
    /// SPICE text netlist (`.cir`, `.net`, `.sp`, ...).
    Netlist,
}

impl CircuitKind {
    /// Short name used in log messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitKind::Schematic => "asc",
            CircuitKind::Netlist => "spice",
        }
    }
}

/// Classify a circuit file.
///
/// `.asc` files are schematics by extension. Anything else is read and
/// recognised as a netlist when it starts with a comment or a `.title` /
/// `.include` directive. Netlists exported by other tools and unrecognised
/// text are rejected.
pub fn detect_format(path: &Path, codec: &TextCodec) -> Result<CircuitKind> {
    let is_asc = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("asc"));
    if is_asc {
        return Ok(CircuitKind::Schematic);
    }

    let text = codec.read(path)?;
    classify_text(&text).map_err(|kind| match kind {
        Some(kind) => Error::UnsupportedFormat {
            kind: kind.to_string(),
        },
        None => Error::UnknownFormat {
            path: path.to_path_buf(),
        },
    })
}

/// Classify netlist text; on failure returns the foreign tool name, if any.
fn classify_text(text: &str) -> std::result::Result<CircuitKind, Option<&'static str>> {
    let stripped = text.trim_start();
    let lower_head: String = stripped.chars().take(16).collect::<String>().to_lowercase();
    if NETLIST_PREFIXES
        .iter()
        .any(|prefix| lower_head.starts_with(prefix))
    {
        return Ok(CircuitKind::Netlist);
    }

    Err(FOREIGN_MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, tool)| *tool))
}
