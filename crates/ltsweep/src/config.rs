//! Sweep configuration.
//!
//! A sweep is described by a JSON file; every omitted field falls back to
//! [`SweepConfig::pickup_defaults`]. Relative paths are resolved against the
//! directory of the config file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::encoding::{DEFAULT_ENCODING, TextCodec};
use crate::error::Result;
use crate::simulator::SimulatorConfig;
use crate::transform::TextTransform;

/// Switch voltage for a closed switch.
const ON: &str = "5";
/// Switch voltage for an open switch.
const OFF: &str = "0";

/// One switch state: component values applied before a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Name used in the output file name (e.g. `Neck-Middle`).
    pub name: String,
    /// Component reference to value, applied in order.
    pub values: IndexMap<String, String>,
}

impl Scenario {
    pub fn new<'a>(name: &str, values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            name: name.to_string(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// A text-level variation of the circuit applied to every scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepVariant {
    /// Suffix used in the output file name (e.g. `Tone`).
    pub name: String,
    /// Transform applied to the circuit text; `None` runs the circuit as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TextTransform>,
}

/// Everything needed to run a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Product name used in output directory and file names.
    pub product_name: String,
    /// Circuit file (`.asc` or SPICE netlist).
    pub input: PathBuf,
    /// File copied into the output directory as `<product>_Analysis<ext>`.
    pub template: Option<PathBuf>,
    /// Directory the timestamped output directory is created in.
    pub output_root: PathBuf,
    /// Node whose response is exported.
    pub target_node: String,
    /// Preferred text encoding label for circuit files.
    pub encoding: String,
    pub simulator: SimulatorConfig,
    pub scenarios: Vec<Scenario>,
    pub variants: Vec<SweepVariant>,
    /// Continue with the next run after a failed one.
    pub keep_going: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::pickup_defaults()
    }
}

impl SweepConfig {
    /// Five-switch pickup selector (V2 neck, V3 middle, V4 bridge, V5 tone 1
    /// with the lower 250k volume pot, V6 tone 2 with the upper 500k volume
    /// pot) run once sweeping volume and once sweeping tone.
    pub fn pickup_defaults() -> Self {
        let switches = ["V2", "V3", "V4", "V5", "V6"];
        let case = |name: &str, states: [&'static str; 5]| {
            Scenario::new(name, switches.into_iter().zip(states))
        };

        Self {
            product_name: "AM-Pro".to_string(),
            input: PathBuf::from("asc/AM-Pro_Analysis.asc"),
            template: Some(PathBuf::from("Template/Analysis_Template.xlsm")),
            output_root: PathBuf::from("."),
            target_node: "Amp-In".to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
            simulator: SimulatorConfig::default(),
            scenarios: vec![
                case("Neck", [ON, OFF, OFF, OFF, OFF]),
                case("Middle", [OFF, ON, OFF, OFF, OFF]),
                case("Bridge", [OFF, OFF, ON, OFF, OFF]),
                case("Neck-Middle", [ON, ON, OFF, ON, OFF]),
                case("Middle-Bridge", [OFF, ON, ON, OFF, OFF]),
                case("Bridge-Neck", [ON, OFF, ON, OFF, OFF]),
                case("Hum", [OFF, OFF, ON, ON, ON]),
                case("Neck-Hum", [ON, OFF, ON, OFF, ON]),
                case("Middle-Hum", [OFF, ON, ON, OFF, ON]),
            ],
            variants: vec![
                SweepVariant {
                    name: "Vol".to_string(),
                    transform: None,
                },
                SweepVariant {
                    name: "Tone".to_string(),
                    transform: Some(TextTransform::tone_sweep()),
                },
            ],
            keep_going: false,
        }
    }

    /// Load a config file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: SweepConfig = serde_json::from_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Make relative input, template and output paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.input);
        resolve(&mut self.output_root);
        if let Some(template) = self.template.as_mut() {
            resolve(template);
        }
    }

    /// Codec for the configured encoding label.
    pub fn codec(&self) -> Result<TextCodec> {
        TextCodec::for_label(&self.encoding)
    }

    /// Number of simulator runs in a full sweep.
    pub fn run_count(&self) -> usize {
        self.scenarios.len() * self.variants.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_defaults() {
        let config = SweepConfig::pickup_defaults();
        assert_eq!(config.run_count(), 18);
        assert_eq!(config.variants[0].name, "Vol");
        assert!(config.variants[0].transform.is_none());
        assert_eq!(config.variants[1].transform, Some(TextTransform::tone_sweep()));

        let hum = &config.scenarios[6];
        assert_eq!(hum.name, "Hum");
        let states: Vec<(&str, &str)> = hum
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(states, [("V2", "0"), ("V3", "0"), ("V4", "5"), ("V5", "5"), ("V6", "5")]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SweepConfig = serde_json::from_str(
            r#"{"product_name": "PAF", "keep_going": true, "simulator": {"wrapper": ["wine"]}}"#,
        )
        .unwrap();
        assert_eq!(config.product_name, "PAF");
        assert!(config.keep_going);
        assert_eq!(config.simulator.wrapper, ["wine"]);
        assert_eq!(config.simulator.variants.len(), 3);
        assert_eq!(config.scenarios.len(), 9);
        assert_eq!(config.target_node, "Amp-In");
    }

    #[test]
    fn test_default_config_json_roundtrip() {
        let config = SweepConfig::pickup_defaults();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: SweepConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.json");
        std::fs::write(&path, r#"{"input": "circuits/pu.cir", "template": null}"#).unwrap();

        let config = SweepConfig::load(&path).unwrap();
        assert_eq!(config.input, dir.path().join("circuits/pu.cir"));
        assert_eq!(config.output_root, dir.path().join("."));
        assert_eq!(config.template, None);
    }

    #[test]
    fn test_codec_from_label() {
        let mut config = SweepConfig::pickup_defaults();
        assert_eq!(config.codec().unwrap().name(), "Shift_JIS");
        config.encoding = "bogus".to_string();
        assert!(config.codec().is_err());
    }
}
