//! Sweep orchestration.
//!
//! A sweep runs every scenario under every variant. Each run edits a working
//! copy of the circuit inside the output directory, simulates it, and writes
//! the target node's response as `<product>__<scenario>_<variant>.csv`.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::config::{Scenario, SweepConfig, SweepVariant};
use crate::editor::{EditSession, remove_existing_directive};
use crate::encoding::TextCodec;
use crate::error::{Error, Result};
use crate::extract::{extract, write_csv};
use crate::simulator::{Launcher, Simulator, check_artifact};

/// LTspice text-export directive, stripped from every working copy.
const WRDATA: &str = ".wrdata";

/// Name of the output directory for a sweep started at `now`.
pub fn output_dir_name(product: &str, now: &NaiveDateTime) -> String {
    format!(
        "{}__{product}__{}",
        now.format("%y-%m-%d"),
        now.format("%H-%M-%S")
    )
}

/// Name of the CSV file for one run.
pub fn csv_file_name(product: &str, scenario: &str, variant: &str) -> String {
    format!("{product}__{scenario}_{variant}.csv")
}

/// A run that failed while the sweep kept going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub scenario: String,
    pub variant: String,
    pub error: String,
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Timestamped directory holding every output.
    pub output_dir: PathBuf,
    /// Copy of the analysis template, if one was configured.
    pub template: Option<PathBuf>,
    /// CSV files written, in run order.
    pub written: Vec<PathBuf>,
    /// Failed runs (only populated with `keep_going`).
    pub failures: Vec<RunFailure>,
}

impl SweepReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs a configured sweep.
pub struct SweepRunner {
    config: SweepConfig,
    codec: TextCodec,
    simulator: Simulator,
}

impl SweepRunner {
    /// Validate the configuration and build a runner that launches LTspice.
    pub fn new(config: SweepConfig) -> Result<Self> {
        let simulator = Simulator::new(config.simulator.clone());
        Self::with_simulator(config, simulator)
    }

    /// Build a runner with a custom process launcher.
    pub fn with_launcher(config: SweepConfig, launcher: Box<dyn Launcher>) -> Result<Self> {
        let simulator = Simulator::with_launcher(config.simulator.clone(), launcher);
        Self::with_simulator(config, simulator)
    }

    fn with_simulator(config: SweepConfig, simulator: Simulator) -> Result<Self> {
        if !config.input.is_file() {
            return Err(Error::Config(format!(
                "input file not found: {}",
                config.input.display()
            )));
        }
        if let Some(template) = &config.template {
            if !template.is_file() {
                return Err(Error::Config(format!(
                    "template not found: {}",
                    template.display()
                )));
            }
        }
        if config.product_name.trim().is_empty() {
            return Err(Error::Config("product name is empty".to_string()));
        }
        simulator.ensure_executable()?;
        let codec = config.codec()?;

        Ok(Self {
            config,
            codec,
            simulator,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Create the timestamped output directory under the output root.
    pub fn make_outdir(&self) -> Result<PathBuf> {
        let now = chrono::Local::now().naive_local();
        let dir = self
            .config
            .output_root
            .join(output_dir_name(&self.config.product_name, &now));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Copy the analysis template into `outdir` as `<product>_Analysis<ext>`.
    fn copy_template(&self, outdir: &Path) -> Result<Option<PathBuf>> {
        let Some(template) = &self.config.template else {
            return Ok(None);
        };
        let mut name = format!("{}_Analysis", self.config.product_name);
        if let Some(ext) = template.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }
        let dest = outdir.join(name);
        std::fs::copy(template, &dest)?;
        Ok(Some(dest))
    }

    /// Run every variant over every scenario.
    ///
    /// Stops at the first failed run unless `keep_going` is set, in which
    /// case failures are logged and collected in the report.
    pub fn run(&self) -> Result<SweepReport> {
        let output_dir = self.make_outdir()?;
        let template = self.copy_template(&output_dir)?;
        let mut report = SweepReport {
            output_dir,
            template,
            ..Default::default()
        };

        log::info!(
            "running {} simulations into {}",
            self.config.run_count(),
            report.output_dir.display()
        );

        for variant in &self.config.variants {
            for scenario in &self.config.scenarios {
                let out_csv = report.output_dir.join(csv_file_name(
                    &self.config.product_name,
                    &scenario.name,
                    &variant.name,
                ));

                match self.run_case(scenario, variant, &out_csv) {
                    Ok(()) => {
                        log::info!("saved: {}", out_csv.display());
                        report.written.push(out_csv);
                    }
                    Err(e) if self.config.keep_going => {
                        log::error!("{} ({}) failed: {}", scenario.name, variant.name, e);
                        report.failures.push(RunFailure {
                            scenario: scenario.name.clone(),
                            variant: variant.name.clone(),
                            error: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(report)
    }

    /// Simulate one scenario under one variant and write its CSV.
    ///
    /// The working copy is restored whether or not the run succeeds; an
    /// error from the run takes precedence over a restore error.
    pub fn run_case(
        &self,
        scenario: &Scenario,
        variant: &SweepVariant,
        out_csv: &Path,
    ) -> Result<()> {
        let work_dir = out_csv
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut session = EditSession::prepare(
            &self.config.input,
            work_dir,
            variant.transform.as_ref(),
            self.codec,
        )?;

        let outcome = self.simulate_case(&mut session, scenario, out_csv);
        let restored = session.restore();

        match (outcome, restored) {
            (Err(e), Err(restore_err)) => {
                log::warn!(
                    "failed to restore {}: {}",
                    session.path().display(),
                    restore_err
                );
                Err(e)
            }
            (outcome, restored) => outcome.and(restored),
        }
    }

    fn simulate_case(
        &self,
        session: &mut EditSession,
        scenario: &Scenario,
        out_csv: &Path,
    ) -> Result<()> {
        let editor = session.editor_mut();
        for (reference, value) in &scenario.values {
            editor.set_component_value(reference, value)?;
        }
        remove_existing_directive(editor, WRDATA);
        session.save()?;

        // Artifacts left over from the previous run must not pass for this one
        let circuit = session.path();
        remove_stale(&circuit.with_extension("raw"))?;
        remove_stale(&circuit.with_extension("log"))?;

        self.simulator.run(circuit)?;
        let raw_path = check_artifact(circuit)?;
        let raw = ltsweep_raw::read_rawfile(&raw_path)?;
        let steps = ltsweep_raw::read_step_log(&circuit.with_extension("log"));

        let table = extract(&raw, &self.config.target_node, &steps)?;
        write_csv(&table, out_csv)?;
        Ok(())
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
