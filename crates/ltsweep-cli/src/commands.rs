//! Subcommand implementations.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use ltsweep::{SweepConfig, SweepRunner, TextCodec, detect_format, extract, write_csv};
use ltsweep_raw::{read_rawfile, read_step_log};

pub fn cmd_run(
    config_path: Option<PathBuf>,
    keep_going: bool,
    output_root: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut config = match &config_path {
        Some(path) => SweepConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let mut config = SweepConfig::pickup_defaults();
            config.resolve_paths(&std::env::current_dir()?);
            config
        }
    };
    if keep_going {
        config.keep_going = true;
    }
    if let Some(root) = output_root {
        config.output_root = root;
    }

    let runner = SweepRunner::new(config)?;
    let report = runner.run()?;

    println!("\nDone.");
    println!("Output folder: {}", report.output_dir.display());
    if report.is_success() {
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} of {} runs failed:",
        report.failures.len(),
        runner.config().run_count()
    );
    for failure in &report.failures {
        println!("  {} ({}): {}", failure.scenario, failure.variant, failure.error);
    }
    Ok(ExitCode::FAILURE)
}

pub fn cmd_init_config(output: Option<PathBuf>) -> Result<ExitCode> {
    let json = serde_json::to_string_pretty(&SweepConfig::pickup_defaults())?;
    match output {
        Some(path) => {
            std::fs::write(&path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote default config to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_detect(file: PathBuf, encoding: &str) -> Result<ExitCode> {
    let codec = TextCodec::for_label(encoding)?;
    let kind = detect_format(&file, &codec)?;
    println!("{}", kind.as_str());
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_extract(
    raw_path: PathBuf,
    node: &str,
    log_path: Option<PathBuf>,
    output: PathBuf,
) -> Result<ExitCode> {
    let raw = read_rawfile(&raw_path)
        .with_context(|| format!("failed to read {}", raw_path.display()))?;
    let log_path = log_path.unwrap_or_else(|| raw_path.with_extension("log"));
    let steps = read_step_log(&log_path);

    let table = extract(&raw, node, &steps)?;
    write_csv(&table, &output)?;

    log::info!(
        "saved: {} ({} rows, {} steps)",
        output.display(),
        table.len(),
        raw.step_count()
    );
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_traces(raw_path: PathBuf) -> Result<ExitCode> {
    let raw = read_rawfile(&raw_path)
        .with_context(|| format!("failed to read {}", raw_path.display()))?;

    println!("Plot: {}", raw.header.plotname);
    println!("Flags: {}", raw.header.flags.join(" "));
    println!("Points: {} in {} step(s)", raw.header.num_points, raw.step_count());
    for variable in &raw.header.variables {
        println!("{}\t{}\t{}", variable.index, variable.name, variable.var_type);
    }
    Ok(ExitCode::SUCCESS)
}
