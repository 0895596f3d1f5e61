//! ltsweep CLI tool.
//!
//! Runs LTspice over a catalog of switch scenarios and exports the response
//! of one node per run as CSV.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ltsweep")]
#[command(about = "Automate LTspice AC sweeps over switch scenarios and export CSV")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scenario under every variant
    Run {
        /// Sweep configuration file (JSON); built-in pickup defaults if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Continue after a failed run and report failures at the end
        #[arg(long)]
        keep_going: bool,

        /// Override the directory the output folder is created in
        #[arg(long)]
        output_root: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    InitConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect the format of a circuit file
    Detect {
        /// Path to the circuit file
        file: PathBuf,

        /// Preferred text encoding label
        #[arg(long, default_value = ltsweep::encoding::DEFAULT_ENCODING)]
        encoding: String,
    },

    /// Export the response of one node from an existing RAW file
    Extract {
        /// Path to the RAW file
        raw: PathBuf,

        /// Node name (e.g. Amp-In) or full trace name (e.g. "V(out)")
        #[arg(short, long)]
        node: String,

        /// Simulator log with step parameters (default: RAW path with .log)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Output CSV file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the traces of a RAW file
    Traces {
        /// Path to the RAW file
        raw: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Also installs the bridge for `log` records from the library crates
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            keep_going,
            output_root,
        } => commands::cmd_run(config, keep_going, output_root),
        Commands::InitConfig { output } => commands::cmd_init_config(output),
        Commands::Detect { file, encoding } => commands::cmd_detect(file, &encoding),
        Commands::Extract {
            raw,
            node,
            log,
            output,
        } => commands::cmd_extract(raw, &node, log, output),
        Commands::Traces { raw } => commands::cmd_traces(raw),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
