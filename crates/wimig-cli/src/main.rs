#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wim: replay work-item revision histories and reconcile links",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Show the global revision replay order",
        long_about = "Order every revision in an export chronologically and print the reference queue.",
        after_help = "EXAMPLES:\n    # Print the replay order\n    wim plan --input export.json\n\n    # Emit machine-readable output\n    wim plan --input export.json --json"
    )]
    Plan(cmd::plan::PlanArgs),

    #[command(
        about = "Replay revisions and print link mutations",
        long_about = "Replay every revision in global order and print the link additions and removals the configured link rules produce.",
        after_help = "EXAMPLES:\n    # Replay with a TOML config\n    wim replay --input export.json --config migration.toml\n\n    # Emit a JSON report\n    wim replay --input export.json --config migration.toml --json"
    )]
    Replay(cmd::replay::ReplayArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("WIMIG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "wimig=debug,info"
        } else {
            "wimig=info,warn"
        })
    });

    let format = env::var("WIMIG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();

    let result = match cli.command {
        Commands::Plan(ref args) => cmd::plan::run_plan(args, output),
        Commands::Replay(ref args) => cmd::replay::run_replay(args, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
