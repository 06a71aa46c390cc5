#![forbid(unsafe_code)]

mod cmd;
mod dataset;
mod output;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chroma: graph-coloring instance loader",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Parse one instance file",
        long_about = "Parse a single instance file and report its size, color target and diff edge.",
        after_help = "EXAMPLES:\n    # Inspect a DIMACS file\n    chroma inspect graphs/queen5_5.col\n\n    # Force the paired format\n    chroma inspect train/pair_0001.txt --graph-format paired\n\n    # Emit machine-readable output\n    chroma inspect graphs/queen5_5.col --json"
    )]
    Inspect(cmd::inspect::InspectArgs),

    #[command(
        about = "Assemble batches from a dataset directory",
        long_about = "Shuffle a dataset directory and assemble block-diagonal batches, either from SAT/UNSAT pairs or from single instances.",
        after_help = "EXAMPLES:\n    # One epoch of paired batches, 16 pairs each\n    chroma batches train/\n\n    # Ten reproducible batches of 4 pairs\n    chroma batches train/ --batch-size 4 --seed 7 --limit 10\n\n    # Single DIMACS instances\n    chroma batches graphs/ --mode single --json"
    )]
    Batches(cmd::batches::BatchesArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHROMA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "chroma=debug,info"
        } else {
            "chroma=info,warn"
        })
    });

    let format = env::var("CHROMA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    match cli.command {
        Commands::Inspect(ref args) => cmd::inspect::run_inspect(args, output),
        Commands::Batches(ref args) => cmd::batches::run_batches(args, output),
    }
}
