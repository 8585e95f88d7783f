mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::records::{RecordsArgs, StatsArgs};
use commands::valuation::{DcfArgs, FormatKrwArgs};

/// Startup valuation and platform record tooling
#[derive(Parser)]
#[command(
    name = "vlink",
    version,
    about = "Startup valuation and platform record tooling",
    long_about = "A CLI for the VentureLink platform. Runs discounted cash flow \
                  valuations with decimal precision, formats amounts in Korean won, \
                  and reports on investor, fund, startup and notice record snapshots."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Discounted Cash Flow valuation
    Dcf(DcfArgs),
    /// Format an amount in won (조원 / 억원 / 만원 / 원)
    FormatKrw(FormatKrwArgs),
    /// Dashboard counts from a record store snapshot
    Stats(StatsArgs),
    /// List, show, create, update or delete records in a snapshot
    Records(RecordsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dcf(args) => commands::valuation::run_dcf(args),
        Commands::FormatKrw(args) => commands::valuation::run_format_krw(args),
        Commands::Stats(args) => commands::records::run_stats(args),
        Commands::Records(args) => commands::records::run_records(args),
        Commands::Version => {
            println!("vlink {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
