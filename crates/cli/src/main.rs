// qekit CLI - keyed table merges and quality-engineering checks

mod claims;
mod demo;
mod drift;
mod exit_codes;
mod merge;
mod util;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "qekit")]
#[command(about = "Keyed table merges, rule drift and claim checks")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log merge steps and rule decisions to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge N tables on a shared key
    #[command(subcommand)]
    Merge(merge::MergeCommands),

    /// Score how far rule text moved between two rule sets
    Drift(drift::DriftArgs),

    /// Expected member and plan share per claim
    Claims(claims::ClaimsArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: qekit <command> [options]");
            eprintln!("       qekit --help for more information");
            Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None })
        }
        Some(Commands::Merge(cmd)) => merge::cmd_merge(cmd),
        Some(Commands::Drift(args)) => drift::cmd_drift(args),
        Some(Commands::Claims(args)) => claims::cmd_claims(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
