mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "roadrecon")]
#[command(about = "Reconcile road inventory mileage against the ARNOLD registry")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  roadrecon run allegheny.recon.toml
  roadrecon run allegheny.recon.toml --output report.csv
  roadrecon run allegheny.recon.toml --json --fail-on-discrepancy")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Write the CSV report here (overrides [output] file)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Override the scale factor from the config (rejected when the config
        /// sets a non-zero tolerance, which is in scaled units)
        #[arg(long)]
        scale: Option<i64>,

        /// Print the full result as JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write the full result as JSON to a file
        #[arg(long)]
        json_output: Option<PathBuf>,

        /// Exit non-zero when any road is mismatched or missing
        #[arg(long)]
        fail_on_discrepancy: bool,
    },

    /// Validate a recon config without running
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            output,
            scale,
            json,
            json_output,
            fail_on_discrepancy,
        } => recon::cmd_run(recon::RunArgs {
            config,
            output,
            scale,
            json,
            json_output,
            fail_on_discrepancy,
        }),
        Commands::Validate { config } => recon::cmd_validate(config),
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

