mod args;
mod commands;
mod printing;
mod utils;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use args::{ExportFormat, SessionArgs};
use commands::{config, params, query, solve};

/// Stemflow: a stochastic stem-cell population explorer
///
/// Solves a three-compartment SDE model of stem, progenitor and red blood
/// cells and reports trajectories, snapshots and status for any parameter set.
#[derive(Parser, Debug)]
#[command(name = "stemflow")]
#[command(
    author,
    version,
    about = "Explores a stochastic stem-cell population model",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default engine configuration as JSON.
    ///
    /// Edit the file and pass it back with `--config` to reproduce a setup.
    Config {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show parameter values, floors and increments.
    Params {
        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Solve the model and export the full trajectory.
    Solve {
        #[command(flatten)]
        session: SessionArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the population snapshot at one time.
    Query {
        /// Time to project (must be a grid point unless --snap is given)
        #[arg(short, long, allow_negative_numbers = true)]
        time: f64,

        /// Round the time to the nearest grid point
        #[arg(long)]
        snap: bool,

        #[command(flatten)]
        session: SessionArgs,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Config { output } => {
            config::write_default_config(output.as_ref())?;
        }
        Commands::Params { config } => {
            params::show_parameters(config.as_ref())?;
        }
        Commands::Solve {
            session,
            format,
            output,
        } => {
            solve::export_trajectory(&session, format, output.as_ref())?;
        }
        Commands::Query {
            time,
            snap,
            session,
        } => {
            query::show_snapshot(&session, time, snap)?;
        }
    }

    Ok(())
}
