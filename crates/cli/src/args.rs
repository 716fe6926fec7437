use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Arguments shared by every command that builds a session.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Engine configuration file (defaults to the reference scenario)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parameter adjustment to replay, e.g. `d3:up` or `lambda:down`
    ///
    /// May be repeated; adjustments are applied in order, one increment each.
    #[arg(short, long = "adjust", value_name = "NAME:up|down")]
    pub adjustments: Vec<String>,
}

/// Trajectory export format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}
