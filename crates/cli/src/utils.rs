use anyhow::{Context, Result, bail};
use log::info;
use std::path::PathBuf;
use stemflow_sim::simulation::{
    ChangeOutcome, Direction, EngineConfig, ParameterChange, Session,
};

use crate::args::SessionArgs;

/// Load a configuration file, or the reference scenario when none is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Parse `NAME:DIRECTION` into a typed change.
pub fn parse_adjustment(arg: &str) -> Result<ParameterChange> {
    let Some((name, direction)) = arg.split_once(':') else {
        bail!("Invalid adjustment '{arg}'. Use NAME:up or NAME:down (e.g. d3:up)");
    };
    let direction: Direction = direction
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .with_context(|| format!("Invalid direction in adjustment '{arg}'"))?;
    ParameterChange::parse(name.trim(), direction)
        .with_context(|| format!("Invalid parameter in adjustment '{arg}'"))
}

/// Build a session and replay the requested adjustments through it.
pub fn build_session(args: &SessionArgs) -> Result<Session> {
    let changes = args
        .adjustments
        .iter()
        .map(|arg| parse_adjustment(arg))
        .collect::<Result<Vec<_>>>()?;

    let config = load_config(args.config.as_ref())?;
    let session = Session::new(config).context("Failed to solve the initial parameters")?;

    for change in changes {
        let outcome = session
            .on_parameter_change(change)
            .with_context(|| format!("Failed to apply {} {}", change.direction, change.name))?;
        if let ChangeOutcome::Unchanged { value } = outcome {
            info!("{} is already at its floor ({value})", change.name);
        }
    }

    Ok(session)
}
