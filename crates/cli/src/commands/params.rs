use anyhow::{Context, Result};
use std::path::PathBuf;
use stemflow_sim::simulation::ParameterStore;

use crate::printing::print_parameters;
use crate::utils::load_config;

pub fn show_parameters(config: Option<&PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let store =
        ParameterStore::from_specs(&config.parameters).context("Invalid parameter set")?;
    print_parameters(&store);
    Ok(())
}
