use anyhow::{Context, Result};
use std::path::PathBuf;
use stemflow_sim::simulation::EngineConfig;

pub fn write_default_config(output: Option<&PathBuf>) -> Result<()> {
    let content = EngineConfig::default()
        .to_json_string()
        .context("Failed to serialize configuration")?;

    if let Some(path) = output {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ Configuration written to: {}", path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}
