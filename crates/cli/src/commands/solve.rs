use anyhow::{Context, Result};
use log::info;
use serde_json::json;
use std::path::PathBuf;
use stemflow_sim::base::Trajectory;
use stemflow_sim::simulation::ParameterVector;

use crate::args::{ExportFormat, SessionArgs};
use crate::utils::build_session;

pub fn export_trajectory(
    args: &SessionArgs,
    format: ExportFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let session = build_session(args)?;
    let entry = session.current()?;
    info!(
        "Exporting revision {} ({} samples)",
        entry.revision(),
        entry.trajectory().len()
    );

    let content = match format {
        ExportFormat::Csv => trajectory_csv(entry.trajectory()),
        ExportFormat::Json => {
            let outputs = session.parameter_outputs();
            serde_json::to_string_pretty(&json!({
                "revision": entry.revision(),
                "seed": session.seed(),
                "parameters": parameter_map(entry.parameters()),
                "displays": outputs.displays,
                "y_axis_max": outputs.y_axis_max,
                "trajectory": entry.trajectory().as_ref(),
            }))?
        }
    };

    if let Some(path) = output {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ Trajectory exported to: {}", path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}

fn trajectory_csv(trajectory: &Trajectory) -> String {
    let mut csv = String::from("time,stem,progenitor,differentiated\n");
    for (time, state) in trajectory.iter() {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            time, state.stem, state.progenitor, state.differentiated
        ));
    }
    csv
}

fn parameter_map(parameters: &ParameterVector) -> serde_json::Map<String, serde_json::Value> {
    parameters
        .iter()
        .map(|(name, value)| (name.id().to_string(), json!(value)))
        .collect()
}
