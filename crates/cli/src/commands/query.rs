use anyhow::{Context, Result};
use log::debug;

use crate::args::SessionArgs;
use crate::printing::print_snapshot;
use crate::utils::build_session;

pub fn show_snapshot(args: &SessionArgs, time: f64, snap: bool) -> Result<()> {
    let session = build_session(args)?;

    let time = if snap {
        let snapped = session.grid().snap(time);
        debug!("Snapped {time} to grid time {snapped}");
        snapped
    } else {
        time
    };

    let outputs = session
        .on_time_query(time)
        .with_context(|| format!("Cannot query time {time} (use --snap for off-grid times)"))?;
    print_snapshot(&outputs);

    Ok(())
}
