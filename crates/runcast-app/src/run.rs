// One full run: load tables, project the slate, write outputs.

use crate::tables;
use anyhow::Context;
use runcast_core::Config;
use runcast_engine::{project_slate, SlateProjection};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct RunOutcome {
    pub projection: SlateProjection,
    pub outputs: Vec<PathBuf>,
}

/// Output directory for `config`, resolved against `base_dir`.
pub fn output_dir(config: &Config, base_dir: &Path) -> PathBuf {
    base_dir.join(&config.output.dir)
}

/// Run the pipeline. Nothing is written unless every step succeeds.
pub fn run_slate(config: &Config, base_dir: &Path) -> anyhow::Result<RunOutcome> {
    let inputs = tables::load_slate(config, base_dir).context("failed to load input tables")?;

    let projection = project_slate(&inputs, &config.engine).context("projection failed")?;
    if !projection.diagnostics.is_empty() {
        info!(
            "{} fallback(s) applied; see run summary",
            projection.diagnostics.len()
        );
    }

    let outputs = tables::write_outputs(&output_dir(config, base_dir), &projection)
        .context("failed to write output tables")?;

    Ok(RunOutcome {
        projection,
        outputs,
    })
}
