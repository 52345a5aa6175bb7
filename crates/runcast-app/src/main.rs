// runcast entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, RUST_LOG)
// 2. Resolve the base directory (first argument or cwd)
// 3. Load config, copying defaults on first run
// 4. Run the slate
// 5. Write run_summary.json (on failure too)

use runcast_app::run;
use runcast_app::summary::{self, RunSummary};
use runcast_core::config;

use anyhow::Context;
use std::path::PathBuf;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Base directory
    let base_dir = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    info!("runcast starting in {}", base_dir.display());

    // 3. Load config
    let config = config::load_config_in(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: {} team aliases, output to {}",
        config.team_aliases.len(),
        config.output.dir
    );
    let output_dir = run::output_dir(&config, &base_dir);

    // 4. Run
    let result = run::run_slate(&config, &base_dir);

    // 5. Summary
    let summary = match &result {
        Ok(outcome) => RunSummary::success(&outcome.projection, &outcome.outputs),
        Err(e) => {
            error!("run failed: {e:#}");
            RunSummary::failure(e)
        }
    };
    let summary_path =
        summary::write_summary(&output_dir, &summary).context("failed to write run summary")?;
    info!("run summary written to {}", summary_path.display());

    let outcome = result?;
    info!(
        "projected {} batters and {} pitchers across {} games",
        outcome.projection.batters.len(),
        outcome.projection.pitchers.len(),
        outcome.projection.game_totals.len()
    );
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("runcast=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
