// Machine-readable status of the last run (run_summary.json).

use chrono::{DateTime, Utc};
use runcast_core::Diagnostic;
use runcast_engine::SlateProjection;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "run_summary.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Ok,
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub batters: usize,
    pub pitchers: usize,
    pub team_scores: usize,
    pub game_totals: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub finished_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub rows: RowCounts,
    pub outputs: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    pub fn success(projection: &SlateProjection, outputs: &[PathBuf]) -> Self {
        RunSummary {
            status: RunStatus::Ok,
            finished_at: Utc::now(),
            error: None,
            rows: RowCounts {
                batters: projection.batters.len(),
                pitchers: projection.pitchers.len(),
                team_scores: projection.team_scores.len(),
                game_totals: projection.game_totals.len(),
            },
            outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
            diagnostics: projection.diagnostics.clone(),
        }
    }

    /// A failed run writes no tables, so counts and outputs are empty.
    pub fn failure(error: &anyhow::Error) -> Self {
        RunSummary {
            status: RunStatus::Fail,
            finished_at: Utc::now(),
            error: Some(format!("{error:#}")),
            rows: RowCounts::default(),
            outputs: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// Write `summary` as pretty JSON into `dir`, replacing any previous one.
pub fn write_summary(dir: &Path, summary: &RunSummary) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(SUMMARY_FILE);
    let temp = dir.join(format!(".{SUMMARY_FILE}.tmp"));
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&temp, json)?;
    std::fs::rename(&temp, &target)?;
    Ok(target)
}
