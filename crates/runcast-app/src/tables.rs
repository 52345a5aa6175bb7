// Input/output tables.
//
// Each input table has a declared schema. Headers are mapped to canonical
// column names once per table (aliases rewritten, extras ignored, every
// missing required column reported together), then rows are deserialized
// into private raw structs and validated into the core records. Outputs are
// staged as temp files and renamed into place only after every table has
// been written.

use runcast_core::config::{Config, TeamAliases};
use runcast_core::{
    DailyAssignment, EnvironmentFactor, GameId, PlayerId, PlayerSeasonProfile,
};
use runcast_engine::{
    BatterProjection, GameTotal, PitcherProjection, SlateInputs, SlateProjection,
    TeamGameProjection,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {table}: {source}")]
    Csv {
        table: &'static str,
        source: csv::Error,
    },

    #[error("{table} is missing required column(s): {}", missing.join(", "))]
    Schema {
        table: &'static str,
        missing: Vec<String>,
    },

    #[error("{table} line {line}, column `{column}`: {message}")]
    InvalidValue {
        table: &'static str,
        line: u64,
        column: String,
        message: String,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TableError + '_ {
    move |source| TableError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

/// The four input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    SeasonBatters,
    SeasonPitchers,
    DailyBatters,
    DailyPitchers,
}

struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

const fn required(name: &'static str, aliases: &'static [&'static str]) -> Column {
    Column {
        name,
        aliases,
        required: true,
    }
}

const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Column {
    Column {
        name,
        aliases,
        required: false,
    }
}

const SEASON_COLUMNS: &[Column] = &[
    required("player_id", &[]),
    required("pa", &[]),
    required("strikeout", &[]),
    required("walk", &[]),
    required("single", &[]),
    required("double", &[]),
    required("triple", &[]),
    required("home_run", &[]),
];

const DAILY_BATTER_COLUMNS: &[Column] = &[
    required("player_id", &[]),
    required("game_id", &[]),
    required("team_id", &[]),
    required("opponent_team_id", &["opp_team_id"]),
    required("projected_pa", &["proj_pa_used"]),
    optional("env_factor", &["adj_woba_combined"]),
];

const DAILY_PITCHER_COLUMNS: &[Column] = &[
    required("player_id", &[]),
    required("game_id", &[]),
    required("team_id", &[]),
    required("opponent_team_id", &["opp_team_id"]),
    required("pa", &["projected_pa"]),
];

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::SeasonBatters => "season_batters",
            Table::SeasonPitchers => "season_pitchers",
            Table::DailyBatters => "daily_batters",
            Table::DailyPitchers => "daily_pitchers",
        }
    }

    fn columns(self) -> &'static [Column] {
        match self {
            Table::SeasonBatters | Table::SeasonPitchers => SEASON_COLUMNS,
            Table::DailyBatters => DAILY_BATTER_COLUMNS,
            Table::DailyPitchers => DAILY_PITCHER_COLUMNS,
        }
    }
}

/// Rewrite `headers` to canonical column names.
///
/// For each column the canonical name wins over an alias, and the first
/// alias present wins over later ones. Headers that map to nothing keep
/// their original text and are ignored downstream.
pub fn map_headers(table: Table, headers: &csv::StringRecord) -> Result<csv::StringRecord, TableError> {
    let trimmed: Vec<&str> = headers.iter().map(str::trim).collect();
    let mut mapped: Vec<String> = trimmed.iter().map(|h| h.to_string()).collect();
    let mut missing = Vec::new();

    for column in table.columns() {
        let position = trimmed.iter().position(|h| *h == column.name).or_else(|| {
            column
                .aliases
                .iter()
                .find_map(|alias| trimmed.iter().position(|h| h == alias))
        });
        match position {
            Some(i) => {
                if trimmed[i] != column.name {
                    debug!("{}: reading column `{}` as `{}`", table.name(), trimmed[i], column.name);
                }
                mapped[i] = column.name.to_string();
            }
            None if column.required => missing.push(column.name.to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(TableError::Schema {
            table: table.name(),
            missing,
        });
    }
    Ok(csv::StringRecord::from(mapped))
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Counts are read as f64 because upstream tables may carry them as
/// decimals (e.g. `600.0`).
#[derive(Debug, Deserialize)]
struct RawSeasonRow {
    player_id: String,
    pa: f64,
    strikeout: f64,
    walk: f64,
    single: f64,
    double: f64,
    triple: f64,
    home_run: f64,
}

#[derive(Debug, Deserialize)]
struct RawDailyBatter {
    player_id: String,
    game_id: String,
    team_id: String,
    opponent_team_id: String,
    projected_pa: f64,
    /// Empty cell or absent column: no factor for this row.
    #[serde(default)]
    env_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDailyPitcher {
    player_id: String,
    game_id: String,
    team_id: String,
    opponent_team_id: String,
    pa: f64,
}

// ---------------------------------------------------------------------------
// Row validation
// ---------------------------------------------------------------------------

/// Location of one row, used to build `InvalidValue` errors.
#[derive(Clone, Copy)]
struct Row {
    table: &'static str,
    line: u64,
}

impl Row {
    fn invalid(self, column: &str, message: impl Into<String>) -> TableError {
        TableError::InvalidValue {
            table: self.table,
            line: self.line,
            column: column.to_string(),
            message: message.into(),
        }
    }

    fn non_negative(self, column: &str, value: f64) -> Result<f64, TableError> {
        if !value.is_finite() {
            return Err(self.invalid(column, format!("non-finite value {value}")));
        }
        if value < 0.0 {
            return Err(self.invalid(column, format!("negative value {value}")));
        }
        Ok(value)
    }

    fn count(self, column: &str, value: f64) -> Result<u32, TableError> {
        let value = self.non_negative(column, value)?;
        if value > f64::from(u32::MAX) {
            return Err(self.invalid(column, format!("count {value} is too large")));
        }
        Ok(value.round() as u32)
    }

    fn id(self, column: &str, raw: &str) -> Result<String, TableError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(self.invalid(column, "empty identifier"));
        }
        Ok(id.to_string())
    }
}

fn season_profile(row: Row, raw: RawSeasonRow) -> Result<PlayerSeasonProfile, TableError> {
    let profile = PlayerSeasonProfile {
        player_id: PlayerId::new(row.id("player_id", &raw.player_id)?),
        pa: row.count("pa", raw.pa)?,
        strikeout: row.count("strikeout", raw.strikeout)?,
        walk: row.count("walk", raw.walk)?,
        single: row.count("single", raw.single)?,
        double: row.count("double", raw.double)?,
        triple: row.count("triple", raw.triple)?,
        home_run: row.count("home_run", raw.home_run)?,
    };
    for outcome in runcast_core::Outcome::ALL {
        let count = profile.count(outcome);
        if count > profile.pa {
            return Err(row.invalid(
                outcome.label(),
                format!("count {count} exceeds pa {}", profile.pa),
            ));
        }
    }
    Ok(profile)
}

// ---------------------------------------------------------------------------
// Reader-based loaders (testable without files)
// ---------------------------------------------------------------------------

/// Map headers, then deserialize and convert every row. The first bad row
/// aborts the table.
fn read_table<R, T, U>(
    table: Table,
    rdr: R,
    mut convert: impl FnMut(Row, T) -> Result<U, TableError>,
) -> Result<Vec<U>, TableError>
where
    R: Read,
    T: DeserializeOwned,
{
    let name = table.name();
    let csv_error = |source: csv::Error| TableError::Csv { table: name, source };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let headers = map_headers(table, reader.headers().map_err(csv_error)?)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let row = Row {
            table: name,
            line: record.position().map_or(0, |p| p.line()),
        };
        let raw: T = record.deserialize(Some(&headers)).map_err(|e| {
            let column = match e.kind() {
                csv::ErrorKind::Deserialize { err, .. } => err
                    .field()
                    .and_then(|i| headers.get(i as usize))
                    .unwrap_or("?")
                    .to_string(),
                _ => "?".to_string(),
            };
            TableError::InvalidValue {
                table: name,
                line: row.line,
                column,
                message: e.to_string(),
            }
        })?;
        rows.push(convert(row, raw)?);
    }
    Ok(rows)
}

fn season_from_reader<R: Read>(table: Table, rdr: R) -> Result<Vec<PlayerSeasonProfile>, TableError> {
    read_table(table, rdr, season_profile)
}

fn daily_batters_from_reader<R: Read>(
    rdr: R,
    aliases: &TeamAliases,
) -> Result<(Vec<DailyAssignment>, Vec<EnvironmentFactor>), TableError> {
    let rows = read_table(Table::DailyBatters, rdr, |row, raw: RawDailyBatter| {
        let assignment = DailyAssignment {
            player_id: PlayerId::new(row.id("player_id", &raw.player_id)?),
            game_id: GameId::new(row.id("game_id", &raw.game_id)?),
            team_id: aliases.resolve(&row.id("team_id", &raw.team_id)?),
            opponent_team_id: aliases.resolve(&row.id("opponent_team_id", &raw.opponent_team_id)?),
            projected_pa: row.non_negative("projected_pa", raw.projected_pa)?,
        };
        let factor = raw
            .env_factor
            .map(|f| row.non_negative("env_factor", f))
            .transpose()?;
        Ok((assignment, factor))
    })?;

    let mut assignments = Vec::with_capacity(rows.len());
    let mut environment = Vec::with_capacity(rows.len());
    for (assignment, factor) in rows {
        if let Some(factor) = factor {
            environment.push(EnvironmentFactor {
                player_id: assignment.player_id.clone(),
                game_id: assignment.game_id.clone(),
                factor,
            });
        }
        assignments.push(assignment);
    }
    Ok((assignments, environment))
}

fn daily_pitchers_from_reader<R: Read>(
    rdr: R,
    aliases: &TeamAliases,
) -> Result<Vec<DailyAssignment>, TableError> {
    read_table(Table::DailyPitchers, rdr, |row, raw: RawDailyPitcher| {
        Ok(DailyAssignment {
            player_id: PlayerId::new(row.id("player_id", &raw.player_id)?),
            game_id: GameId::new(row.id("game_id", &raw.game_id)?),
            team_id: aliases.resolve(&row.id("team_id", &raw.team_id)?),
            opponent_team_id: aliases.resolve(&row.id("opponent_team_id", &raw.opponent_team_id)?),
            projected_pa: row.non_negative("pa", raw.pa)?,
        })
    })
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<File, TableError> {
    File::open(path).map_err(io_error(path))
}

/// Load all four input tables. Relative paths in the config resolve against
/// `base_dir`.
pub fn load_slate(config: &Config, base_dir: &Path) -> Result<SlateInputs, TableError> {
    let paths = &config.data_paths;
    let aliases = &config.team_aliases;

    let season_batters = season_from_reader(
        Table::SeasonBatters,
        open(&base_dir.join(&paths.season_batters))?,
    )?;
    let season_pitchers = season_from_reader(
        Table::SeasonPitchers,
        open(&base_dir.join(&paths.season_pitchers))?,
    )?;
    let (daily_batters, environment) =
        daily_batters_from_reader(open(&base_dir.join(&paths.daily_batters))?, aliases)?;
    let daily_pitchers =
        daily_pitchers_from_reader(open(&base_dir.join(&paths.daily_pitchers))?, aliases)?;

    info!(
        "loaded {} season batters, {} season pitchers, {} daily batters ({} with env factor), {} daily pitchers",
        season_batters.len(),
        season_pitchers.len(),
        daily_batters.len(),
        environment.len(),
        daily_pitchers.len()
    );

    Ok(SlateInputs {
        season_batters,
        season_pitchers,
        daily_batters,
        daily_pitchers,
        environment,
    })
}

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

pub const BATTER_OUTPUT: &str = "batter_event_projections.csv";
pub const PITCHER_OUTPUT: &str = "pitcher_event_projections.csv";
pub const TEAM_OUTPUT: &str = "game_score_projections.csv";
pub const GAME_OUTPUT: &str = "game_total_projections.csv";

const BATTER_HEADERS: &[&str] = &[
    "player_id", "game_id", "team_id", "p_k", "p_bb", "p_1b", "p_2b", "p_3b", "p_hr", "p_out",
    "runs_per_pa", "expected_runs",
];
const PITCHER_HEADERS: &[&str] = &[
    "player_id",
    "game_id",
    "team_id",
    "opponent_team_id",
    "p_k_vs",
    "p_bb_vs",
    "p_1b_vs",
    "p_2b_vs",
    "p_3b_vs",
    "p_hr_vs",
    "p_out_vs",
    "runs_per_pa_allowed",
    "expected_runs_allowed",
];
const TEAM_HEADERS: &[&str] = &["game_id", "team_id", "expected_runs"];
const GAME_HEADERS: &[&str] = &["game_id", "expected_runs"];

#[derive(Serialize)]
struct BatterRow<'a> {
    player_id: &'a str,
    game_id: &'a str,
    team_id: &'a str,
    p_k: f64,
    p_bb: f64,
    p_1b: f64,
    p_2b: f64,
    p_3b: f64,
    p_hr: f64,
    p_out: f64,
    runs_per_pa: f64,
    expected_runs: f64,
}

impl<'a> From<&'a BatterProjection> for BatterRow<'a> {
    fn from(b: &'a BatterProjection) -> Self {
        let p = &b.probabilities;
        BatterRow {
            player_id: b.player_id.as_str(),
            game_id: b.game_id.as_str(),
            team_id: b.team_id.as_str(),
            p_k: p.k,
            p_bb: p.bb,
            p_1b: p.single,
            p_2b: p.double,
            p_3b: p.triple,
            p_hr: p.hr,
            p_out: p.out,
            runs_per_pa: b.run_value.runs_per_pa,
            expected_runs: b.run_value.expected_runs,
        }
    }
}

#[derive(Serialize)]
struct PitcherRow<'a> {
    player_id: &'a str,
    game_id: &'a str,
    team_id: &'a str,
    opponent_team_id: &'a str,
    p_k_vs: f64,
    p_bb_vs: f64,
    p_1b_vs: f64,
    p_2b_vs: f64,
    p_3b_vs: f64,
    p_hr_vs: f64,
    p_out_vs: f64,
    runs_per_pa_allowed: f64,
    expected_runs_allowed: f64,
}

impl<'a> From<&'a PitcherProjection> for PitcherRow<'a> {
    fn from(p: &'a PitcherProjection) -> Self {
        let probs = &p.probabilities;
        PitcherRow {
            player_id: p.player_id.as_str(),
            game_id: p.game_id.as_str(),
            team_id: p.team_id.as_str(),
            opponent_team_id: p.opponent_team_id.as_str(),
            p_k_vs: probs.k,
            p_bb_vs: probs.bb,
            p_1b_vs: probs.single,
            p_2b_vs: probs.double,
            p_3b_vs: probs.triple,
            p_hr_vs: probs.hr,
            p_out_vs: probs.out,
            runs_per_pa_allowed: p.run_value.runs_per_pa,
            expected_runs_allowed: p.run_value.expected_runs,
        }
    }
}

#[derive(Serialize)]
struct TeamRow<'a> {
    game_id: &'a str,
    team_id: &'a str,
    expected_runs: f64,
}

impl<'a> From<&'a TeamGameProjection> for TeamRow<'a> {
    fn from(t: &'a TeamGameProjection) -> Self {
        TeamRow {
            game_id: t.game_id.as_str(),
            team_id: t.team_id.as_str(),
            expected_runs: t.expected_runs,
        }
    }
}

#[derive(Serialize)]
struct GameRow<'a> {
    game_id: &'a str,
    expected_runs: f64,
}

impl<'a> From<&'a GameTotal> for GameRow<'a> {
    fn from(g: &'a GameTotal) -> Self {
        GameRow {
            game_id: g.game_id.as_str(),
            expected_runs: g.expected_runs,
        }
    }
}

/// A fully written temp file waiting to be renamed into place.
struct Staged {
    temp: PathBuf,
    target: PathBuf,
}

fn write_csv<S: Serialize>(
    path: &Path,
    name: &'static str,
    headers: &[&str],
    rows: impl IntoIterator<Item = S>,
) -> Result<(), TableError> {
    let csv_error = |source: csv::Error| TableError::Csv { table: name, source };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(headers).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error(path))
}

/// Write `rows` to a temp file next to `dir/name`. The header row is always
/// written, so an empty table still carries its schema.
fn stage<S: Serialize>(
    dir: &Path,
    name: &'static str,
    headers: &[&str],
    rows: impl IntoIterator<Item = S>,
) -> Result<Staged, TableError> {
    let target = dir.join(name);
    let temp = dir.join(format!(".{name}.tmp"));
    match write_csv(&temp, name, headers, rows) {
        Ok(()) => Ok(Staged { temp, target }),
        Err(e) => {
            let _ = std::fs::remove_file(&temp);
            Err(e)
        }
    }
}

fn stage_all(
    dir: &Path,
    projection: &SlateProjection,
    staged: &mut Vec<Staged>,
) -> Result<(), TableError> {
    staged.push(stage(
        dir,
        BATTER_OUTPUT,
        BATTER_HEADERS,
        projection.batters.iter().map(BatterRow::from),
    )?);
    staged.push(stage(
        dir,
        PITCHER_OUTPUT,
        PITCHER_HEADERS,
        projection.pitchers.iter().map(PitcherRow::from),
    )?);
    staged.push(stage(
        dir,
        TEAM_OUTPUT,
        TEAM_HEADERS,
        projection.team_scores.iter().map(TeamRow::from),
    )?);
    staged.push(stage(
        dir,
        GAME_OUTPUT,
        GAME_HEADERS,
        projection.game_totals.iter().map(GameRow::from),
    )?);
    Ok(())
}

fn discard(staged: &[Staged]) {
    for s in staged {
        let _ = std::fs::remove_file(&s.temp);
    }
}

/// Rename staged files into place, in order. If a rename fails, the tables
/// already renamed stay replaced and the remaining temp files are removed.
fn commit(staged: Vec<Staged>) -> Result<Vec<PathBuf>, TableError> {
    let mut written = Vec::with_capacity(staged.len());
    for (i, s) in staged.iter().enumerate() {
        if let Err(source) = std::fs::rename(&s.temp, &s.target) {
            discard(&staged[i..]);
            return Err(io_error(&s.target)(source));
        }
        written.push(s.target.clone());
    }
    Ok(written)
}

/// Write the output tables into `dir`. Existing outputs are only replaced
/// once every table has been serialized; if serializing fails the temp files
/// are removed and the previous outputs stay untouched. Each file is
/// replaced atomically, but a rename failure can leave a mix of new and old
/// tables.
pub fn write_outputs(
    dir: &Path,
    projection: &SlateProjection,
) -> Result<Vec<PathBuf>, TableError> {
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;

    let mut staged = Vec::new();
    if let Err(e) = stage_all(dir, projection, &mut staged) {
        discard(&staged);
        return Err(e);
    }

    let written = commit(staged)?;
    info!("wrote {} output tables to {}", written.len(), dir.display());
    Ok(written)
}
