// Configuration loading and parsing (config/runcast.toml).

use crate::ids::TeamId;
use crate::model::Outcome;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the single config file inside `config/` and `defaults/`.
pub const CONFIG_FILE_NAME: &str = "runcast.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub team_aliases: TeamAliases,
    pub data_paths: DataPaths,
    pub output: OutputConfig,
}

/// The only configuration the projection engine sees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub linear_weights: LinearWeights,
    pub environment: EnvironmentRange,
}

// ---------------------------------------------------------------------------
// runcast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire runcast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    linear_weights: LinearWeights,
    #[serde(default)]
    environment: EnvironmentRange,
    #[serde(default)]
    team_aliases: HashMap<String, String>,
    data_paths: DataPaths,
    output: OutputConfig,
}

/// Average run value of each plate-appearance outcome. Strikeouts and outs
/// are worth zero and have no entry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LinearWeights {
    pub walk: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub home_run: f64,
}

impl LinearWeights {
    pub fn weight(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Strikeout => 0.0,
            Outcome::Walk => self.walk,
            Outcome::Single => self.single,
            Outcome::Double => self.double,
            Outcome::Triple => self.triple,
            Outcome::HomeRun => self.home_run,
        }
    }
}

impl Default for LinearWeights {
    fn default() -> Self {
        LinearWeights {
            walk: 0.33,
            single: 0.47,
            double: 0.77,
            triple: 1.04,
            home_run: 1.40,
        }
    }
}

/// Practical range of environment factors. Values outside are flagged, not
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EnvironmentRange {
    pub min_factor: f64,
    pub max_factor: f64,
}

impl EnvironmentRange {
    pub fn contains(&self, factor: f64) -> bool {
        (self.min_factor..=self.max_factor).contains(&factor)
    }
}

impl Default for EnvironmentRange {
    fn default() -> Self {
        EnvironmentRange {
            min_factor: 0.5,
            max_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub season_batters: String,
    pub season_pitchers: String,
    pub daily_batters: String,
    pub daily_pitchers: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

/// Alias -> canonical team id lookup, applied once at the input boundary.
/// Matching is exact after trimming; unknown names pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct TeamAliases {
    aliases: HashMap<String, TeamId>,
}

impl TeamAliases {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        TeamAliases {
            aliases: aliases
                .into_iter()
                .map(|(alias, canonical)| (alias.trim().to_string(), TeamId::new(canonical)))
                .collect(),
        }
    }

    pub fn resolve(&self, raw: &str) -> TeamId {
        match self.aliases.get(raw.trim()) {
            Some(canonical) => canonical.clone(),
            None => TeamId::new(raw),
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/runcast.toml` relative to
/// `base_dir`. Does not copy defaults; see [`load_config_in`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE_NAME);
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        engine: EngineConfig {
            linear_weights: file.linear_weights,
            environment: file.environment,
        },
        team_aliases: TeamAliases::new(file.team_aliases),
        data_paths: file.data_paths,
        output: file.output,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Copy missing defaults into `base_dir/config` and load the result.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let w = &config.engine.linear_weights;
    let weight_fields: &[(&str, f64)] = &[
        ("linear_weights.walk", w.walk),
        ("linear_weights.single", w.single),
        ("linear_weights.double", w.double),
        ("linear_weights.triple", w.triple),
        ("linear_weights.home_run", w.home_run),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a finite value >= 0, got {val}"),
            });
        }
    }

    let env = &config.engine.environment;
    if !(env.min_factor.is_finite() && env.min_factor > 0.0) {
        return Err(ConfigError::ValidationError {
            field: "environment.min_factor".into(),
            message: format!("must be > 0, got {}", env.min_factor),
        });
    }
    if !(env.max_factor.is_finite() && env.max_factor > env.min_factor) {
        return Err(ConfigError::ValidationError {
            field: "environment.max_factor".into(),
            message: format!(
                "must be greater than min_factor ({}), got {}",
                env.min_factor, env.max_factor
            ),
        });
    }

    let paths = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data_paths.season_batters", &paths.season_batters),
        ("data_paths.season_pitchers", &paths.season_pitchers),
        ("data_paths.daily_batters", &paths.daily_batters),
        ("data_paths.daily_pitchers", &paths.daily_pitchers),
        ("output.dir", &config.output.dir),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    for (alias, canonical) in &config.team_aliases.aliases {
        if alias.is_empty() || canonical.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "team_aliases".into(),
                message: format!("alias and team id must be non-empty (got `{alias}` = `{canonical}`)"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
