use fogfour_bot::SearchConfig;
use fogfour_core::belief::OpponentModel;
use fogfour_core::model::player::Player;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const MAX_SEARCH_DEPTH: usize = 6;
const MAX_PRUNE_THRESHOLD: f64 = 0.5;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub games: GamesConfig,
    #[serde(default)]
    pub opponent: OpponentConfig,
    #[serde(default)]
    pub search: SearchOverrides,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        self.search.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Game scheduling block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    pub count: usize,
    pub seed: Option<u64>,
    #[serde(default)]
    pub agent_first: FirstMover,
}

impl GamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::InvalidField {
                field: "games.count".to_string(),
                message: "number of games must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Who opens each game.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FirstMover {
    Agent,
    Opponent,
    #[default]
    Alternate,
}

impl FirstMover {
    pub fn for_game(self, game_index: usize) -> Player {
        match self {
            FirstMover::Agent => Player::Agent,
            FirstMover::Opponent => Player::Opponent,
            FirstMover::Alternate if game_index % 2 == 0 => Player::Agent,
            FirstMover::Alternate => Player::Opponent,
        }
    }
}

/// Behaviour of the simulated opponent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OpponentConfig {
    #[serde(default)]
    pub kind: OpponentKind,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    /// Samples from the same heuristic model the agent predicts with.
    #[default]
    Model,
    Uniform,
}

impl OpponentKind {
    pub fn model(self) -> OpponentModel {
        match self {
            OpponentKind::Model => OpponentModel::heuristic(),
            OpponentKind::Uniform => OpponentModel::Uniform,
        }
    }
}

/// Optional search settings layered over `FOG_SEARCH_*` environment defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchOverrides {
    pub shallow_depth: Option<usize>,
    pub deep_depth: Option<usize>,
    pub deep_after: Option<u64>,
    pub prune_threshold: Option<f64>,
    pub time_cap_ms: Option<u64>,
}

impl SearchOverrides {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, depth) in [
            ("search.shallow_depth", self.shallow_depth),
            ("search.deep_depth", self.deep_depth),
        ] {
            if let Some(depth) = depth {
                if depth == 0 || depth > MAX_SEARCH_DEPTH {
                    return Err(ValidationError::InvalidField {
                        field: label.to_string(),
                        message: format!("depth must be between 1 and {MAX_SEARCH_DEPTH}"),
                    });
                }
            }
        }

        if let (Some(shallow), Some(deep)) = (self.shallow_depth, self.deep_depth) {
            if deep < shallow {
                return Err(ValidationError::InvalidField {
                    field: "search.deep_depth".to_string(),
                    message: "deep depth must not be below shallow depth".to_string(),
                });
            }
        }

        if let Some(threshold) = self.prune_threshold {
            if !threshold.is_finite() || !(0.0..=MAX_PRUNE_THRESHOLD).contains(&threshold) {
                return Err(ValidationError::InvalidField {
                    field: "search.prune_threshold".to_string(),
                    message: format!("threshold must be within [0, {MAX_PRUNE_THRESHOLD}]"),
                });
            }
        }

        Ok(())
    }

    /// Applies every set override on top of `base`.
    pub fn apply(&self, base: SearchConfig) -> SearchConfig {
        let shallow_depth = self.shallow_depth.unwrap_or(base.shallow_depth);
        SearchConfig {
            shallow_depth,
            deep_depth: self.deep_depth.unwrap_or(base.deep_depth).max(shallow_depth),
            deep_after: self.deep_after.unwrap_or(base.deep_after),
            prune_threshold: self.prune_threshold.unwrap_or(base.prune_threshold),
            time_cap_ms: self.time_cap_ms.unwrap_or(base.time_cap_ms),
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
