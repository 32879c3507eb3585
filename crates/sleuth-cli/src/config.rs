use serde::Deserialize;
use sleuth_core::error::SetupError;
use sleuth_core::game::setup::{ContradictionPolicy, DeductionMode, TableSetup, resolve_slugs};
use sleuth_core::model::card::{CardSpec, Category};
use sleuth_core::model::deck::CardUniverse;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const SLUG_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyz0123456789_-";
const DEFAULT_LOG_FILE: &str = "sleuth.log.jsonl";

/// Table description loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    pub players: Vec<String>,
    pub observer: String,
    #[serde(default)]
    pub hand: Vec<String>,
    #[serde(default)]
    pub mode: DeductionMode,
    #[serde(default)]
    pub contradictions: ContradictionPolicy,
    #[serde(default)]
    pub deck: Option<DeckConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TableConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: TableConfig =
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
        validate_players(&mut self.players)?;
        self.observer = self.observer.trim().to_string();
        if !self.players.contains(&self.observer) {
            return Err(invalid(
                "observer",
                format!("observer '{}' is not one of the players", self.observer),
            ));
        }
        if let Some(deck) = self.deck.as_ref() {
            deck.validate()?;
        }
        self.logging.normalize()?;
        self.to_setup().map(|_| ()).map_err(setup_field)
    }

    pub fn universe(&self) -> Result<CardUniverse, SetupError> {
        match self.deck.as_ref() {
            Some(deck) => Ok(deck.universe()?),
            None => Ok(CardUniverse::classic()),
        }
    }

    /// Builds the core setup this configuration describes.
    pub fn to_setup(&self) -> Result<TableSetup, SetupError> {
        let universe = self.universe()?;
        let hand: Vec<&str> = self.hand.iter().map(String::as_str).collect();
        let hand = resolve_slugs(&universe, &hand)?;
        Ok(
            TableSetup::new(universe, &self.players, &self.observer, &hand)?
                .with_mode(self.mode)
                .with_policy(self.contradictions),
        )
    }
}

/// Custom card lists; each entry is a slug.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeckConfig {
    pub suspects: Vec<String>,
    pub weapons: Vec<String>,
    pub rooms: Vec<String>,
}

impl DeckConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, cards) in [
            ("deck.suspects", &self.suspects),
            ("deck.weapons", &self.weapons),
            ("deck.rooms", &self.rooms),
        ] {
            if cards.is_empty() {
                return Err(invalid(label, "at least one card is required"));
            }
            if let Some(bad) = cards
                .iter()
                .find(|slug| slug.is_empty() || !slug.chars().all(|c| SLUG_ALLOWED.contains(c)))
            {
                return Err(invalid(
                    label,
                    format!("'{bad}' must be lowercase letters, digits, '_' or '-'"),
                ));
            }
        }
        Ok(())
    }

    fn universe(&self) -> Result<CardUniverse, sleuth_core::model::deck::DeckError> {
        let specs = |slugs: &[String], category: Category| -> Vec<CardSpec> {
            slugs
                .iter()
                .map(|slug| CardSpec::new(slug.as_str(), label_for(slug), category))
                .collect()
        };
        CardUniverse::custom(
            specs(&self.suspects, Category::Suspect),
            specs(&self.weapons, Category::Weapon),
            specs(&self.rooms, Category::Room),
        )
    }
}

/// `lead_pipe` -> `Lead Pipe`.
fn label_for(slug: &str) -> String {
    slug.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Logging defaults to human-readable output on stderr.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            log_file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) -> Result<(), ValidationError> {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.level().is_none() {
            return Err(invalid(
                "logging.tracing_level",
                format!("unknown level '{}'", self.tracing_level),
            ));
        }
        if self.enable_structured && self.log_file.as_os_str().is_empty() {
            return Err(invalid(
                "logging.log_file",
                "structured logging needs a file path",
            ));
        }
        Ok(())
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
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
    "warn".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn validate_players(players: &mut [String]) -> Result<(), ValidationError> {
    if players.len() < 2 {
        return Err(invalid("players", "at least two players are required"));
    }
    let mut seen = HashSet::new();
    for (index, name) in players.iter_mut().enumerate() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(invalid(
                format!("players[{index}]"),
                "player name must not be empty",
            ));
        }
        if !seen.insert(name.clone()) {
            return Err(invalid(
                "players",
                format!("player '{name}' is listed more than once"),
            ));
        }
    }
    Ok(())
}

fn setup_field(err: SetupError) -> ValidationError {
    let field = match &err {
        SetupError::Deck(_) => "deck",
        SetupError::Roster(_) => "players",
        SetupError::UnknownHandCard(_)
        | SetupError::HandTooLarge { .. }
        | SetupError::DuplicateHandCard(_) => "hand",
        SetupError::UnsupportedVersion(_) | SetupError::Inconsistent(_) => "table",
    };
    invalid(field, err.to_string())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.into(),
        message: message.into(),
    }
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
