//! Configuration loading and typed config structures for an encounter.
//!
//! The canonical configuration lives in `skirmish-config.yaml` at the
//! project root. Every field has a default, so an empty document yields a
//! playable (if empty) encounter.
//!
//! The `SKIRMISH_SEED` environment variable overrides `encounter.seed`.

use std::path::Path;

use serde::Deserialize;
use skirmish_grid::geometry::{DEFAULT_BODY, DEFAULT_HEIGHT, DEFAULT_WING};
use skirmish_grid::navigator::{DEFAULT_SEARCH_LIMIT, DEFAULT_STEP_COST};
use skirmish_grid::{Geometry, GridError};
use tracing::warn;

use crate::participant::ParticipantSpec;
use crate::skills::{Skill, default_skills};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level encounter configuration.
///
/// Mirrors the structure of `skirmish-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EncounterConfig {
    /// Encounter identity and randomness.
    #[serde(default)]
    pub encounter: EncounterSection,

    /// Field size and hex geometry.
    #[serde(default)]
    pub grid: GridConfig,

    /// Phase durations and rates.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Path search parameters.
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Skill catalog content.
    #[serde(default = "default_skills")]
    pub skills: Vec<Skill>,

    /// Actors spawned when the encounter is built.
    #[serde(default)]
    pub participants: Vec<ParticipantSpec>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            encounter: EncounterSection::default(),
            grid: GridConfig::default(),
            timing: TimingConfig::default(),
            navigation: NavigationConfig::default(),
            logging: LoggingConfig::default(),
            skills: default_skills(),
            participants: Vec::new(),
        }
    }
}

impl EncounterConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.encounter.apply_env_overrides();
        Ok(config)
    }
}

/// Encounter identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncounterSection {
    /// Human-readable encounter name.
    #[serde(default = "default_encounter_name")]
    pub name: String,

    /// Seed for AI decisions.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for EncounterSection {
    fn default() -> Self {
        Self {
            name: default_encounter_name(),
            seed: default_seed(),
        }
    }
}

impl EncounterSection {
    /// Apply `SKIRMISH_SEED` if it is set and parses.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SKIRMISH_SEED") {
            match val.trim().parse() {
                Ok(seed) => self.seed = seed,
                Err(err) => warn!(value = %val, %err, "Ignoring unparsable SKIRMISH_SEED"),
            }
        }
    }
}

/// Field dimensions and hex geometry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Columns (`m` range).
    #[serde(default = "default_width")]
    pub width: u32,

    /// Half-rows (`n` range).
    #[serde(default = "default_height")]
    pub height: u32,

    /// Wing width in pixels.
    #[serde(default = "default_wing")]
    pub wing: i32,

    /// Body width in pixels.
    #[serde(default = "default_body")]
    pub body: i32,

    /// Hex height in pixels.
    #[serde(default = "default_hex_height")]
    pub hex_height: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            wing: default_wing(),
            body: default_body(),
            hex_height: default_hex_height(),
        }
    }
}

impl GridConfig {
    /// Build the configured geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidGeometry`] for unsupported dimensions.
    pub fn geometry(&self) -> Result<Geometry, GridError> {
        Geometry::new(self.wing, self.body, self.hex_height)
    }
}

/// Phase durations and accrual rates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimingConfig {
    /// Seconds spent in `FadingIn`.
    #[serde(default = "default_fade_in_seconds")]
    pub fade_in_seconds: f64,

    /// Seconds spent in `Celebration`.
    #[serde(default = "default_celebration_seconds")]
    pub celebration_seconds: f64,

    /// Seconds spent in `FadingOut` before the encounter is finished.
    #[serde(default = "default_fade_out_seconds")]
    pub fade_out_seconds: f64,

    /// Preparation gained per second.
    #[serde(default = "default_preparation_rate")]
    pub preparation_rate: f64,

    /// Seconds to walk from one waypoint to the next.
    #[serde(default = "default_seconds_per_hex")]
    pub seconds_per_hex: f64,

    /// Seconds an AI actor waits before each decision.
    #[serde(default = "default_think_seconds")]
    pub think_seconds: f64,

    /// Decisions an AI actor may take in one turn before it must end it.
    #[serde(default = "default_max_ai_actions")]
    pub max_ai_actions: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_in_seconds: default_fade_in_seconds(),
            celebration_seconds: default_celebration_seconds(),
            fade_out_seconds: default_fade_out_seconds(),
            preparation_rate: default_preparation_rate(),
            seconds_per_hex: default_seconds_per_hex(),
            think_seconds: default_think_seconds(),
            max_ai_actions: default_max_ai_actions(),
        }
    }
}

/// Path search parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NavigationConfig {
    /// Cost of a step into a hex with multiplier 1.
    #[serde(default = "default_step_cost")]
    pub step_cost: f64,

    /// Expansions allowed per search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            step_cost: default_step_cost(),
            search_limit: default_search_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit log lines as JSON.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde's `default = "..."` attribute)
// ---------------------------------------------------------------------------

fn default_encounter_name() -> String {
    "Skirmish".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_width() -> u32 {
    8
}

const fn default_height() -> u32 {
    24
}

const fn default_wing() -> i32 {
    DEFAULT_WING
}

const fn default_body() -> i32 {
    DEFAULT_BODY
}

const fn default_hex_height() -> i32 {
    DEFAULT_HEIGHT
}

const fn default_fade_in_seconds() -> f64 {
    1.0
}

const fn default_celebration_seconds() -> f64 {
    2.0
}

const fn default_fade_out_seconds() -> f64 {
    1.0
}

const fn default_preparation_rate() -> f64 {
    50.0
}

const fn default_seconds_per_hex() -> f64 {
    0.25
}

const fn default_think_seconds() -> f64 {
    0.5
}

const fn default_max_ai_actions() -> u32 {
    8
}

const fn default_step_cost() -> f64 {
    DEFAULT_STEP_COST
}

const fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use skirmish_types::{Controller, Faction, Key, SizeClass};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EncounterConfig::default();
        assert_eq!(config.grid.width, 8);
        assert_eq!(config.grid.height, 24);
        assert!(config.grid.geometry().is_ok());
        assert!(config.participants.is_empty());
        assert_eq!(config.navigation.search_limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
encounter:
  name: "Ridge Ambush"
  seed: 123

grid:
  width: 10
  height: 20
  wing: 7
  body: 10
  hex_height: 16

timing:
  fade_in_seconds: 0.5
  celebration_seconds: 1.0
  fade_out_seconds: 0.5
  preparation_rate: 40.0
  seconds_per_hex: 0.1
  think_seconds: 0.0
  max_ai_actions: 4

navigation:
  step_cost: 2.0
  search_limit: 500

logging:
  level: "debug"

skills:
  - id: move
    kind: move
  - id: bite
    name: Bite
    kind: strike
    action_cost: 2
    power: 12

participants:
  - name: Aldric
    faction: party
    controller: human
    position: { m: 1, n: 2 }
  - name: Ogre
    faction: hostile
    controller: ai
    size: large
    position: { m: 6, n: 12 }
    health: 250
    skills: [move, bite]
"#;

        let config = EncounterConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.encounter.name, "Ridge Ambush");
        assert_eq!(config.grid.width, 10);
        assert_eq!(config.timing.max_ai_actions, 4);
        assert_eq!(config.navigation.search_limit, 500);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.skills.len(), 2);
        assert_eq!(config.participants.len(), 2);

        let ogre = config.participants.get(1);
        assert_eq!(ogre.map(|p| p.size), Some(SizeClass::Large));
        assert_eq!(ogre.map(|p| p.controller), Some(Controller::Ai));
        assert_eq!(ogre.map(|p| p.position), Some(Key::new(6, 12)));
        assert_eq!(ogre.map(|p| p.health), Some(250));

        let aldric = config.participants.first();
        assert_eq!(aldric.map(|p| p.faction), Some(Faction::Party));
        assert_eq!(aldric.map(|p| p.action_points), Some(6));
        assert_eq!(aldric.map(|p| p.skills.len()), Some(3));
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = EncounterConfig::parse("grid:\n  width: 5\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.grid.width, 5);
        assert_eq!(config.grid.height, 24);
        assert_eq!(config.skills.len(), 3);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = EncounterConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn bad_yaml_is_an_error() {
        let config = EncounterConfig::parse("grid: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("skirmish-config.yaml");
        if path.exists() {
            let config = EncounterConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
