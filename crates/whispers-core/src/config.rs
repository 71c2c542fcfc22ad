//! Configuration loading and typed config structures for the Whispers simulation.
//!
//! The canonical configuration lives in `whispers-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader that reads the file, and [`SimulationConfig::validate`],
//! which rejects malformed values before any simulation step runs.
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::Deserialize;
use whispers_agents::AgentConfig;
use whispers_types::Profile;
use whispers_world::{BigResourcePhase, DEFAULT_MIN_RESOURCES};

/// Errors that can occur when loading or validating configuration.
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

    /// A value is out of range or inconsistent with another.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong, naming the offending key.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `whispers-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and run length.
    #[serde(default)]
    pub world: WorldConfig,

    /// Grid size and resource spawning.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Initial population and cap.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Per-agent economic constants.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Reproduction and mutation.
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Big-resource negotiation phase.
    #[serde(default)]
    pub negotiation: NegotiationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output file locations.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The result is not validated; call [`Self::validate`] (or build a
    /// simulation, which does) before use.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let env = &self.environment;
        if env.width == 0 || env.height == 0 {
            return Err(invalid(format!(
                "environment.width and environment.height must be positive (got {}x{})",
                env.width, env.height
            )));
        }
        if !env.resource_spawn_rate.is_finite() || env.resource_spawn_rate < 0.0 {
            return Err(invalid(format!(
                "environment.resource_spawn_rate must be a non-negative number (got {})",
                env.resource_spawn_rate
            )));
        }

        check_probability("evolution.mutation_rate", self.evolution.mutation_rate)?;
        check_probability(
            "negotiation.big_resource_probability",
            self.negotiation.big_resource_probability,
        )?;
        if self.negotiation.big_resource_probability > 0.0 && self.negotiation.big_resource_size == 0
        {
            return Err(invalid(
                "negotiation.big_resource_size must be positive when big_resource_probability > 0"
                    .to_owned(),
            ));
        }

        if self.economy.reproduction_reserve < self.economy.reproduction_cost {
            return Err(invalid(format!(
                "economy.reproduction_reserve ({}) must cover economy.reproduction_cost ({})",
                self.economy.reproduction_reserve, self.economy.reproduction_cost
            )));
        }
        Ok(())
    }

    /// Economy constants for seed agents.
    pub const fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            daily_need: self.economy.daily_need,
            reproduction_reserve: self.economy.reproduction_reserve,
            reproduction_cost: self.economy.reproduction_cost,
        }
    }

    /// The big-resource phase described by the `negotiation` section.
    pub fn big_resource_phase(&self) -> BigResourcePhase {
        BigResourcePhase::new(
            self.negotiation.big_resource_probability,
            self.negotiation.big_resource_size,
        )
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

fn check_probability(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{key} must be within [0, 1] (got {value})")))
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of days `run` advances.
    #[serde(default = "default_days")]
    pub days: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            days: default_days(),
        }
    }
}

/// Grid and resource configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentConfig {
    /// Grid width in cells.
    #[serde(default = "default_grid_side")]
    pub width: u32,

    /// Grid height in cells.
    #[serde(default = "default_grid_side")]
    pub height: u32,

    /// Resources spawned per cell per day.
    #[serde(default = "default_resource_spawn_rate")]
    pub resource_spawn_rate: f64,

    /// Fewest resources spawned per day.
    #[serde(default = "default_min_resources")]
    pub min_resources: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            width: default_grid_side(),
            height: default_grid_side(),
            resource_spawn_rate: default_resource_spawn_rate(),
            min_resources: default_min_resources(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Seed cooperative agents.
    #[serde(default = "default_initial_per_profile")]
    pub cooperative: u32,

    /// Seed self-interested agents.
    #[serde(default = "default_initial_per_profile")]
    pub self_interested: u32,

    /// Seed adaptive agents.
    #[serde(default = "default_initial_per_profile")]
    pub adaptive: u32,

    /// Live agents above which reproduction stops (`None` = unlimited).
    #[serde(default = "default_max_population")]
    pub max_population: Option<u32>,
}

impl PopulationConfig {
    /// Seed count for one profile.
    pub const fn initial(&self, profile: Profile) -> u32 {
        match profile {
            Profile::Cooperative => self.cooperative,
            Profile::SelfInterested => self.self_interested,
            Profile::Adaptive => self.adaptive,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            cooperative: default_initial_per_profile(),
            self_interested: default_initial_per_profile(),
            adaptive: default_initial_per_profile(),
            max_population: default_max_population(),
        }
    }
}

/// Per-agent economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Resources an agent must collect each day to survive.
    #[serde(default = "default_daily_need")]
    pub daily_need: u32,

    /// Same-day reserve required to reproduce.
    #[serde(default = "default_reproduction_reserve")]
    pub reproduction_reserve: u32,

    /// Amount charged to the parent on a birth.
    #[serde(default = "default_reproduction_cost")]
    pub reproduction_cost: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            daily_need: default_daily_need(),
            reproduction_reserve: default_reproduction_reserve(),
            reproduction_cost: default_reproduction_cost(),
        }
    }
}

/// Reproduction and mutation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvolutionConfig {
    /// Chance an offspring switches to another profile.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Births allowed per day (`None` = unlimited).
    #[serde(default)]
    pub max_offspring_per_day: Option<u32>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: default_mutation_rate(),
            max_offspring_per_day: None,
        }
    }
}

/// Big-resource negotiation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NegotiationConfig {
    /// Daily chance the big resource appears.
    #[serde(default = "default_big_resource_probability")]
    pub big_resource_probability: f64,

    /// Units in the shared pool each pair negotiates over.
    #[serde(default = "default_big_resource_size")]
    pub big_resource_size: u32,

    /// Pairs that negotiate on a big-resource day.
    #[serde(default = "default_max_pairs_per_day")]
    pub max_pairs_per_day: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            big_resource_probability: default_big_resource_probability(),
            big_resource_size: default_big_resource_size(),
            max_pairs_per_day: default_max_pairs_per_day(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter (trace, debug, info, warn, error); `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
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

/// Output file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Where to write the metrics JSON after a run (`None` = skip).
    #[serde(default)]
    pub metrics_path: Option<String>,

    /// Where to write the final snapshot JSON (`None` = skip).
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_days() -> u64 {
    30
}

const fn default_grid_side() -> u32 {
    20
}

const fn default_resource_spawn_rate() -> f64 {
    0.25
}

const fn default_min_resources() -> u32 {
    DEFAULT_MIN_RESOURCES
}

const fn default_initial_per_profile() -> u32 {
    10
}

const fn default_max_population() -> Option<u32> {
    Some(300)
}

const fn default_daily_need() -> u32 {
    3
}

const fn default_reproduction_reserve() -> u32 {
    8
}

const fn default_reproduction_cost() -> u32 {
    8
}

const fn default_mutation_rate() -> f64 {
    0.05
}

const fn default_big_resource_probability() -> f64 {
    0.2
}

const fn default_big_resource_size() -> u32 {
    10
}

const fn default_max_pairs_per_day() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.days, 30);
        assert_eq!(config.environment.width, 20);
        assert_eq!(config.economy.daily_need, 3);
        assert_eq!(config.population.initial(Profile::Adaptive), 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 123
  days: 12
environment:
  width: 8
  height: 6
  resource_spawn_rate: 0.5
  min_resources: 2
population:
  cooperative: 1
  self_interested: 2
  adaptive: 3
  max_population: 50
economy:
  daily_need: 2
  reproduction_reserve: 6
  reproduction_cost: 4
evolution:
  mutation_rate: 0.1
  max_offspring_per_day: 3
negotiation:
  big_resource_probability: 1.0
  big_resource_size: 20
  max_pairs_per_day: 2
logging:
  level: debug
  json: true
output:
  metrics_path: out/metrics.json
  snapshot_path: out/snapshot.json
";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.world.days, 12);
        assert_eq!(config.environment.width, 8);
        assert_eq!(config.environment.min_resources, 2);
        assert_eq!(config.population.initial(Profile::SelfInterested), 2);
        assert_eq!(config.population.max_population, Some(50));
        assert_eq!(config.economy.reproduction_cost, 4);
        assert_eq!(config.evolution.max_offspring_per_day, Some(3));
        assert_eq!(config.negotiation.big_resource_size, 20);
        assert_eq!(config.negotiation.max_pairs_per_day, 2);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.output.metrics_path.as_deref(), Some("out/metrics.json"));
        assert!(config.validate().is_ok());

        let agent = config.agent_config();
        assert_eq!(agent.daily_need, 2);
        assert_eq!(agent.reproduction_reserve, 6);
        assert!((config.big_resource_phase().probability() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.world.days, 30);
        assert_eq!(config.population.cooperative, 10);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
        assert_eq!(config.unwrap_or_default(), SimulationConfig::default());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let config = SimulationConfig::parse("world: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let config = SimulationConfig::from_file(Path::new("/nonexistent/whispers.yaml"));
        assert!(matches!(config, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.environment.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = SimulationConfig::default();
        config.environment.resource_spawn_rate = -1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.evolution.mutation_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.negotiation.big_resource_probability = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.negotiation.big_resource_size = 0;
        assert!(config.validate().is_err());
        config.negotiation.big_resource_probability = 0.0;
        assert!(config.validate().is_ok());

        let mut config = SimulationConfig::default();
        config.economy.reproduction_cost = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_reason_names_the_key() {
        let mut config = SimulationConfig::default();
        config.evolution.mutation_rate = -0.5;
        let message = config.validate().err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("evolution.mutation_rate"), "{message}");
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("whispers-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            if let Ok(config) = config {
                assert!(config.validate().is_ok());
            }
        }
    }
}
