//! Configuration system for RecipeForge.
//!
//! A matching run receives a [`MatchConfig`] explicitly. It selects the
//! solving mode, the ranking weights, the capacity policy and the
//! termination limits. Configuration can be loaded from TOML or YAML.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use recipeforge_config::{CapacityPolicy, MatchConfig};
//! use recipeforge_core::MatchMode;
//! use std::time::Duration;
//!
//! let config = MatchConfig::from_toml_str(r#"
//!     mode = "ultra"
//!     capacity_policy = "exclusive"
//!
//!     [weights]
//!     energy = 0.5
//!     usage = 0.3
//!     co2 = 0.1
//!
//!     [termination]
//!     seconds_spent_limit = 30
//! "#).unwrap();
//!
//! assert_eq!(config.mode, MatchMode::Ultra);
//! assert_eq!(config.capacity_policy, CapacityPolicy::Exclusive);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use recipeforge_config::MatchConfig;
//!
//! let config = MatchConfig::load("recipeforge.toml").unwrap_or_default();
//! assert_eq!(config.attempt_limit(), Some(2_000_000));
//! ```

use std::path::Path;
use std::time::Duration;

use recipeforge_core::{MatchError, MatchMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on the number of enumerated assignments.
pub const DEFAULT_ATTEMPT_LIMIT: u64 = 2_000_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for MatchError {
    fn from(err: ConfigError) -> Self {
        MatchError::Config(err.to_string())
    }
}

/// Configuration of a single matching run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchConfig {
    /// Solving mode.
    #[serde(default)]
    pub mode: MatchMode,

    /// Ranking weights, used in Ultra mode.
    #[serde(default)]
    pub weights: WeightConfig,

    /// How resource capacity is enforced.
    #[serde(default)]
    pub capacity_policy: CapacityPolicy,

    /// Whether consecutive steps may stay on the same resource.
    #[serde(default = "default_true")]
    pub in_place_transfer: bool,

    /// Termination configuration.
    #[serde(default)]
    pub termination: TerminationConfig,

    /// Emit a progress event every `progress_interval` solutions.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_true() -> bool {
    true
}

fn default_progress_interval() -> u64 {
    1
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            weights: WeightConfig::default(),
            capacity_policy: CapacityPolicy::default(),
            in_place_transfer: true,
            termination: TerminationConfig::default(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl MatchConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the solving mode.
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the ranking weights.
    pub fn with_weights(mut self, energy: f64, usage: f64, co2: f64) -> Self {
        self.weights = WeightConfig { energy, usage, co2 };
        self
    }

    /// Sets the capacity policy.
    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    /// Enables or disables in-place transfer between consecutive steps.
    pub fn with_in_place_transfer(mut self, enabled: bool) -> Self {
        self.in_place_transfer = enabled;
        self
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination.seconds_spent_limit = Some(seconds);
        self
    }

    /// Sets the attempt limit; `None` removes it.
    pub fn with_attempt_limit(mut self, limit: Option<u64>) -> Self {
        self.termination.attempt_limit = limit;
        self
    }

    /// Sets the progress interval.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Returns the termination time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.time_limit()
    }

    /// Returns the attempt limit, if configured.
    pub fn attempt_limit(&self) -> Option<u64> {
        self.termination.attempt_limit
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for negative or non-finite weights,
    /// a zero progress interval, or a zero attempt limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        if self.termination.attempt_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "attempt_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Raw ranking weights for energy, usage cost and CO2.
///
/// Weights need not sum to one; the ranker re-normalizes them.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub usage: f64,
    #[serde(default)]
    pub co2: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            energy: 0.4,
            usage: 0.3,
            co2: 0.3,
        }
    }
}

impl WeightConfig {
    /// Checks that every weight is a non-negative number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (label, value) in [
            ("energy", self.energy),
            ("usage", self.usage),
            ("co2", self.co2),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "weight {label} = {value} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// How resource capacity is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Honour each resource's declared capacity; unlimited otherwise.
    #[default]
    Declared,

    /// Every resource serves at most one step.
    Exclusive,
}

/// Termination configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum number of assignments to enumerate.
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: Option<u64>,

    /// Maximum seconds to spend solving.
    #[serde(default)]
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend solving.
    #[serde(default)]
    pub minutes_spent_limit: Option<u64>,
}

fn default_attempt_limit() -> Option<u64> {
    Some(DEFAULT_ATTEMPT_LIMIT)
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            attempt_limit: default_attempt_limit(),
            seconds_spent_limit: None,
            minutes_spent_limit: None,
        }
    }
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds =
            self.seconds_spent_limit.unwrap_or(0) + self.minutes_spent_limit.unwrap_or(0) * 60;
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }
}
