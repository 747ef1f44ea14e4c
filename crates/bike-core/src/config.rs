//! Configuration loading for the decision core.
//!
//! Scoring weights and election settings are loaded from a TOML tuning file.
//! Every section falls back to the canonical constants when omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Complete decision configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Destination selection weights
    #[serde(default)]
    pub target: TargetWeights,
    /// Proposal ranking weights
    #[serde(default)]
    pub ranking: RankingWeights,
    /// Leader election settings
    #[serde(default)]
    pub election: ElectionConfig,
}

impl DecisionConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Weights for the default weighted-score regime of destination selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetWeights {
    /// Weight of the normalised loot value
    pub loot: f64,
    /// Divisor that normalises a box's total resources
    pub loot_normaliser: f64,
    /// Bonus when the box matches the agent's colour
    pub colour: f64,
    /// Weight of the area-normalised distance (negative = cost)
    pub distance: f64,
    /// Weight of the fraction of occupants sharing the box colour
    pub crowd: f64,
    /// Outer weight applied to the reputation terms
    pub reputation: f64,
    /// Mean history contribution of same-colour occupants
    pub history: f64,
    /// Mean recent contribution of same-colour occupants
    pub recent: f64,
    /// Mean remaining energy of same-colour occupants
    pub energy: f64,
    /// Energy needed to travel one unit of distance
    pub energy_per_distance: f64,
}

impl Default for TargetWeights {
    fn default() -> Self {
        Self {
            loot: 0.2,
            loot_normaliser: 8.0,
            colour: 0.2,
            distance: -0.3,
            crowd: 0.5,
            reputation: 0.5,
            history: 0.4,
            recent: 0.2,
            energy: 0.4,
            energy_per_distance: 1.0,
        }
    }
}

/// Weights for scoring peer proposals. Proposer reputation is not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub loot: f64,
    pub loot_normaliser: f64,
    pub colour: f64,
    /// Weight of the area-normalised distance (set negative to treat it as a cost)
    pub distance: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            loot: 0.2,
            loot_normaliser: 8.0,
            colour: 0.2,
            distance: 0.2,
        }
    }
}

/// Leader election settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// How many occupants reach the Borda stage
    pub shortlist_size: usize,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self { shortlist_size: 3 }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error writing TOML config
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Megabike decision tuning

[target]
loot = 0.2
loot_normaliser = 8.0
colour = 0.2
distance = -0.3
crowd = 0.5
reputation = 0.5
history = 0.4
recent = 0.2
energy = 0.4
energy_per_distance = 1.0

[ranking]
loot = 0.2
loot_normaliser = 8.0
colour = 0.2
distance = 0.2

[election]
shortlist_size = 3
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecisionConfig::default();

        assert_eq!(config.target.loot, 0.2);
        assert_eq!(config.target.distance, -0.3);
        assert_eq!(config.ranking.distance, 0.2);
        assert_eq!(config.election.shortlist_size, 3);
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = DecisionConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(parsed, DecisionConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed = DecisionConfig::from_str("[election]\nshortlist_size = 2\n").unwrap();

        assert_eq!(parsed.election.shortlist_size, 2);
        assert_eq!(parsed.target, TargetWeights::default());
    }

    #[test]
    fn test_to_toml_round_trip() {
        let mut config = DecisionConfig::default();
        config.target.crowd = 0.75;

        let toml = config.to_toml().unwrap();
        assert_eq!(DecisionConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let err = DecisionConfig::from_str("[target\nloot = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
