//! Graph configuration and statistics.
//!
//! The pseudo-time constants live in an immutable, serializable
//! configuration consulted by the graph rather than as module globals.

use crate::error::{Result, TimegraphError};
use serde::{Deserialize, Serialize};

/// Timegraph configuration.
///
/// Controls pseudo-time allocation within chains. The defaults match the
/// classic timegraph constants and are appropriate for almost all uses.
///
/// # Example
///
/// ```rust
/// use timegraph::Config;
///
/// let config = Config::default().with_pseudo_step(500);
/// assert!(config.validate().is_ok());
///
/// // Load from JSON
/// let config: Config = Config::from_json(r#"{"pseudo_step": 2000}"#).unwrap();
/// assert_eq!(config.pseudo_step, 2000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pseudo time assigned to the first point on a chain.
    #[serde(default = "Config::default_pseudo_init")]
    pub pseudo_init: i64,

    /// Pseudo-time increment between adjacent points on a chain.
    #[serde(default = "Config::default_pseudo_step")]
    pub pseudo_step: i64,

    /// Minimum pseudo gap below which an insertion between two adjacent
    /// points triggers renumbering of the chain.
    #[serde(default = "Config::default_renumber_gap")]
    pub renumber_gap: i64,
}

impl Config {
    const fn default_pseudo_init() -> i64 {
        1
    }

    const fn default_pseudo_step() -> i64 {
        1000
    }

    const fn default_renumber_gap() -> i64 {
        10
    }

    pub fn with_pseudo_step(mut self, step: i64) -> Self {
        self.pseudo_step = step;
        self
    }

    pub fn with_renumber_gap(mut self, gap: i64) -> Self {
        self.renumber_gap = gap;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.pseudo_step <= 0 {
            return Err(TimegraphError::InvalidConfig(
                "pseudo_step must be positive".into(),
            ));
        }
        if self.renumber_gap < 2 {
            return Err(TimegraphError::InvalidConfig(
                "renumber_gap must be at least 2".into(),
            ));
        }
        if self.renumber_gap >= self.pseudo_step {
            return Err(TimegraphError::InvalidConfig(
                "renumber_gap must be smaller than pseudo_step".into(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| TimegraphError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TimegraphError::InvalidConfig(e.to_string()))
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| TimegraphError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TimegraphError::InvalidConfig(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pseudo_init: Self::default_pseudo_init(),
            pseudo_step: Self::default_pseudo_step(),
            renumber_gap: Self::default_renumber_gap(),
        }
    }
}

/// Graph statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of live (non-collapsed) time points.
    pub points: usize,
    /// Number of chains allocated.
    pub chains: usize,
    /// Number of registered events.
    pub events: usize,
    /// Number of accepted entry operations.
    pub entries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.pseudo_init, 1);
        assert_eq!(config.pseudo_step, 1000);
        assert_eq!(config.renumber_gap, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default().with_pseudo_step(0);
        assert!(config.validate().is_err());

        let config = Config::default().with_renumber_gap(1);
        assert!(config.validate().is_err());

        let config = Config::default().with_pseudo_step(8).with_renumber_gap(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default().with_pseudo_step(500);
        let json = config.to_json().unwrap();
        let back = Config::from_json(&json).unwrap();
        assert_eq!(back.pseudo_step, 500);
        assert_eq!(back.pseudo_init, 1);
    }

    #[test]
    fn test_config_json_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.pseudo_step, 1000);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml_roundtrip() {
        let config = Config::default().with_renumber_gap(20);
        let toml_str = config.to_toml().unwrap();
        let back = Config::from_toml(&toml_str).unwrap();
        assert_eq!(back.renumber_gap, 20);
    }
}
