use serde::{Deserialize, Serialize};

use crate::error::RaceError;

/// Data-driven race rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Net correctly directed finish crossings needed to win. At least 1.
    pub laps: u32,
    /// Turn cap for the control loop (0 = unlimited).
    pub max_turns: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            laps: 1,
            max_turns: 1000,
        }
    }
}

impl RaceConfig {
    /// Environment variable naming a config file.
    pub const ENV_VAR: &'static str = "GRIDRACE_CONFIG";
    /// Fallback config path, relative to the working directory.
    pub const DEFAULT_PATH: &'static str = "config/gridrace.toml";

    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(Self::ENV_VAR)
            && let Some(config) = Self::load_file(&path)
        {
            return config;
        }
        Self::load_file(Self::DEFAULT_PATH).unwrap_or_default()
    }

    /// Read a single file; `None` if it is missing or malformed.
    pub fn load_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let config = match Self::from_toml_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path, error = %e, "Ignoring malformed race config");
                return None;
            },
        };
        match config.validate() {
            Ok(()) => Some(config),
            Err(e) => {
                tracing::warn!(path, error = %e, "Ignoring invalid race config");
                None
            },
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reject rules no race can be won under.
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.laps == 0 {
            return Err(RaceError::InvalidConfig("laps must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_single_lap() {
        let config = RaceConfig::default();
        assert_eq!(config.laps, 1);
        assert_eq!(config.max_turns, 1000);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RaceConfig::from_toml_str("laps = 3\n").unwrap();
        assert_eq!(config.laps, 3);
        assert_eq!(config.max_turns, 1000);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(RaceConfig::from_toml_str("laps = \"many\"").is_err());
    }

    #[test]
    fn zero_laps_is_rejected() {
        let config = RaceConfig::from_toml_str("laps = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(RaceError::InvalidConfig(_))));
        assert_eq!(RaceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn missing_file_is_none() {
        assert_eq!(RaceConfig::load_file("does/not/exist.toml"), None);
    }
}
