//! Configuration schema for convcache
//!
//! Configuration is stored at `~/.config/convcache/config.toml`

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Converter cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// How build state is kept apart between concurrent builders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheIsolation {
    /// One shared registry keyed by thread
    #[default]
    Thread,
    /// A fresh cache for every top-level request
    Session,
}

/// Converter cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Isolation strategy for in-progress builds
    pub isolation: CacheIsolation,

    /// Keep finished top-level converters for reuse (default: true)
    pub memoize: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            isolation: CacheIsolation::Thread,
            memoize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("isolation = \"thread\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.general.log_format, "text");
        assert!(config.cache.memoize);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            isolation = "session"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.isolation, CacheIsolation::Session);
        assert!(config.cache.memoize); // default preserved
    }

    #[test]
    fn unknown_isolation_rejected() {
        let result: Result<Config, _> = toml::from_str("[cache]\nisolation = \"process\"");
        assert!(result.is_err());
    }
}
