//! CLI configuration

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PIPEGRAPH_CONFIG";

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pipegraph")
}

/// Location of `config.toml`
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pipegraph")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_graph: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_graph: pipegraph_storage::DEFAULT_GRAPH_NAME.to_string(),
        }
    }
}

/// A settable config entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Directory holding `pipegraph.redb`
    #[value(name = "data_dir")]
    DataDir,
    /// Graph used when `--graph` is not given
    #[value(name = "default_graph")]
    DefaultGraph,
}

impl ConfigKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::DataDir => "data_dir",
            Self::DefaultGraph => "default_graph",
        }
    }
}

impl Config {
    /// Load from the config file. A missing or unreadable file gives the
    /// defaults.
    pub fn load() -> Self {
        let path = config_file_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::DataDir => self.data_dir.display().to_string(),
            ConfigKey::DefaultGraph => self.default_graph.clone(),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> anyhow::Result<()> {
        match key {
            ConfigKey::DataDir => self.data_dir = PathBuf::from(value),
            ConfigKey::DefaultGraph => {
                if value.is_empty() {
                    anyhow::bail!("default_graph cannot be empty");
                }
                self.default_graph = value.to_string();
            }
        }
        Ok(())
    }

    /// Put `key` back to its built-in value
    pub fn reset(&mut self, key: ConfigKey) {
        let defaults = Self::default();
        match key {
            ConfigKey::DataDir => self.data_dir = defaults.data_dir,
            ConfigKey::DefaultGraph => self.default_graph = defaults.default_graph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("default_graph = \"family\"").unwrap();
        assert_eq!(config.default_graph, "family");
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn test_get_set_and_reset() {
        let mut config = Config::default();
        config.set(ConfigKey::DefaultGraph, "social").unwrap();
        config.set(ConfigKey::DataDir, "/tmp/pg").unwrap();

        assert_eq!(config.get(ConfigKey::DefaultGraph), "social");
        assert_eq!(config.get(ConfigKey::DataDir), "/tmp/pg");
        assert!(config.set(ConfigKey::DefaultGraph, "").is_err());

        config.reset(ConfigKey::DefaultGraph);
        assert_eq!(config.default_graph, pipegraph_storage::DEFAULT_GRAPH_NAME);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pg"));
    }

    #[test]
    fn test_key_names() {
        for key in ConfigKey::value_variants() {
            let parsed = ConfigKey::from_str(key.name(), false).unwrap();
            assert_eq!(parsed, *key);
        }
        assert!(ConfigKey::from_str("colour", false).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.set(ConfigKey::DefaultGraph, "social").unwrap();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
