use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for git-remote-joystream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoystreamRemoteConfig {
    /// JSON-RPC endpoint of the chain node
    #[serde(default = "defaults::node_url")]
    pub node_url: String,
    /// Ledger identity the helper signs submissions as. Optional until a
    /// push actually needs it; listing works without one.
    #[serde(default)]
    pub author: Option<String>,
    /// HTTP request timeout in seconds. None means no timeout: a hung
    /// ledger call blocks the helper until the caller kills it.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for JoystreamRemoteConfig {
    fn default() -> Self {
        Self {
            node_url: defaults::node_url(),
            author: None,
            request_timeout_secs: None,
        }
    }
}

impl JoystreamRemoteConfig {
    /// Load configuration from the config file and environment variables.
    /// A missing file yields defaults so the helper runs unconfigured for
    /// read-only use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        tracing::debug!("loading git-remote-joystream config from {:?}", config_path);

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        if let Ok(url) = env::var("JOYSTREAM_NODE_URL") {
            config.node_url = url;
        }

        if let Ok(author) = env::var("JOYSTREAM_AUTHOR") {
            config.author = Some(author);
        }

        if let Ok(secs) = env::var("JOYSTREAM_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(
                secs.parse()
                    .context("Failed to parse JOYSTREAM_TIMEOUT_SECS as u64")?,
            );
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get default config file path
    pub fn config_file_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config/git-remote-joystream/config.yaml"))
            .context("Could not determine home directory for config file")
    }
}

mod defaults {
    pub(crate) fn node_url() -> String {
        "http://localhost:26657".to_string()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let config = JoystreamRemoteConfig {
            node_url: "http://node.example:26657".to_string(),
            author: Some("alice".to_string()),
            request_timeout_secs: Some(30),
        };
        config.save(&config_path).unwrap();

        let loaded = JoystreamRemoteConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.node_url, config.node_url);
        assert_eq!(loaded.author, config.author);
        assert_eq!(loaded.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "author: bob\n").unwrap();

        let loaded = JoystreamRemoteConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.node_url, "http://localhost:26657");
        assert_eq!(loaded.author, Some("bob".to_string()));
        assert_eq!(loaded.request_timeout_secs, None);
    }

    #[test]
    fn test_env_override() {
        env::set_var("JOYSTREAM_NODE_URL", "http://override:26657");
        env::set_var("JOYSTREAM_AUTHOR", "carol");

        let config = JoystreamRemoteConfig::load().unwrap();
        assert_eq!(config.node_url, "http://override:26657");
        assert_eq!(config.author, Some("carol".to_string()));

        env::remove_var("JOYSTREAM_NODE_URL");
        env::remove_var("JOYSTREAM_AUTHOR");
    }
}
