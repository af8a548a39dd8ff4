//! Configuration loading for Keygate.
//!
//! Configuration is read once at startup and is immutable afterwards. The
//! primary source is the environment (`KEYGATE_*` variables); a YAML file can
//! be used instead by pointing `KEYGATE_CONFIG` at it, which is convenient for
//! local development. Credentials are never stored in files checked into a
//! project; provide them via the environment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable holding a path to a YAML config file.
pub const ENV_CONFIG_FILE: &str = "KEYGATE_CONFIG";
/// Store control-plane endpoint URL.
pub const ENV_ENDPOINT: &str = "KEYGATE_ENDPOINT";
/// Master key used for control-plane calls.
pub const ENV_MASTER_KEY: &str = "KEYGATE_MASTER_KEY";
/// Optional fallback credential. Not used by the issuance flow.
pub const ENV_SECONDARY_KEY: &str = "KEYGATE_SECONDARY_KEY";
/// Target logical database.
pub const ENV_DATABASE: &str = "KEYGATE_DATABASE";
/// Container declarations, `id=partitionKeyPath` pairs, comma-separated.
pub const ENV_CONTAINERS: &str = "KEYGATE_CONTAINERS";
/// Lifetime of issued tokens, in seconds.
pub const ENV_TOKEN_TTL_SECS: &str = "KEYGATE_TOKEN_TTL_SECS";
/// Server bind address.
pub const ENV_BIND: &str = "KEYGATE_BIND";

/// Process-wide Keygate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeygateConfig {
    /// Store control-plane endpoint, e.g. "https://store.example.net".
    pub endpoint: String,

    /// Master key for control-plane access. Never forwarded to clients.
    pub master_key: String,

    /// Optional fallback credential. Kept for rotation; the issuance flow
    /// only ever uses the master key.
    #[serde(default)]
    pub secondary_key: Option<String>,

    /// Target logical database.
    pub database: String,

    /// Containers tokens are issued for. Issuance walks this list in
    /// declaration order.
    pub containers: Vec<ContainerConfig>,

    /// Lifetime of issued tokens, in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u32,

    /// Bind address for the HTTP server, e.g. "0.0.0.0:8080".
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// One container declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Container id within the database.
    pub id: String,

    /// Partition-key path the container is created with, e.g. "/uid".
    pub partition_key_path: String,
}

fn default_token_ttl() -> u32 {
    3600
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("configuration error: {0}")]
    Invalid(String),
}

impl KeygateConfig {
    /// Load configuration: from the file named by `KEYGATE_CONFIG` when set,
    /// otherwise from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(ENV_CONFIG_FILE) {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_env(),
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from `KEYGATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            endpoint: require_env(ENV_ENDPOINT)?,
            master_key: require_env(ENV_MASTER_KEY)?,
            secondary_key: optional_env(ENV_SECONDARY_KEY),
            database: require_env(ENV_DATABASE)?,
            containers: parse_container_pairs(&require_env(ENV_CONTAINERS)?)?,
            token_ttl_secs: match optional_env(ENV_TOKEN_TTL_SECS) {
                Some(raw) => raw.parse().map_err(|_| {
                    ConfigError::Invalid(format!(
                        "{ENV_TOKEN_TTL_SECS} must be an integer number of seconds, got '{raw}'"
                    ))
                })?,
                None => default_token_ttl(),
            },
            bind: optional_env(ENV_BIND).unwrap_or_else(default_bind),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the issuer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if self.master_key.trim().is_empty() {
            return Err(ConfigError::Invalid("master_key must not be empty".into()));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database must not be empty".into()));
        }
        if self.containers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one container must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        for container in &self.containers {
            if container.id.trim().is_empty() {
                return Err(ConfigError::Invalid("container id must not be empty".into()));
            }
            if !seen.insert(container.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate container id '{}'",
                    container.id
                )));
            }
        }
        Ok(())
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    optional_env(name).ok_or(ConfigError::MissingEnv(name))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse the compact environment form of the container list:
/// `msgs=/uid,notes=/uid`. Declaration order is preserved.
pub fn parse_container_pairs(raw: &str) -> Result<Vec<ContainerConfig>, ConfigError> {
    let mut containers = Vec::new();
    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (id, path) = pair.split_once('=').ok_or_else(|| {
            ConfigError::Invalid(format!(
                "container declaration '{pair}' must look like id=partitionKeyPath"
            ))
        })?;
        containers.push(ContainerConfig {
            id: id.trim().to_string(),
            partition_key_path: path.trim().to_string(),
        });
    }
    if containers.is_empty() {
        return Err(ConfigError::Invalid(
            "container list must declare at least one container".into(),
        ));
    }
    Ok(containers)
}
