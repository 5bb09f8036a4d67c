//! Server configuration
//!
//! Optional TOML file, then environment overrides, then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use leadflow_core::application::dto::CreateCallerCommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid seed file {path}: {source}")]
    Seed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `EnvFilter` directive, e.g. `info` or `leadflow_core=debug`
    pub log_level: String,
    /// JSON array of raw lead documents imported at startup
    pub seed_leads: Option<PathBuf>,
    /// JSON array of caller create commands registered at startup
    pub seed_callers: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
            seed_leads: None,
            seed_callers: None,
        }
    }
}

impl ServerConfig {
    /// Read the TOML file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = read(path)?;
                Ok(toml::from_str(&content)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `LEADFLOW_*` (and `PORT`) overrides from the process environment
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("LEADFLOW_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("LEADFLOW_PORT").or_else(|| lookup("PORT")) {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(level) = lookup("LEADFLOW_LOG") {
            self.log_level = level;
        }
        if let Some(path) = lookup("LEADFLOW_SEED_LEADS") {
            self.seed_leads = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("LEADFLOW_SEED_CALLERS") {
            self.seed_callers = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn load_seed_leads(&self) -> Result<Vec<Value>, ConfigError> {
        match &self.seed_leads {
            Some(path) => read_json(path),
            None => Ok(Vec::new()),
        }
    }

    pub fn load_seed_callers(&self) -> Result<Vec<CreateCallerCommand>, ConfigError> {
        match &self.seed_callers {
            Some(path) => read_json(path),
            None => Ok(Vec::new()),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, ConfigError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Seed {
        path: path.to_path_buf(),
        source,
    })
}
