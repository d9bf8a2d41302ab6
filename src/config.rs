//! Server configuration
//!
//! Loaded from a YAML file. `SPHYNX_CONFIG` names the file and
//! `SPHYNX_THREADS` overrides the engine thread count.

use crate::error::{SphynxError, SphynxResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_ENV: &str = "SPHYNX_CONFIG";
pub const THREADS_ENV: &str = "SPHYNX_THREADS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphynxConfig {
    pub engine: EngineConfig,
    pub server: ServerConfig,
}

/// Graph-algorithms engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine thread count. None = take it from the environment
    /// (`OMP_NUM_THREADS`, else all cores).
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Operations allowed to execute at the same time
    pub max_concurrent_operations: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_operations: 16,
        }
    }
}

impl SphynxConfig {
    pub fn from_yaml(yaml: &str) -> SphynxResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| SphynxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SphynxResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| SphynxError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    /// Defaults, or the file named by `SPHYNX_CONFIG`, then env overrides
    pub fn load() -> SphynxResult<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(threads) = std::env::var(THREADS_ENV) {
            let threads = threads
                .trim()
                .parse::<usize>()
                .map_err(|e| SphynxError::Config(format!("{}: {}", THREADS_ENV, e)))?;
            config.engine.threads = Some(threads);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SphynxResult<()> {
        if self.engine.threads == Some(0) {
            return Err(SphynxError::Config("engine.threads must be positive".to_string()));
        }
        if self.server.max_concurrent_operations == 0 {
            return Err(SphynxError::Config(
                "server.max_concurrent_operations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
