//! Configuration for the bridge: engine process, session policy, project discovery.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "tern-bridge.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// How to launch the analysis engine.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Session lifecycle policy.
    #[serde(default)]
    pub session: SessionConfig,

    /// Project discovery settings.
    #[serde(default)]
    pub project: ProjectConfig,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| BridgeError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| BridgeError::ConfigError(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            BridgeError::ConfigError(format!("failed to serialize config: {}", e))
        })?;
        fs::write(path, content)
            .map_err(|e| BridgeError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }
}

/// Engine process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable hosting the analysis engine (default: "tern-engine").
    pub command: String,

    /// Extra arguments passed to the engine executable.
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "tern-engine".to_string(),
            args: Vec::new(),
        }
    }
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Send a warm-up request after a sync that changed the file set (default: true).
    pub warm_up_on_sync: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            warm_up_on_sync: true,
        }
    }
}

/// Project discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Glob matched against file names when walking up for a project file.
    pub project_file_pattern: String,

    /// Key of the bridge section inside the project file (default: "ternjs").
    pub settings_key: String,

    /// Include globs used when the project section names none.
    pub default_include: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_file_pattern: "*.sublime-project".to_string(),
            settings_key: "ternjs".to_string(),
            default_include: vec!["**/*.js".to_string()],
        }
    }
}
