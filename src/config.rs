use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the playground.
///
/// Loaded from `config.toml` under the platform config directory when
/// present; every field has a default so a missing or partial file is
/// fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Interpreter invoked for Python files.
    pub python_command: String,
    /// Interpreter invoked for JavaScript files.
    pub node_command: String,
    /// Wall-clock bound on a single run; the child is killed on expiry.
    pub run_timeout_secs: u64,
    /// Completion provider endpoint for inline suggestions.
    pub suggestion_endpoint: String,
    /// Per-request timeout on suggestion round trips.
    pub suggestion_timeout_secs: u64,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            python_command: "python3".to_string(),
            node_command: "node".to_string(),
            run_timeout_secs: 30,
            suggestion_endpoint: "http://localhost:3000/api/suggest-inline".to_string(),
            suggestion_timeout_secs: 10,
        }
    }
}

impl PlaygroundConfig {
    /// Loads the config file, falling back to defaults when it is missing
    /// or unreadable. A broken file is logged, never fatal.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw).context("Failed to parse config file")
    }

    fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Failed to get config directory")?
            .join("codepad")
            .join("config.toml"))
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn suggestion_timeout(&self) -> Duration {
        Duration::from_secs(self.suggestion_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let config: PlaygroundConfig = toml::from_str("").unwrap();
        assert_eq!(config.python_command, "python3");
        assert_eq!(config.node_command, "node");
        assert_eq!(config.run_timeout_secs, 30);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: PlaygroundConfig = toml::from_str("python_command = \"python3.12\"").unwrap();
        assert_eq!(config.python_command, "python3.12");
        assert_eq!(config.node_command, "node");
    }
}
