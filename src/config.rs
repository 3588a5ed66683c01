use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub target_directory: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub file_extensions: Vec<String>,
    pub max_file_size: usize,
    pub transport: TransportConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub payload_mode: PayloadMode,
    pub author: Option<String>,
    pub repository: Option<String>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
}

/// Which change-notification shape the transport emits. Both appear in the
/// wild; neither is more correct, so the choice lives in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadMode {
    /// Raw diff text plus an optional embedded dependency graph.
    RawDiff,
    /// Structured changed-file records plus changeset metadata.
    ChangedFiles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub auto_send: bool,
    pub include_graph_in_diff: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_directory: PathBuf::from("."),
            ignore_patterns: vec![
                ".git".to_string(),
                "target".to_string(),
                "build".to_string(),
                "out".to_string(),
                "node_modules".to_string(),
                "*.min.js".to_string(),
            ],
            file_extensions: vec!["java".to_string()],
            max_file_size: 1024 * 1024, // 1MB
            transport: TransportConfig {
                base_url: "http://localhost:8080/api/dependency-analysis".to_string(),
                timeout_seconds: 60,
                payload_mode: PayloadMode::RawDiff,
                author: None,
                repository: None,
                source_branch: None,
                target_branch: None,
            },
            analysis: AnalysisConfig {
                auto_send: false,
                include_graph_in_diff: true,
            },
        }
    }
}

impl Config {
    /// Get the default config file path (~/.depmap.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(PathBuf::from(home_dir).join(".depmap.toml"))
    }

    /// Load config from file, falling back to defaults if file doesn't exist
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::default_config_path()?;

        let mut config = if config_path.exists() {
            println!("Loading configuration from: {}", config_path.display());
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        if let Ok(url) = env::var("DEPMAP_SERVICE_URL") {
            config.transport.base_url = url;
        }

        Ok(config)
    }

    /// Load config from a specific file path
    pub fn from_file(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn to_file(&self, path: &PathBuf) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# depmap Configuration File
# This file configures dependency graph extraction and change impact analysis

# Target directory to analyze (defaults to current directory)
target_directory = "."

# Patterns to ignore during file discovery
ignore_patterns = [
    ".git",
    "target",
    "build",
    "out",
    "node_modules",
    "*.min.js"
]

# File extensions to include in analysis
file_extensions = ["java"]

# Maximum file size to analyze (in bytes, default 1MB)
max_file_size = 1048576

[transport]
# Base URL of the analysis service
base_url = "http://localhost:8080/api/dependency-analysis"

# Request timeout in seconds
timeout_seconds = 60

# Change notification shape: "raw-diff" or "changed-files"
payload_mode = "raw-diff"

# Changeset metadata for the "changed-files" shape
# author = "you@example.com"
# repository = "my-repo"
# source_branch = "feature/x"
# target_branch = "main"

[analysis]
# Send results to the analysis service after every analyze run
auto_send = false

# Embed the dependency graph in raw-diff change notifications
include_graph_in_diff = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_config_round_trips_through_toml() {
        let config: Config = toml::from_str(&Config::create_documented_config()).unwrap();
        assert_eq!(config.file_extensions, vec!["java"]);
        assert_eq!(config.transport.payload_mode, PayloadMode::RawDiff);
        assert!(!config.analysis.auto_send);
    }

    #[test]
    fn payload_mode_uses_kebab_case_names() {
        let toml_text = Config::create_documented_config()
            .replace("payload_mode = \"raw-diff\"", "payload_mode = \"changed-files\"");
        let config: Config = toml::from_str(&toml_text).unwrap();
        assert_eq!(config.transport.payload_mode, PayloadMode::ChangedFiles);
    }
}
