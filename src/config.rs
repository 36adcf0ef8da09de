//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.rakdash.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Interaction log settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Insight service settings.
    #[serde(default)]
    pub insight: InsightConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Dashboard destination; unset means stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Interaction log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the CSV event log.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

fn default_log_file() -> String {
    "interaksi_log.csv".to_string()
}

/// Insight service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Gemini model queried for the insight.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative-language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// How many trailing records are sampled into the prompt.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Sampling temperature; the service default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Cap on generated tokens; the service default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Environment variable holding the API key. There is no fallback
    /// credential: an unset variable fails the insight call.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
            sample_size: default_sample_size(),
            temperature: None,
            max_output_tokens: None,
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_sample_size() -> usize {
    10
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum rows in the recent-interactions table.
    #[serde(default = "default_recent_rows")]
    pub recent_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            recent_rows: default_recent_rows(),
        }
    }
}

fn default_recent_rows() -> usize {
    20
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".rakdash.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Insight settings - always override since they have defaults in CLI
        self.insight.model = args.model.clone();
        self.insight.endpoint = args.endpoint.clone();
        self.insight.sample_size = args.sample_size;

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.insight.timeout_seconds = timeout;
        }

        // Optional settings - only override if provided
        if let Some(ref log_file) = args.log_file {
            self.data.log_file = log_file.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, OutputFormat};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.log_file, "interaksi_log.csv");
        assert_eq!(config.insight.model, "gemini-1.5-flash");
        assert_eq!(
            config.insight.endpoint,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.insight.sample_size, 10);
        assert_eq!(config.insight.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.report.recent_rows, 20);
        assert!(config.general.output.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "dashboard.md"
verbose = true

[data]
log_file = "logs/march.csv"

[insight]
model = "gemini-1.5-pro"
timeout_seconds = 120
temperature = 0.2

[report]
recent_rows = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("dashboard.md"));
        assert!(config.general.verbose);
        assert_eq!(config.data.log_file, "logs/march.csv");
        assert_eq!(config.insight.model, "gemini-1.5-pro");
        assert_eq!(config.insight.timeout_seconds, 120);
        assert_eq!(config.insight.temperature, Some(0.2));
        assert_eq!(config.report.recent_rows, 5);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[insight]\nmodel = \"gemini-1.5-pro\"\n").unwrap();
        assert_eq!(config.insight.model, "gemini-1.5-pro");
        assert_eq!(config.insight.sample_size, 10);
        assert_eq!(config.data.log_file, "interaksi_log.csv");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[insight]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("gemini-1.5-flash"));

        // The generated file must parse back cleanly.
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.insight.sample_size, 10);
    }

    #[test]
    fn test_merge_cli_overrides() {
        let args = Args {
            log_file: None,
            insight: false,
            sample_size: 15,
            model: "gemini-1.5-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Some(30),
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            check: false,
            init_config: false,
        };

        let mut config = Config::default();
        config.data.log_file = "logs/march.csv".to_string();
        config.merge_with_args(&args);

        assert_eq!(config.insight.model, "gemini-1.5-pro");
        assert_eq!(config.insight.sample_size, 15);
        assert_eq!(config.insight.timeout_seconds, 30);
        // No --log-file on the CLI, so the config file value survives.
        assert_eq!(config.data.log_file, "logs/march.csv");
    }
}
