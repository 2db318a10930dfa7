//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hrpulse.toml` files.

use crate::models::ScoreScale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".hrpulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Metric interpretation settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of areas fetched concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "hrpulse_report.md".to_string()
}

fn default_concurrency() -> usize {
    4
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Page size for employee listings (backend caps it at 100).
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum pages fetched per area before giving up.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Path of the paginated employee listing.
    #[serde(default = "default_employees_path")]
    pub employees_path: String,

    /// Query parameter carrying the area id.
    #[serde(default = "default_area_param")]
    pub area_param: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            employees_path: default_employees_path(),
            area_param: default_area_param(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9876/api/v1".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_page_size() -> usize {
    100
}

fn default_max_pages() -> usize {
    1000
}

fn default_employees_path() -> String {
    "/funcionarios".to_string()
}

fn default_area_param() -> String {
    "areas".to_string()
}

/// Metric interpretation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Scale survey responses are recorded on.
    #[serde(default)]
    pub scale: ScoreScale,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of areas listed in the ranking tables.
    #[serde(default = "default_top_areas")]
    pub top_areas: usize,

    /// Include the headcount hierarchy section.
    #[serde(default = "default_true")]
    pub include_hierarchy: bool,

    /// Include the tenure distribution section.
    #[serde(default = "default_true")]
    pub include_tenure: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_areas: default_top_areas(),
            include_hierarchy: true,
            include_tenure: true,
        }
    }
}

fn default_top_areas() -> usize {
    10
}

fn default_true() -> bool {
    true
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.hrpulse.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(page_size) = args.page_size {
            self.api.page_size = page_size;
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(scale) = args.scale {
            self.metrics.scale = scale;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
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
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:9876/api/v1");
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.metrics.scale, ScoreScale::Likert7);
        assert!(config.report.include_hierarchy);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "q3.md"
concurrency = 8

[api]
base_url = "https://hr.example.com/api/v1"
employees_path = "/employees"
area_param = "area"

[metrics]
scale = "legacy10"

[report]
top_areas = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "q3.md");
        assert_eq!(config.general.concurrency, 8);
        assert_eq!(config.api.base_url, "https://hr.example.com/api/v1");
        assert_eq!(config.api.employees_path, "/employees");
        assert_eq!(config.api.area_param, "area");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.metrics.scale, ScoreScale::Legacy10);
        assert_eq!(config.report.top_areas, 5);
        assert!(config.report.include_tenure);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[metrics]"));
        assert!(toml_str.contains("likert7"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.api.max_pages, 1000);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[api]\nbase_url = \"http://backend:8000\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.api.base_url, "http://backend:8000");

        std::fs::write(dir.path().join(CONFIG_FILE), "[api\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_cli_overrides_only_explicit_values() {
        let mut config: Config =
            toml::from_str("[api]\nbase_url = \"http://from-file\"\ntimeout_seconds = 30\n")
                .unwrap();
        let args = Args::parse_from(["hrpulse", "--page-size", "50", "--scale", "legacy10"]);

        config.merge_with_args(&args);
        assert_eq!(config.api.base_url, "http://from-file");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.metrics.scale, ScoreScale::Legacy10);
    }
}
