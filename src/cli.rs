//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::ScoreScale;
use clap::Parser;
use std::path::PathBuf;

/// HRPulse - engagement metrics from your HR backend
///
/// Fetches employee survey data page by page, computes eNPS, mean
/// satisfaction and headcount rollups per area, and writes a report.
///
/// Examples:
///   hrpulse
///   hrpulse --company 3f2a... --format json --output metrics.json
///   hrpulse --area 9c1e...,77ab... --api-url http://hr.internal/api/v1
///   hrpulse --directorate Operations
///   hrpulse --fail-below 0
///   hrpulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the HR backend API
    ///
    /// Overrides `[api].base_url` from .hrpulse.toml.
    #[arg(long, value_name = "URL", env = "HRPULSE_API_URL")]
    pub api_url: Option<String>,

    /// Company to report on
    ///
    /// If not specified, the first company returned by the backend is used.
    #[arg(long, value_name = "ID")]
    pub company: Option<String>,

    /// Restrict the report to these areas (comma-separated ids)
    ///
    /// Skips the hierarchy lookup; areas are reported in the given order.
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub area: Option<Vec<String>>,

    /// Restrict the report to one directorate (id or name)
    #[arg(long, value_name = "ID", conflicts_with = "area")]
    pub directorate: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Employees requested per page (1-100)
    #[arg(long, value_name = "COUNT")]
    pub page_size: Option<usize>,

    /// Number of areas fetched concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Scale survey responses are recorded on
    ///
    /// likert7 is canonical; legacy10 exists for older exports only.
    #[arg(long, value_name = "SCALE")]
    pub scale: Option<ScoreScale>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .hrpulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail if the company eNPS is below this value
    ///
    /// Useful for scheduled checks. Exit code 2 when below threshold.
    #[arg(long, value_name = "ENPS", allow_negative_numbers = true)]
    pub fail_below: Option<i32>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .hrpulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(page_size) = self.page_size {
            if !(1..=crate::api::MAX_PAGE_SIZE).contains(&page_size) {
                return Err(format!(
                    "Page size must be between 1 and {}",
                    crate::api::MAX_PAGE_SIZE
                ));
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(threshold) = self.fail_below {
            if !(-100..=100).contains(&threshold) {
                return Err("--fail-below must be between -100 and 100".to_string());
            }
        }

        if let Some(ref areas) = self.area {
            if areas.iter().any(|a| a.trim().is_empty()) {
                return Err("Area ids must not be empty".to_string());
            }
        }

        if self.directorate.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err("Directorate must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general].verbose`; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["hrpulse"];
        argv.extend_from_slice(args);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.area.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_area_list() {
        let args = parse(&["--area", "a1,a2", "--area", "a3"]);
        assert_eq!(
            args.area,
            Some(vec!["a1".to_string(), "a2".to_string(), "a3".to_string()])
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        let args = parse(&["--api-url", "localhost:9876"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_page_size() {
        assert!(parse(&["--page-size", "0"]).validate().is_err());
        assert!(parse(&["--page-size", "101"]).validate().is_err());
        assert!(parse(&["--page-size", "100"]).validate().is_ok());
    }

    #[test]
    fn test_negative_threshold() {
        let args = parse(&["--fail-below", "-20"]);
        assert_eq!(args.fail_below, Some(-20));
        assert!(args.validate().is_ok());

        assert!(parse(&["--fail-below", "150"]).validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let args = parse(&["--verbose", "--quiet"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&[]);
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let args = parse(&[]);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        let args = parse(&["--quiet"]);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_directorate_filter() {
        let args = parse(&["--directorate", "d1"]);
        assert_eq!(args.directorate.as_deref(), Some("d1"));
        assert!(args.validate().is_ok());

        assert!(parse(&["--directorate", " "]).validate().is_err());
        assert!(Args::try_parse_from(["hrpulse", "--directorate", "d1", "--area", "a1"]).is_err());
    }
}
