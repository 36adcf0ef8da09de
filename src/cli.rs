//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// rakdash - shelf interaction dashboard for minimarket camera logs
///
/// Reads a CSV interaction log (timestamp, shelf, duration), computes
/// summary statistics, and renders a Markdown or JSON dashboard. With
/// --insight it additionally asks Gemini for a natural-language summary
/// of recent interactions.
///
/// Examples:
///   rakdash
///   rakdash --log-file interaksi_log.csv --output dashboard.md
///   rakdash --insight --sample-size 15
///   rakdash --format json --output dashboard.json
///   rakdash --check
///   rakdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the CSV interaction log
    ///
    /// The header must be `timestamp,rak,durasi_detik`. Defaults to
    /// interaksi_log.csv in the working directory, or the config value.
    #[arg(short, long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Request an AI-generated insight for the dashboard
    ///
    /// Makes a single Gemini API call over the most recent records.
    /// Requires the API key environment variable (GEMINI_API_KEY unless
    /// configured otherwise); a failed call is reported in the dashboard.
    #[arg(short, long)]
    pub insight: bool,

    /// Number of trailing records sent to the insight service
    #[arg(long, default_value = "10", value_name = "N")]
    pub sample_size: usize,

    /// Gemini model to query
    ///
    /// Can also be set via RAKDASH_MODEL env var or .rakdash.toml config.
    #[arg(short, long, default_value = "gemini-1.5-flash", env = "RAKDASH_MODEL")]
    pub model: String,

    /// Base URL of the generative-language API
    #[arg(
        long,
        default_value = "https://generativelanguage.googleapis.com/v1beta",
        value_name = "URL"
    )]
    pub endpoint: String,

    /// Insight request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (markdown, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the dashboard to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .rakdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Validate the log file and exit without rendering
    ///
    /// Loads and type-checks every row; no dashboard, no network calls.
    #[arg(long)]
    pub check: bool,

    /// Generate a default .rakdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
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

        // Validate endpoint URL format
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate sample size
        if self.sample_size == 0 {
            return Err("Sample size must be at least 1".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.check && self.insight {
            return Err("--check never calls the insight service; drop one of the flags".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            log_file: None,
            insight: false,
            sample_size: 10,
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: None,
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            check: false,
            init_config: false,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_endpoint() {
        let mut args = make_args();
        args.endpoint = "generativelanguage.googleapis.com".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sample_size() {
        let mut args = make_args();
        args.sample_size = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.check = true;
        args.insight = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.sample_size = 0;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_flags() {
        let args = Args::parse_from([
            "rakdash",
            "--log-file",
            "logs/march.csv",
            "--insight",
            "--sample-size",
            "15",
            "--format",
            "json",
        ]);

        assert_eq!(args.log_file, Some(PathBuf::from("logs/march.csv")));
        assert!(args.insight);
        assert_eq!(args.sample_size, 15);
        assert_eq!(args.format, OutputFormat::Json);
    }
}
