//! Command-line interface definition.

use crate::core::types::Algorithm;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MalDetect: upload files to a MalDetect server and report its verdicts
#[derive(Parser, Debug)]
#[command(name = "maldetect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Server base URL (overrides the configuration file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Use this configuration file instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine processing
    Json,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan many files one after another
    BulkScan {
        /// Files or directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Model the server should use
        #[arg(short, long, value_enum)]
        algo: Option<Algorithm>,

        /// Descend into directories
        #[arg(short, long)]
        recursive: bool,

        /// Export results as CSV (optionally to PATH)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        csv: Option<Option<PathBuf>>,

        /// Export an HTML report (optionally to PATH)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        html: Option<Option<PathBuf>>,

        /// Write the full run report as JSON
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,

        /// Pause between uploads in milliseconds
        #[arg(long, value_name = "N")]
        delay_ms: Option<u64>,
    },

    /// Scan a single file and show model details
    Scan {
        /// File to scan
        path: PathBuf,

        /// Model the server should use
        #[arg(short, long, value_enum)]
        algo: Option<Algorithm>,
    },

    /// Check that the server is reachable
    Health,

    /// Show server-side scan statistics
    Dashboard {
        /// Export recent scans as CSV (optionally to PATH)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show application information
    Info,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the configuration file location
    Path,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_scan_args() {
        let cli = Cli::try_parse_from([
            "maldetect",
            "bulk-scan",
            "a.exe",
            "b.txt",
            "--algo",
            "svm",
            "--csv",
            "--html",
            "report.html",
            "--delay-ms",
            "0",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::BulkScan {
                paths,
                algo,
                csv,
                html,
                json,
                delay_ms,
                recursive,
            }) => {
                assert_eq!(paths.len(), 2);
                assert_eq!(algo, Some(Algorithm::Svm));
                assert_eq!(csv, Some(None));
                assert_eq!(html, Some(Some(PathBuf::from("report.html"))));
                assert!(json.is_none());
                assert_eq!(delay_ms, Some(0));
                assert!(!recursive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "maldetect",
            "health",
            "--server",
            "http://scanner:5000",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.server.as_deref(), Some("http://scanner:5000"));
        assert!(matches!(cli.command, Some(Commands::Health)));
    }

    #[test]
    fn test_bulk_scan_requires_paths() {
        assert!(Cli::try_parse_from(["maldetect", "bulk-scan"]).is_err());
    }
}
