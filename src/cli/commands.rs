//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Personio source connector
#[derive(Parser, Debug)]
#[command(name = "personio-source")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON, takes precedence over --config
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show connector specification
    Spec,

    /// Validate the configuration
    Check {
        /// Also exchange the credentials for a token
        #[arg(long)]
        live: bool,
    },

    /// Discover available streams
    Discover,

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_read() {
        let cli = Cli::parse_from([
            "personio-source",
            "read",
            "--streams",
            "employees,attendances",
            "--max-records",
            "10",
            "--config-json",
            "{}",
        ]);
        assert_eq!(cli.config_json.as_deref(), Some("{}"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Read {
                streams,
                max_records,
            } => {
                assert_eq!(streams.as_deref(), Some("employees,attendances"));
                assert_eq!(max_records, Some(10));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_live() {
        let cli = Cli::parse_from(["personio-source", "--config", "cfg.json", "check", "--live"]);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        assert!(matches!(cli.command, Commands::Check { live: true }));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
