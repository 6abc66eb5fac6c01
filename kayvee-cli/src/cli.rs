//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// kayvee -- structured log routing toolkit.
///
/// Use `kayvee <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "kayvee", version, about, long_about = None)]
pub struct Cli {
    /// Path to the kayvee.toml configuration file.
    #[arg(short, long, default_value = "kayvee.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a routing config (kvconfig.yml) and list its rules.
    Validate(ValidateArgs),

    /// Route sample records through a routing config.
    Route(RouteArgs),
}

// ---- validate ----

/// Validate a routing config without installing it anywhere.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Routing config to validate (default: `router.routes_path` from kayvee.toml).
    pub path: Option<PathBuf>,
}

// ---- route ----

/// Route JSON records and print the routing result for each one.
#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Routing config to load (default: `router.routes_path` from kayvee.toml).
    pub path: Option<PathBuf>,

    /// A single JSON object to route. Without it, records are read from
    /// stdin, one JSON object per line.
    #[arg(short, long)]
    pub record: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_validate_with_path() {
        let cli = Cli::try_parse_from(["kayvee", "validate", "kvconfig.yml"])
            .expect("should parse 'validate' subcommand");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.path, Some(PathBuf::from("kvconfig.yml")));
            }
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_without_path() {
        let cli = Cli::try_parse_from(["kayvee", "validate"]).expect("parse succeeded");
        match cli.command {
            Commands::Validate(args) => assert!(args.path.is_none()),
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn test_cli_parse_route_with_record() {
        let cli = Cli::try_parse_from([
            "kayvee",
            "route",
            "kvconfig.yml",
            "--record",
            r#"{"title":"hi"}"#,
        ])
        .expect("should parse route with record");
        match cli.command {
            Commands::Route(args) => {
                assert_eq!(args.path, Some(PathBuf::from("kvconfig.yml")));
                assert_eq!(args.record.as_deref(), Some(r#"{"title":"hi"}"#));
            }
            _ => panic!("expected Route command"),
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["kayvee", "validate"]).expect("parse succeeded");
        assert_eq!(cli.config, PathBuf::from("kayvee.toml"));
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kayvee",
            "route",
            "--output",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("global flags should be accepted after the subcommand");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_rejects_unknown_output_format() {
        let result = Cli::try_parse_from(["kayvee", "--output", "yaml", "validate"]);
        assert!(result.is_err(), "unknown output format should be rejected");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["kayvee"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
