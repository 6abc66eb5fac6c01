//! Diagnostics for the `kayvee` binary.
//!
//! stdout carries the `validate` report and the `route` results (text or
//! JSON) and nothing else, so every tracing event is written to stderr.
//! The filter comes from `RUST_LOG` when set, otherwise from
//! `general.log_level`, which `--log-level` overrides before this runs.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use kayvee_core::config::GeneralConfig;

/// Layout of stderr diagnostics, from `general.log_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiagnosticFormat {
    /// One JSON object per event, for piping into another kayvee consumer
    Json,
    /// Multi-line colored output for a terminal
    Pretty,
}

impl DiagnosticFormat {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(anyhow::anyhow!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )),
        }
    }
}

fn diagnostic_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the stderr subscriber for this process.
///
/// Call once from `main`, after `--log-level` has been folded into `config`.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format = DiagnosticFormat::parse(&config.log_format)?;
    let registry = tracing_subscriber::registry().with(diagnostic_filter(&config.log_level));

    let installed = match format {
        DiagnosticFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        DiagnosticFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install {format:?} diagnostics: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_is_rejected() {
        let config = GeneralConfig {
            log_level: "info".to_owned(),
            log_format: "xml".to_owned(),
        };
        let err = init_tracing(&config).expect_err("unknown format should fail");
        assert!(err.to_string().contains("unknown log format 'xml'"));
    }

    #[test]
    fn test_known_formats_parse() {
        assert_eq!(
            DiagnosticFormat::parse("json").expect("json"),
            DiagnosticFormat::Json
        );
        assert_eq!(
            DiagnosticFormat::parse("pretty").expect("pretty"),
            DiagnosticFormat::Pretty
        );
        assert!(DiagnosticFormat::parse("JSON").is_err());
    }
}
