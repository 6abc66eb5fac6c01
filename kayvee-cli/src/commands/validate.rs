//! `kayvee validate` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use kayvee_core::config::KayveeConfig;
use kayvee_router::{ConfigLoader, Rule, RouterError};

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `validate` command.
///
/// An unreadable routing file is an IO failure; every other load error is a
/// configuration failure.
pub async fn execute(
    args: ValidateArgs,
    config: &KayveeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let path = super::routes_path(args.path, config);
    let (report, error) = load_report(&path).await;

    writer.render(&report)?;

    match error {
        None => Ok(()),
        Some(err @ RouterError::ConfigLoad { .. }) => Err(err.into()),
        Some(_) => Err(CliError::Config(format!(
            "{} is invalid ({} error(s))",
            report.path,
            report.errors.len()
        ))),
    }
}

/// Load the routing config and summarise the outcome.
///
/// Never fails: load errors are reported inside the returned report.
pub async fn build_report(path: &Path) -> ValidationReport {
    load_report(path).await.0
}

/// Like [`build_report`], but also hands back the load error for exit code mapping.
pub async fn load_report(path: &Path) -> (ValidationReport, Option<RouterError>) {
    info!(path = %path.display(), "validating routing config");

    match ConfigLoader::load_file(path).await {
        Ok(rules) => (
            ValidationReport {
                path: path.display().to_string(),
                valid: true,
                rules: rules.iter().map(RuleSummary::from).collect(),
                errors: Vec::new(),
            },
            None,
        ),
        Err(e) => (
            ValidationReport {
                path: path.display().to_string(),
                valid: false,
                rules: Vec::new(),
                errors: error_lines(&e),
            },
            Some(e),
        ),
    }
}

fn error_lines(err: &RouterError) -> Vec<String> {
    match err {
        RouterError::ConfigValidation { errors } => errors.clone(),
        RouterError::MissingEnvironment { names } => names
            .iter()
            .map(|name| format!("missing env var: {name}"))
            .collect(),
        other => vec![other.to_string()],
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub path: String,
    pub valid: bool,
    pub rules: Vec<RuleSummary>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub matchers: usize,
}

impl From<&Rule> for RuleSummary {
    fn from(rule: &Rule) -> Self {
        Self {
            name: rule.name().to_owned(),
            kind: rule.kind().map(|k| k.as_str().to_owned()),
            matchers: rule.matchers().fields().len(),
        }
    }
}

impl Render for ValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Routing Config: {}", self.path.bold())?;

        if self.valid {
            writeln!(
                w,
                "  {} ({} rules)",
                "valid".green(),
                self.rules.len().to_string().bold()
            )?;
            if !self.rules.is_empty() {
                writeln!(w)?;
                writeln!(w, "{:<30} {:<15} Matchers", "Rule", "Type")?;
                writeln!(w, "{}", "-".repeat(55))?;
                for r in &self.rules {
                    writeln!(
                        w,
                        "{:<30} {:<15} {}",
                        r.name,
                        r.kind.as_deref().unwrap_or("-"),
                        r.matchers
                    )?;
                }
            }
        } else {
            writeln!(w, "  {}", "invalid".red())?;
            writeln!(w)?;
            writeln!(w, "Errors:")?;
            for e in &self.errors {
                writeln!(w, "  {}", e.red())?;
            }
        }

        Ok(())
    }
}
