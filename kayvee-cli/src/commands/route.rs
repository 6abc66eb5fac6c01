//! `kayvee route` command handler

use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use kayvee_core::config::KayveeConfig;
use kayvee_router::{Record, Router, RoutingResult};

use crate::cli::RouteArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `route` command.
pub async fn execute(
    args: RouteArgs,
    config: &KayveeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let path = super::routes_path(args.path, config);

    let router = Router::with_identity(config.identity());
    router.load_config_file(&path).await?;
    info!(path = %path.display(), rules = router.rule_count(), "routing config loaded");

    let records = match args.record {
        Some(text) => vec![parse_record(&text, 1)?],
        None => read_stdin_records().await?,
    };

    let report = route_records(&router, records);
    writer.render(&report)?;

    Ok(())
}

/// Parse one JSON object. `line` is used only for error messages.
pub fn parse_record(text: &str, line: usize) -> Result<Record, CliError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(CliError::Command(format!(
            "record {line}: expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CliError::Command(format!("record {line}: invalid JSON: {e}"))),
    }
}

/// Parse newline-delimited JSON objects, skipping blank lines.
pub fn parse_records(text: &str) -> Result<Vec<Record>, CliError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_record(line, i + 1))
        .collect()
}

async fn read_stdin_records() -> Result<Vec<Record>, CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut records = Vec::new();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_record(&line, line_no)?);
    }

    debug!(count = records.len(), "records read from stdin");
    Ok(records)
}

/// Route every record and collect the results in input order.
pub fn route_records(router: &Router, records: Vec<Record>) -> RouteReport {
    let results: Vec<RoutingResult> = records.iter().map(|r| router.route(r)).collect();
    RouteReport {
        records: results.len(),
        matched: results.iter().filter(|r| !r.is_empty()).count(),
        results,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub records: usize,
    pub matched: usize,
    pub results: Vec<RoutingResult>,
}

impl Render for RouteReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Routed {} record(s), {} matched",
            self.records.to_string().bold(),
            self.matched.to_string().bold()
        )?;

        for (i, result) in self.results.iter().enumerate() {
            writeln!(w)?;
            writeln!(w, "record {} ({} route(s))", i + 1, result.routes.len())?;
            if result.routes.is_empty() {
                writeln!(w, "  {}", "no matching rules".yellow())?;
            }
            for route in &result.routes {
                let rule = route.get("rule").and_then(Value::as_str).unwrap_or("?");
                let kind = route.get("type").and_then(Value::as_str).unwrap_or("-");
                writeln!(w, "  {} [{}]", rule.green(), kind)?;
                for (key, value) in route
                    .iter()
                    .filter(|(k, _)| k.as_str() != "rule" && k.as_str() != "type")
                {
                    writeln!(w, "    {key}: {value}")?;
                }
            }
        }

        Ok(())
    }
}
