//! The `clinscore score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use clinscore_core::catalogue::info;
use clinscore_core::config::load_config_from;
use clinscore_core::engine::evaluate;
use clinscore_core::model::{ScoreKind, ScoreOutcome};

use super::resolve_policy;

pub fn execute(
    calculator: String,
    input: Option<String>,
    input_file: Option<PathBuf>,
    policy: Option<String>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let kind: ScoreKind = calculator.parse().map_err(anyhow::Error::msg)?;
    let config = load_config_from(config_path.as_deref())?;
    let policy = resolve_policy(policy.as_deref(), config.input_policy)?;

    let raw = match (input, input_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read input file: {}", path.display()))?,
        (None, None) => "{}".to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("input is not valid JSON")?;

    let outcome = evaluate(kind, &value, policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &ScoreOutcome) {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![
        Cell::new("Calculator"),
        Cell::new(info(outcome.calculator).name),
    ]);
    table.add_row(vec![Cell::new("Score"), Cell::new(outcome.points)]);
    table.add_row(vec![Cell::new("Band"), Cell::new(&outcome.label)]);
    table.add_row(vec![Cell::new("Description"), Cell::new(&outcome.description)]);
    table.add_row(vec![
        Cell::new("Recommendation"),
        Cell::new(&outcome.recommendation),
    ]);
    for warning in &outcome.warnings {
        table.add_row(vec![Cell::new("Warning"), Cell::new(warning)]);
    }

    println!("{table}");
}
