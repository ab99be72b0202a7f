//! The `clinscore validate` command.

use std::path::PathBuf;

use anyhow::Result;

use clinscore_core::model::InputPolicy;
use clinscore_core::parser::{load_case_sets, validate_case_set};

pub fn execute(cases_path: PathBuf, policy: String) -> Result<()> {
    let policy: InputPolicy = policy.parse().map_err(anyhow::Error::msg)?;
    let sets = load_case_sets(&cases_path)?;

    let mut total_warnings = 0;

    for set in &sets {
        println!("Case set: {} ({} cases)", set.name, set.cases.len());

        let warnings = validate_case_set(set, policy);
        for w in &warnings {
            let prefix = w
                .case_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All case sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
