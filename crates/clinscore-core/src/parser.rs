//! TOML case-set parser.
//!
//! Loads case sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::{lookup, required_paths, unknown_fields};
use crate::error::ScoreError;
use crate::model::{CaseSet, InputPolicy, ScoreCase, ScoreKind};

/// Intermediate TOML structure for parsing case-set files.
#[derive(Debug, Deserialize)]
struct TomlCaseFile {
    case_set: TomlCaseSetHeader,
    #[serde(default)]
    cases: Vec<TomlCase>,
}

#[derive(Debug, Deserialize)]
struct TomlCaseSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlCase {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    calculator: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    input: serde_json::Map<String, serde_json::Value>,
}

/// Parse a single TOML file into a `CaseSet`.
pub fn parse_case_set(path: &Path) -> Result<CaseSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read case set file: {}", path.display()))?;

    parse_case_set_str(&content, path)
}

/// Parse a TOML string into a `CaseSet` (useful for testing).
pub fn parse_case_set_str(content: &str, source_path: &Path) -> Result<CaseSet> {
    let parsed: TomlCaseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cases = parsed
        .cases
        .into_iter()
        .map(|c| {
            let calculator: ScoreKind = c
                .calculator
                .parse()
                .map_err(|_: String| ScoreError::UnknownCalculator(c.calculator.clone()))
                .with_context(|| format!("case '{}'", c.id))?;

            Ok(ScoreCase {
                id: c.id,
                name: c.name,
                description: c.description,
                calculator,
                input: serde_json::Value::Object(c.input),
                tags: c.tags,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CaseSet {
        id: parsed.case_set.id,
        name: parsed.case_set.name,
        description: parsed.case_set.description,
        cases,
    })
}

/// Recursively load all `.toml` case-set files from a directory.
pub fn load_case_directory(dir: &Path) -> Result<Vec<CaseSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_case_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_case_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a single file or every case set under a directory.
pub fn load_case_sets(path: &Path) -> Result<Vec<CaseSet>> {
    if path.is_dir() {
        load_case_directory(path)
    } else {
        Ok(vec![parse_case_set(path)?])
    }
}

/// A warning from case-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The case ID (if applicable).
    pub case_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a case set for common issues.
///
/// Missing required fields are reported when `policy` is strict, since those
/// cases would fail at run time.
pub fn validate_case_set(set: &CaseSet, policy: InputPolicy) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.cases.is_empty() {
        warnings.push(ValidationWarning {
            case_id: None,
            message: "case set contains no cases".into(),
        });
    }

    // Check for duplicate case IDs
    let mut seen_ids = HashSet::new();
    for case in &set.cases {
        if !seen_ids.insert(&case.id) {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: format!("duplicate case ID: {}", case.id),
            });
        }
    }

    for case in &set.cases {
        let is_empty = case.input.as_object().map_or(true, |m| m.is_empty());
        if is_empty {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: "input table is empty".into(),
            });
        }

        for path in unknown_fields(case.calculator, &case.input) {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: format!("unknown input key for {}: {path}", case.calculator),
            });
        }

        if policy == InputPolicy::Strict {
            let missing: Vec<String> = required_paths(case.calculator, &case.input)
                .into_iter()
                .filter(|path| lookup(&case.input, path).is_none())
                .collect();
            if !missing.is_empty() {
                warnings.push(ValidationWarning {
                    case_id: Some(case.id.clone()),
                    message: format!("missing required input: {}", missing.join(", ")),
                });
            }
        }
    }

    warnings
}
