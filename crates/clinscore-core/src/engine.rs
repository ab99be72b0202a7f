//! Evaluation dispatch and the batch engine.
//!
//! [`evaluate`] turns a raw JSON input record into a [`ScoreOutcome`] for any
//! calculator, applying the input policy. [`ScoreEngine`] runs a whole case
//! set and collects the outcomes into a [`ScoreReport`].

use std::time::{Duration, Instant};

use serde_json::Value;
use uuid::Uuid;

use crate::catalogue::with_calculator;
use crate::error::ScoreError;
use crate::model::{CaseSet, InputPolicy, ScoreKind, ScoreOutcome};
use crate::report::{CaseFailure, CaseOutcome, CaseSetSummary, ScoreReport};
use crate::statistics::compute_summary;
use crate::traits::{Assessment, ScoreCalculator};

/// Look up a dotted path; `null` counts as absent.
pub(crate) fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}

/// Supplied paths in `raw` that no field in `known` accounts for.
///
/// Objects are descended only where `known` lists nested fields beneath them;
/// a non-object under such a key is left for deserialization to reject.
pub(crate) fn unknown_paths(raw: &Value, known: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    collect_unknown(raw, "", known, &mut out);
    out
}

fn collect_unknown(value: &Value, prefix: &str, known: &[String], out: &mut Vec<String>) {
    let Value::Object(map) = value else {
        return;
    };
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let nested_prefix = format!("{path}.");
        if known.iter().any(|k| k.starts_with(&nested_prefix)) {
            collect_unknown(child, &path, known, out);
        } else if !known.contains(&path) {
            out.push(path);
        }
    }
}

fn evaluate_with<C: ScoreCalculator>(
    calc: &C,
    raw: &Value,
    policy: InputPolicy,
) -> Result<ScoreOutcome, ScoreError> {
    let kind = calc.kind();
    let raw = match raw {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(_) => raw.clone(),
        other => {
            return Err(ScoreError::MalformedInput {
                calculator: kind,
                message: format!("expected an object, got {other}"),
            })
        }
    };

    let unknown = unknown_paths(&raw, &calc.known_fields());
    if policy == InputPolicy::Strict {
        if let Some(field) = unknown.first() {
            return Err(ScoreError::UnknownInput {
                calculator: kind,
                field: field.clone(),
            });
        }
    }

    let missing: Vec<String> = calc
        .required_paths(&raw)
        .into_iter()
        .filter(|path| lookup(&raw, path).is_none())
        .collect();
    if policy == InputPolicy::Strict {
        if let Some(first) = missing.first() {
            return Err(ScoreError::MissingInput(first.clone()));
        }
    }

    let input: C::Input =
        serde_json::from_value(raw.clone()).map_err(|e| ScoreError::MalformedInput {
            calculator: kind,
            message: e.to_string(),
        })?;
    let mut outcome = calc.compute(&input)?.to_outcome(kind);

    if !missing.is_empty() {
        let baseline = serde_json::to_value(C::Input::default()).unwrap_or_default();
        for path in &missing {
            let note = match lookup(&baseline, path) {
                Some(value) => format!("{path} not supplied; baseline {value} used"),
                None => format!("{path} not supplied; baseline used"),
            };
            outcome.warnings.push(note);
        }
    }
    for path in &unknown {
        outcome
            .warnings
            .push(format!("{path} is not an input of {kind}; ignored"));
    }

    Ok(outcome)
}

/// Evaluate one raw input record with the named calculator.
pub fn evaluate(
    kind: ScoreKind,
    raw: &Value,
    policy: InputPolicy,
) -> Result<ScoreOutcome, ScoreError> {
    with_calculator!(kind, calc => evaluate_with(calc, raw, policy))
}

/// Every field the calculator's input understands, as dotted paths.
pub fn known_fields(kind: ScoreKind) -> Vec<String> {
    with_calculator!(kind, calc => calc.known_fields())
}

/// Supplied fields the calculator does not read, as dotted paths.
pub fn unknown_fields(kind: ScoreKind, raw: &Value) -> Vec<String> {
    unknown_paths(raw, &known_fields(kind))
}

/// Fields the strict policy would require for this raw record.
pub fn required_paths(kind: ScoreKind, raw: &Value) -> Vec<String> {
    with_calculator!(kind, calc => calc.required_paths(raw))
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_case_start(&self, case_id: &str, calculator: ScoreKind);
    fn on_case_complete(&self, outcome: &CaseOutcome);
    fn on_case_error(&self, case_id: &str, calculator: ScoreKind, error: &ScoreError);
    fn on_set_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_case_start(&self, _: &str, _: ScoreKind) {}
    fn on_case_complete(&self, _: &CaseOutcome) {}
    fn on_case_error(&self, _: &str, _: ScoreKind, _: &ScoreError) {}
    fn on_set_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Runs every case of a case set.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    policy: InputPolicy,
}

impl ScoreEngine {
    pub fn new(policy: InputPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    /// Evaluate every case. A failing case is recorded and the run goes on.
    pub fn run(&self, case_set: &CaseSet, progress: &dyn ProgressReporter) -> ScoreReport {
        let start = Instant::now();
        let mut outcomes = Vec::new();
        let mut failures = Vec::new();

        for case in &case_set.cases {
            progress.on_case_start(&case.id, case.calculator);
            tracing::debug!(case = %case.id, calculator = %case.calculator, "evaluating case");

            match evaluate(case.calculator, &case.input, self.policy) {
                Ok(outcome) => {
                    let result = CaseOutcome {
                        case_id: case.id.clone(),
                        case_name: case.name.clone(),
                        tags: case.tags.clone(),
                        outcome,
                    };
                    progress.on_case_complete(&result);
                    outcomes.push(result);
                }
                Err(e) => {
                    tracing::warn!("case {} ({}) failed: {e}", case.id, case.calculator);
                    progress.on_case_error(&case.id, case.calculator, &e);
                    failures.push(CaseFailure {
                        case_id: case.id.clone(),
                        calculator: case.calculator,
                        error: e.to_string(),
                        permanent: e.is_permanent(),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_set_complete(
            case_set.cases.len(),
            outcomes.len(),
            failures.len(),
            elapsed,
        );
        tracing::info!(
            "case set {} complete: {} evaluated, {} failed",
            case_set.id,
            outcomes.len(),
            failures.len()
        );

        let summary = compute_summary(&outcomes, &failures);

        ScoreReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            case_set: CaseSetSummary {
                id: case_set.id.clone(),
                name: case_set.name.clone(),
                case_count: case_set.cases.len(),
            },
            policy: self.policy,
            outcomes,
            failures,
            summary,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}
