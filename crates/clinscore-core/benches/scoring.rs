use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use clinscore_core::calculators::{compute_alvarado, compute_apache_ii, AlvaradoInput, ApacheInput};
use clinscore_core::engine::evaluate;
use clinscore_core::model::{InputPolicy, ScoreKind, ScoreOutcome};
use clinscore_core::report::CaseOutcome;
use clinscore_core::statistics::compute_summary;

fn bench_calculators(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculators");

    let alvarado = AlvaradoInput {
        migratory_pain: true,
        rlq_tenderness: true,
        leukocytosis: true,
        fever: true,
        ..Default::default()
    };
    let apache = ApacheInput {
        temperature_c: 39.2,
        heart_rate: 135.0,
        arterial_ph: 7.28,
        creatinine: 2.1,
        acute_renal_failure: true,
        age_years: 71.0,
        ..Default::default()
    };

    group.bench_function("alvarado", |b| {
        b.iter(|| compute_alvarado(black_box(&alvarado)))
    });

    group.bench_function("apache_ii", |b| {
        b.iter(|| compute_apache_ii(black_box(&apache)))
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let air = json!({
        "vomiting": true,
        "rlq_pain": true,
        "temperature_c": 38.7,
        "leukocytes": 16.0,
        "neutrophils_pct": 86.0,
        "crp_mg_l": 60.0
    });
    let pathway = json!({
        "alvarado": { "rlq_tenderness": true, "leukocytosis": true, "fever": true },
        "conditions": { "elderly": true }
    });

    group.bench_function("air_strict", |b| {
        b.iter(|| evaluate(ScoreKind::Air, black_box(&air), InputPolicy::Strict))
    });

    group.bench_function("air_lenient_empty", |b| {
        b.iter(|| evaluate(ScoreKind::Air, black_box(&json!({})), InputPolicy::Lenient))
    });

    group.bench_function("pathway", |b| {
        b.iter(|| {
            evaluate(
                ScoreKind::AppendicitisPathway,
                black_box(&pathway),
                InputPolicy::Strict,
            )
        })
    });

    group.finish();
}

fn make_outcomes(n: usize) -> Vec<CaseOutcome> {
    (0..n)
        .map(|i| {
            let kind = ScoreKind::ALL[i % ScoreKind::ALL.len()];
            CaseOutcome {
                case_id: format!("case_{i}"),
                case_name: format!("Case {i}"),
                tags: vec![],
                outcome: ScoreOutcome {
                    calculator: kind,
                    points: (i % 12) as f64,
                    band: "low".into(),
                    label: if i % 3 == 0 { "High".into() } else { "Low".into() },
                    rank: (i % 3) as u8,
                    description: String::new(),
                    recommendation: String::new(),
                    details: serde_json::Value::Null,
                    warnings: vec![],
                },
            }
        })
        .collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    let small = make_outcomes(50);
    let large = make_outcomes(5000);

    group.bench_function("50_outcomes", |b| {
        b.iter(|| compute_summary(black_box(&small), &[]))
    });

    group.bench_function("5000_outcomes", |b| {
        b.iter(|| compute_summary(black_box(&large), &[]))
    });

    group.finish();
}

criterion_group!(benches, bench_calculators, bench_evaluate, bench_summary);
criterion_main!(benches);
