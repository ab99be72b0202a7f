use criterion::{black_box, criterion_group, criterion_main, Criterion};

use clinscore_core::model::InputPolicy;
use clinscore_core::parser::{parse_case_set_str, validate_case_set};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    // Generate case-set TOML strings of various sizes
    let small_toml = generate_case_set_toml(5);
    let medium_toml = generate_case_set_toml(50);
    let large_toml = generate_case_set_toml(200);

    group.bench_function("5_cases", |b| {
        b.iter(|| parse_case_set_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("50_cases", |b| {
        b.iter(|| parse_case_set_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_cases", |b| {
        b.iter(|| parse_case_set_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let set = parse_case_set_str(&generate_case_set_toml(200), "bench.toml".as_ref())
        .expect("benchmark TOML parses");

    c.bench_function("validate_200_cases", |b| {
        b.iter(|| validate_case_set(black_box(&set), InputPolicy::Strict))
    });
}

fn generate_case_set_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[case_set]
id = "bench"
name = "Benchmark"
"#,
    );
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[cases]]
id = "air_{i}"
name = "AIR {i}"
calculator = "air"
tags = ["bench"]

[cases.input]
vomiting = {vomiting}
rlq_pain = true
temperature_c = 38.{t}
leukocytes = 1{t}.5
neutrophils_pct = 8{t}.0
crp_mg_l = {crp}.0
"#,
            vomiting = i % 2 == 0,
            t = i % 10,
            crp = i % 80,
        ));
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_validation);
criterion_main!(benches);
