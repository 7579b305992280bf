//! Benchmarks for rule parsing and chain execution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rulechain_core::{ChainSpec, Map, RuleMap, RuleParser, TransformContext, Value};
use serde_json::json;

fn create_test_data(contacts: usize) -> Map {
    let contacts: Vec<serde_json::Value> = (0..contacts)
        .map(|i| {
            json!({
                "first_name": format!("  person {i} "),
                "home_phone": "123-456-7890",
                "cell_phone": "(555) 010-0000",
                "joined": "2020-05-24"
            })
        })
        .collect();

    match Value::from(json!({ "contacts": contacts })) {
        Value::Map(map) => map,
        _ => unreachable!(),
    }
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    group.bench_function("simple_chain", |b| {
        let chain = ChainSpec::from("trim|titlecase");
        b.iter(|| RuleParser::expand(black_box(&chain)))
    });

    group.bench_function("chain_with_arguments", |b| {
        let chain = ChainSpec::from("?|trim|regex_replace:[^0-9],,:value:|pad:5@int,0@str|->format:m/d/Y");
        b.iter(|| RuleParser::expand(black_box(&chain)))
    });

    group.finish();
}

fn bench_single_value(c: &mut Criterion) {
    let context = TransformContext::with_builtins();
    let mut group = c.benchmark_group("single_value");

    group.bench_function("string_functions", |b| {
        b.iter(|| context.transform(black_box("   uncle bob  "), "trim|titlecase", None))
    });

    group.bench_function("date_delegation", |b| {
        b.iter(|| {
            context.transform(
                black_box("2020-05-24"),
                "trim|Date|->addDays:1|->format:m/d/Y",
                None,
            )
        })
    });

    group.finish();
}

fn bench_wildcards(c: &mut Criterion) {
    let context = TransformContext::with_builtins();
    let mut group = c.benchmark_group("wildcards");

    for size in [10, 100, 1000] {
        let data = create_test_data(size);
        let rules = RuleMap::new()
            .rule("contacts.*.*name", "trim|titlecase")
            .rule("contacts.*.*phone", "strip_non_digits")
            .rule("contacts.*.joined", "Date|->format:d/m/Y");

        group.bench_with_input(BenchmarkId::new("explode", size), &data, |b, data| {
            b.iter(|| RuleParser::new(black_box(data)).explode(&rules))
        });

        group.bench_with_input(BenchmarkId::new("transform_data", size), &data, |b, data| {
            b.iter(|| context.transform_data(black_box(data.clone()), rules.clone()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_single_value, bench_wildcards);
criterion_main!(benches);
