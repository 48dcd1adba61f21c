use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rowsift::accessor::{Getter, GetterSpec, MatcherSpec};
use rowsift::matching::MatcherSet;
use rowsift::rows;
use serde_json::{Value, json};

fn fixture(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "id": i,
                    "age": i % 90,
                    "name": {"first": format!("f{}", i), "last": format!("l{}", i % 50)},
                    "tags": ["one", "two"]
                })
            })
            .collect(),
    )
}

fn filter_by_matchers(c: &mut Criterion) {
    let data = fixture(10_000);
    // compiled once, reused across iterations
    let set = MatcherSet::all(vec![
        MatcherSpec::new("age", json!(42)),
        MatcherSpec::new("tags", json!(["two", "ten"])).partial(),
    ]);
    c.bench_function("filter 10k rows, conjunction of two matchers", |b| {
        b.iter(|| rows::filter_by_matchers(black_box(data.clone()), &set))
    });
}

fn group_by_deep_path(c: &mut Criterion) {
    let data = fixture(10_000);
    let getter = Getter::compile(GetterSpec::from(["name", "last"]));
    c.bench_function("group 10k rows by a two-step path", |b| {
        b.iter(|| rows::group_by(black_box(data.clone()), &getter))
    });
}

fn tally_deep_path(c: &mut Criterion) {
    let data = fixture(10_000);
    let getter = Getter::compile(GetterSpec::from(["name", "last"]));
    c.bench_function("tally 10k rows by a two-step path", |b| {
        b.iter(|| rows::tally(black_box(&data), &getter))
    });
}

criterion_group!(benches, filter_by_matchers, group_by_deep_path, tally_deep_path);
criterion_main!(benches);
