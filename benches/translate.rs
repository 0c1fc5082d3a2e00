use criterion::{Criterion, black_box, criterion_group, criterion_main};
use docgate::{QueryParams, coerce, translate};

fn typical_params() -> QueryParams {
    QueryParams::new([
        ("status", "active"),
        ("age_gte", "21"),
        ("score_lt", "99.5"),
        ("tags_in", "a,b,c,d,e"),
        ("order_by", "-created_at,name"),
        ("fields", "name,email,status"),
        ("limit", "50"),
        ("offset", "10"),
    ])
}

fn translate_bench(c: &mut Criterion) {
    let params = typical_params();
    c.bench_function("translate_typical_query", |b| {
        b.iter(|| {
            let plan = translate(black_box(&params)).expect("valid query");
            black_box(plan);
        });
    });
}

fn wide_query_bench(c: &mut Criterion) {
    let pairs: Vec<(String, String)> = (0..200)
        .map(|i| (format!("field{i}_gte"), i.to_string()))
        .collect();
    let params = QueryParams::new(pairs);
    c.bench_function("translate_200_predicates", |b| {
        b.iter(|| black_box(translate(black_box(&params))));
    });
}

fn coerce_bench(c: &mut Criterion) {
    let inputs = ["42", "3.14", "1.0.0", "007", "hello", "1e3", " 12 ", ""];
    c.bench_function("coerce_mixed_values", |b| {
        b.iter(|| {
            for raw in inputs {
                black_box(coerce(black_box(raw)));
            }
        });
    });
}

criterion_group!(benches, translate_bench, wide_query_bench, coerce_bench);
criterion_main!(benches);
