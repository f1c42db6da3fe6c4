use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sparkreel::parse_ideas;
use std::fmt::Write;

fn synthetic_completion(items: usize, wrapped: bool) -> String {
    let mut out = String::from("Here are your ideas:\n\n");
    for i in 1..=items {
        let _ = writeln!(out, "{i}. Film a before-and-after transformation of project {i}");
        if wrapped {
            let _ = writeln!(out, "   with a trending sound and an on-screen hook in the");
            let _ = writeln!(out, "   first two seconds.");
        }
        out.push('\n');
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    for &items in &[10usize, 50, 200] {
        let blob = synthetic_completion(items, false);
        c.bench_with_input(BenchmarkId::new("parse_flat", items), &blob, |b, blob| {
            b.iter(|| {
                let ideas = parse_ideas(black_box(blob));
                black_box(ideas.len());
            });
        });
    }
}

fn bench_parse_wrapped(c: &mut Criterion) {
    let blob = synthetic_completion(50, true);
    c.bench_function("parse_wrapped_50", |b| {
        b.iter(|| {
            let ideas = parse_ideas(black_box(&blob));
            black_box(ideas.len());
        });
    });
}

criterion_group!(benches, bench_parse, bench_parse_wrapped);
criterion_main!(benches);
