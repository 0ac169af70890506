//! Compilation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use toy_compiler::parser::Parser;
use toy_compiler::{compile, Compiler};

const BOTTLES: &str = include_str!("../tests/fixtures/99_bottles_of_beer.toy");

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse 99 bottles", |b| {
        b.iter(|| Parser::new(black_box(BOTTLES)).parse_program())
    });
}

fn bench_codegen(c: &mut Criterion) {
    let program = Parser::new(BOTTLES)
        .parse_program()
        .expect("fixture should parse");
    c.bench_function("codegen 99 bottles", |b| {
        b.iter(|| Compiler::new().compile(black_box(&program)))
    });
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile 99 bottles", |b| b.iter(|| compile(black_box(BOTTLES))));
}

criterion_group!(benches, bench_parse, bench_codegen, bench_compile);
criterion_main!(benches);
