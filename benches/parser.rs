//! Parser benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use termgrid::parser::Parser;

fn bench_parse(c: &mut Criterion, name: &str, input: &str) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function(name, |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.feed(black_box(input.as_bytes()));
            black_box(actions)
        })
    });

    group.finish();
}

fn bench_parse_plain_text(c: &mut Criterion) {
    bench_parse(c, "plain_text", &"Hello, World! ".repeat(1000));
}

fn bench_parse_csi_sequences(c: &mut Criterion) {
    bench_parse(
        c,
        "csi_sequences",
        &"\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J\x1b[38;2;10;20;30m".repeat(100),
    );
}

fn bench_parse_mixed(c: &mut Criterion) {
    bench_parse(
        c,
        "mixed_content",
        &"Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500),
    );
}

fn bench_parse_utf8(c: &mut Criterion) {
    bench_parse(c, "utf8_content", &"Hello, 世界! 🎉 ".repeat(500));
}

fn bench_parse_small_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    // Transports often deliver a few bytes at a time
    let input = "\x1b]0;title\x07\x1b[1;32mgreen\x1b[0m 中文\r\n".repeat(200);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("small_chunks", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let mut count = 0;
            for chunk in input.as_bytes().chunks(7) {
                count += parser.feed(black_box(chunk)).len();
            }
            black_box(count)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_plain_text,
    bench_parse_csi_sequences,
    bench_parse_mixed,
    bench_parse_utf8,
    bench_parse_small_chunks
);

criterion_main!(benches);
