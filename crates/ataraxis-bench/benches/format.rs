use ataraxis_bench::{PARAGRAPH_MSG, SHORT_MSG, long_msg};
use ataraxis_console::{HEADER_WIDTH, WrapOptions, format_message};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn bench_format(c: &mut Criterion) {
    let long = long_msg();
    let mut group = c.benchmark_group("format_message");

    for (id, msg) in [
        ("short", SHORT_MSG),
        ("paragraph", PARAGRAPH_MSG),
        ("long", long.as_str()),
    ] {
        let plain = WrapOptions::default();
        let header = WrapOptions::default().with_header_offset(HEADER_WIDTH);
        group.bench_with_input(BenchmarkId::new("plain", id), msg, |b, msg| {
            b.iter(|| format_message(msg, &plain))
        });
        group.bench_with_input(BenchmarkId::new("header", id), msg, |b, msg| {
            b.iter(|| format_message(msg, &header))
        });
    }

    group.finish();
}

fn bench_break_long_words(c: &mut Criterion) {
    let word = "x".repeat(2_000);
    let options = WrapOptions {
        break_long_words: true,
        ..WrapOptions::default()
    };
    c.bench_function("format_message/break_long_words", |b| {
        b.iter(|| format_message(&word, &options))
    });
}

criterion_group!(benches, bench_format, bench_break_long_words);
criterion_main!(benches);
