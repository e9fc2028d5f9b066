use criterion::{Criterion, criterion_group, criterion_main};
use scandex::embeddings::chunking::{ChunkingConfig, chunk_text};
use std::hint::black_box;

pub fn criterion_benchmark(c: &mut Criterion) {
    let transcript =
        "Invoice 2024-113 Total amount due 412.50 payable within 30 days of receipt. ".repeat(400);
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| chunk_text(black_box(&transcript), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
