use criterion::{criterion_group, criterion_main, Criterion};
use kommunsvar_core::{chunks, ChunkConfig};
use std::hint::black_box;

fn bench_chunking(c: &mut Criterion) {
    let page = "Bygglov krävs när du ska bygga nytt, bygga till eller göra vissa ändringar. \
                Avgiften beror på vad du ska bygga och hur stort det är. "
        .repeat(200);

    c.bench_function("chunk_default_window", |b| {
        b.iter(|| {
            let n = chunks(black_box(&page), ChunkConfig::default()).count();
            black_box(n)
        })
    });

    c.bench_function("chunk_small_window", |b| {
        b.iter(|| {
            let n = chunks(black_box(&page), ChunkConfig { size: 200, overlap: 50 }).count();
            black_box(n)
        })
    });
}

criterion_group!(benches, bench_chunking);
criterion_main!(benches);
