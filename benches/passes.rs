//! Criterion benchmarks for the block-feeding pass engine.
//!
//! Run with:
//!   cargo bench --bench passes
//!
//! Measures end-to-end pass throughput (acquire → segment → encode → sink)
//! over a temp-file corpus, per format and level, with the mapped strategy.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use zenc::encoder::{self, DeflateStream, Format};
use zenc::runner::{run_passes, Sink};
use zenc::source::{Channel, InputSource};

/// Mildly compressible synthetic corpus: short ascending runs.
fn corpus(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i / 13) % 251) as u8).collect()
}

fn bench_passes(c: &mut Criterion) {
    encoder::prepare();
    let mut group = c.benchmark_group("passes");

    for &size in &[64 * 1024usize, 1 << 20, 8 << 20] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.bin");
        std::fs::write(&path, corpus(size)).unwrap();
        let path = path.to_str().unwrap().to_owned();

        for format in [Format::Deflate, Format::Zlib, Format::Gzip] {
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format.name(), size),
                &path,
                |b, path| {
                    b.iter(|| {
                        let channel = Channel::open(Some(path.as_str())).unwrap();
                        let mut source = InputSource::acquire(channel, None).unwrap();
                        let mut sink = Sink::Null;
                        run_passes(
                            &mut source,
                            1,
                            || DeflateStream::new(1, format),
                            &mut sink,
                        )
                        .unwrap()
                    })
                },
            );
        }

        // Level 0: format framing only, upper bound on feed-engine overhead.
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("gzip_stored", size),
            &path,
            |b, path| {
                b.iter(|| {
                    let channel = Channel::open(Some(path.as_str())).unwrap();
                    let mut source = InputSource::acquire(channel, None).unwrap();
                    let mut sink = Sink::Null;
                    run_passes(
                        &mut source,
                        1,
                        || DeflateStream::new(0, Format::Gzip),
                        &mut sink,
                    )
                    .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_passes);
criterion_main!(benches);
