//! Benchmarks for streaming performance.
//!
//! Measures forward-only stream throughput for sequential reads and for
//! forward skips, the two paths a range response goes through.

use castream::streaming::parse_range_header;
use castream_stream::{ForwardOnlyStream, RandomAccessStream};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::io::Cursor;

/// Benchmark sequential reads at typical chunk sizes.
fn bench_sequential_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_read");
    let length = 4 * 1024 * 1024;
    let data = vec![0u8; length];

    group.throughput(Throughput::Bytes(length as u64));
    for chunk_size in [4096, 8192, 64 * 1024] {
        group.bench_function(format!("chunk_{}", chunk_size), |b| {
            let mut buf = vec![0u8; chunk_size];
            b.iter(|| {
                let mut stream =
                    ForwardOnlyStream::new("bench.mp4", length as u64, Cursor::new(data.clone()));
                while let Ok(n) = stream.read_into(&mut buf) {
                    if n == 0 {
                        break;
                    }
                    black_box(&buf[..n]);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark seeking forward over unread bytes.
fn bench_forward_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_skip");

    for skip in [64 * 1024, 1024 * 1024, 16 * 1024 * 1024] {
        let data = vec![0u8; skip + 1];
        group.throughput(Throughput::Bytes(skip as u64));
        group.bench_function(format!("skip_{}", skip), |b| {
            b.iter(|| {
                let mut stream =
                    ForwardOnlyStream::new("bench.mp4", data.len() as u64, Cursor::new(data.clone()));
                stream.move_to(skip as u64).unwrap();
                black_box(stream.read_byte().unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark Range header parsing and resolution.
fn bench_range_parse(c: &mut Criterion) {
    let headers = ["bytes=0-", "bytes=1048576-2097151", "bytes=-65536"];

    c.bench_function("range_parse_resolve", |b| {
        b.iter(|| {
            for h in headers {
                let spec = parse_range_header(black_box(h)).unwrap();
                black_box(spec.resolve(4 * 1024 * 1024 * 1024));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_sequential_read,
    bench_forward_skip,
    bench_range_parse
);
criterion_main!(benches);
