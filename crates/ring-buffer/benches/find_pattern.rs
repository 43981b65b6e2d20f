//! Benchmarks for the ring buffer hot path.
//!
//! Measures delimiter search across the wrap point and the append/consume
//! cycle a deframer performs per received chunk.
//!
//! Run with: cargo bench -p ring-buffer --bench find_pattern

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ring_buffer::{Pattern, RingBuffer};

/// Buffer holding `noise` followed by `delimiter`, arranged so the content
/// wraps around the storage boundary
fn wrapped_buffer(noise: &[u8], delimiter: &[u8]) -> RingBuffer {
    let capacity = noise.len() + delimiter.len();
    let mut buffer = RingBuffer::new(capacity);
    buffer.append(&vec![0u8; capacity / 2]).unwrap();
    buffer.consume(capacity / 2);

    buffer.append(noise).unwrap();
    buffer.append(delimiter).unwrap();
    buffer
}

fn text_noise(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'a' + (i % 23) as u8).collect()
}

fn bench_find_compiled(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_compiled");
    let delimiter = b"\r\n";
    let pattern = Pattern::new(delimiter);

    for len in [64usize, 1024, 16 * 1024] {
        let buffer = wrapped_buffer(&text_noise(len), delimiter);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &buffer, |b, buffer| {
            b.iter(|| black_box(buffer.find_compiled(black_box(&pattern), 0)))
        });
    }
    group.finish();
}

/// Worst case for a naive scan: long runs of partial matches
fn bench_partial_matches(c: &mut Criterion) {
    let needle = b"AAAAB";
    let pattern = Pattern::new(needle);
    let noise: Vec<u8> = b"AAAA".iter().copied().cycle().take(8 * 1024).collect();
    let buffer = wrapped_buffer(&noise, needle);

    c.bench_function("find_compiled_partial_matches", |b| {
        b.iter(|| black_box(buffer.find_compiled(&pattern, 0)))
    });
}

fn bench_append_consume_cycle(c: &mut Criterion) {
    let mut buffer = RingBuffer::new(4096);
    let chunk = [0x55u8; 256];

    c.bench_function("append_consume_cycle", |b| {
        b.iter(|| {
            buffer.append(black_box(&chunk)).unwrap();
            black_box(buffer.consume(chunk.len()));
        })
    });
}

criterion_group!(
    benches,
    bench_find_compiled,
    bench_partial_matches,
    bench_append_consume_cycle
);
criterion_main!(benches);
