//! Envelope codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use humandb_bench::{collection_response, insert_request};
use humandb_codec::{from_cbor_prefix, Value};
use humandb_protocol::{Envelope, Request, Response};

/// Benchmark encoding requests and responses.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    group.bench_function("request_bare", |b| {
        let request = Request::new("show");
        b.iter(|| black_box(black_box(&request).encode().unwrap()));
    });

    group.bench_function("request_insert", |b| {
        let request = insert_request(42);
        b.iter(|| black_box(black_box(&request).encode().unwrap()));
    });

    for count in [10, 100, 1000] {
        let response = collection_response(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("response_collection", count),
            &response,
            |b, response| b.iter(|| black_box(response.encode().unwrap())),
        );
    }

    group.finish();
}

/// Benchmark decoding requests and responses.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let bytes = insert_request(42).encode().unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("request_insert", |b| {
        b.iter(|| black_box(Request::decode(black_box(&bytes)).unwrap()));
    });

    for count in [10, 100, 1000] {
        let bytes = collection_response(count).encode().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("response_collection", count),
            &bytes,
            |b, bytes| b.iter(|| black_box(Response::decode(bytes).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark framing a stream holding several envelopes back to back.
fn bench_prefix_decode(c: &mut Criterion) {
    let mut stream = Vec::new();
    for key in 1..=16 {
        stream.extend(insert_request(key).encode().unwrap());
    }

    c.bench_function("prefix_decode_16", |b| {
        b.iter(|| {
            let mut rest = black_box(stream.as_slice());
            while !rest.is_empty() {
                let (value, used): (Value, usize) = from_cbor_prefix(rest).unwrap();
                black_box(value);
                rest = &rest[used..];
            }
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_prefix_decode);

criterion_main!(benches);
