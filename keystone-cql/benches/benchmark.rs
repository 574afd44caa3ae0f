use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use keystone_cql::codec::extra::{byte_list_to_array, int_list_to_array};
use keystone_cql::codec::TypeCodec;

fn list_codec_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("ArrayCodec");

    for size in [0usize, 16, 1024] {
        let bytes: Vec<i8> = (0..size).map(|i| i as i8).collect();
        let ints: Vec<i32> = (0..size).map(|i| i as i32).collect();

        let encoded_bytes = byte_list_to_array().encode(Some(&bytes)).unwrap().unwrap();
        let encoded_ints = int_list_to_array().encode(Some(&ints)).unwrap().unwrap();

        group.bench_with_input(BenchmarkId::new("encode<tinyint>", size), &bytes, |b, v| {
            b.iter(|| byte_list_to_array().encode(Some(v)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("encode<int>", size), &ints, |b, v| {
            b.iter(|| int_list_to_array().encode(Some(v)).unwrap())
        });
        group.bench_with_input(
            BenchmarkId::new("decode<tinyint>", size),
            &encoded_bytes,
            |b, buf| b.iter(|| byte_list_to_array().decode(Some(&buf[..])).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("decode<int>", size),
            &encoded_ints,
            |b, buf| b.iter(|| int_list_to_array().decode(Some(&buf[..])).unwrap()),
        );

        let literal = int_list_to_array().format(Some(&ints));
        group.bench_with_input(BenchmarkId::new("parse<int>", size), &literal, |b, l| {
            b.iter(|| int_list_to_array().parse(Some(l)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, list_codec_bench);
criterion_main!(benches);
