//! Benchmark suite for the characteristic decoder.
//!
//! Measures decoding a full batch of raw characteristic values into a
//! Reading, for both firmware layouts of the accel/light register.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use wave_listener::sensor::{
    ACCEL_LIGHT, CharacteristicMap, FirmwareVariant, HUMIDITY, RADON_AVERAGE, RADON_ONE_DAY,
    RawValue, STATUS_INFO, TEMPERATURE,
};

/// A full poll cycle's worth of raw characteristic values.
fn full_raw_values() -> Vec<RawValue> {
    vec![
        (TEMPERATURE, 2150i16.to_le_bytes().to_vec()),
        (HUMIDITY, 4567i16.to_le_bytes().to_vec()),
        (RADON_AVERAGE, 12i16.to_le_bytes().to_vec()),
        (RADON_ONE_DAY, 9i16.to_le_bytes().to_vec()),
        (ACCEL_LIGHT, vec![0x03, 0xC8]),
        (STATUS_INFO, 4567i16.to_le_bytes().to_vec()),
    ]
}

fn bench_decode_firmware_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_firmware_variant");
    group.throughput(Throughput::Elements(1));

    let raw = full_raw_values();

    let split = CharacteristicMap::for_variant(FirmwareVariant::Split);
    group.bench_function("split", |b| {
        b.iter(|| {
            let reading = split.decode(black_box(&raw));
            black_box(reading)
        })
    });

    let word = CharacteristicMap::for_variant(FirmwareVariant::Word);
    group.bench_function("word", |b| {
        b.iter(|| {
            let reading = word.decode(black_box(&raw));
            black_box(reading)
        })
    });

    group.finish();
}

fn bench_decode_partial_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_partial_batch");
    group.throughput(Throughput::Elements(1));

    let map = CharacteristicMap::for_variant(FirmwareVariant::Split);
    let partial: Vec<RawValue> = full_raw_values().into_iter().take(2).collect();

    group.bench_function("two_of_six", |b| {
        b.iter(|| {
            let reading = map.decode(black_box(&partial));
            black_box(reading)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_firmware_variants,
    bench_decode_partial_batch
);
criterion_main!(benches);
