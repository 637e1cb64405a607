//! Benchmark suite for the TSV formatter.
//!
//! Isolates formatter performance from BLE and runtime overhead.

use chrono::{DateTime, Local, TimeZone};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use wave_listener::{OutputFormatter, Reading, TsvFormatter};

fn timestamp() -> DateTime<Local> {
    Local.with_ymd_and_hms(2023, 4, 1, 12, 30, 0).unwrap()
}

/// Reading with every register present.
fn full_reading() -> Reading {
    Reading {
        timestamp: timestamp(),
        temperature: Some(21.50),
        humidity: Some(45.67),
        radon_average: Some(12),
        radon_one_day: Some(9),
        accel: Some(3),
        brightness: Some(200),
        status_humidity: Some(45.67),
    }
}

/// Reading from a device exposing only the radon registers.
fn sparse_reading() -> Reading {
    let mut reading = Reading::empty(timestamp());
    reading.radon_average = Some(12);
    reading.radon_one_day = Some(9);
    reading
}

fn bench_format_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_reading");
    group.throughput(Throughput::Elements(1));

    let formatter = TsvFormatter;

    let full = full_reading();
    group.bench_function("full", |b| {
        b.iter(|| {
            let line = formatter.format(black_box(&full));
            black_box(line)
        })
    });

    let sparse = sparse_reading();
    group.bench_function("sparse", |b| {
        b.iter(|| {
            let line = formatter.format(black_box(&sparse));
            black_box(line)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_format_reading);
criterion_main!(benches);
