//! Benchmarks for rawfile parsing.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ltsweep_raw::parse_rawfile;

/// Build a UTF-16 binary AC rawfile with `steps` sweeps of `points` each.
fn synthetic_ac_rawfile(points: usize, steps: usize) -> Vec<u8> {
    let header = format!(
        "Title: * bench.asc\nPlotname: AC Analysis\nFlags: complex forward log stepped\n\
         No. Variables: 3\nNo. Points: {}\nOffset: 0.0\nVariables:\n\
         \t0\tfrequency\tfrequency\n\t1\tV(amp-in)\tvoltage\n\t2\tV(out)\tvoltage\nBinary:\n",
        points * steps
    );
    let mut bytes: Vec<u8> = header
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();

    for step in 0..steps {
        for i in 0..points {
            let f = 10.0 * 10f64.powf(i as f64 * 4.0 / points as f64);
            let gain = 1.0 / (1.0 + step as f64 + f / 1e4);
            for (re, im) in [(f, 0.0), (gain, -gain * 0.1), (gain * 0.5, 0.0)] {
                bytes.extend_from_slice(&f64::to_le_bytes(re));
                bytes.extend_from_slice(&f64::to_le_bytes(im));
            }
        }
    }
    bytes
}

fn bench_parse_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_rawfile");

    for points in [100, 1_000, 10_000] {
        let data = synthetic_ac_rawfile(points, 9);
        group.bench_with_input(BenchmarkId::from_parameter(points), &data, |bencher, data| {
            bencher.iter(|| parse_rawfile(black_box(data)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_binary);
criterion_main!(benches);
