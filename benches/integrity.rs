//! Benchmarks for content signing and verification

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vcon_dialog::core::integrity;
use vcon_dialog::{Classify, Dialog};

fn payload(size: usize) -> String {
    "transcript line\n".repeat(size / 16 + 1)[..size].to_string()
}

fn benchmark_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrity_sign");

    for size in [1024, 64 * 1024, 1024 * 1024].iter() {
        let data = payload(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| integrity::sign(black_box(data.as_bytes())));
        });
    }

    group.finish();
}

fn benchmark_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrity_verify");

    for size in [1024, 64 * 1024, 1024 * 1024].iter() {
        let mut dialog = Dialog::new("text", "2024-01-01T00:00:00Z", vec![0, 1]).unwrap();
        dialog.attach_inline(payload(*size), Some("t.txt"), Some("text/plain"));

        group.bench_with_input(BenchmarkId::from_parameter(size), &dialog, |b, dialog| {
            b.iter(|| black_box(dialog.verify()));
        });
    }

    group.finish();
}

fn benchmark_classify(c: &mut Criterion) {
    let dialog = Dialog::builder("recording")
        .start("2024-01-01T00:00:00Z")
        .filename("meeting.webm")
        .mimetype("video/webm")
        .build()
        .unwrap();

    c.bench_function("classify_video", |b| {
        b.iter(|| black_box(&dialog).is_video());
    });
}

criterion_group!(benches, benchmark_sign, benchmark_verify, benchmark_classify);
criterion_main!(benches);
