use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fpid_core::{ExtractorConfig, Image};
use fpid_fast::{CornerDetector, FastDetector};

/// Blocky texture with ridge-like stripes, roughly the contrast of a fingerprint scan
fn create_benchmark_image(width: usize, height: usize) -> Image {
    Image::from_fn(width, height, |x, y| {
        let block = (x / 5).wrapping_mul(73_856_093) ^ (y / 5).wrapping_mul(19_349_663);
        let ridge = if ((x + 2 * y) / 4) % 2 == 0 { 40 } else { 0 };
        (((block >> 5) & 0x7f) + ridge) as u8
    })
    .expect("valid benchmark image")
}

fn bench_segment_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_test");
    for &size in &[96usize, 256, 512] {
        let img = create_benchmark_image(size, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &img, |b, img| {
            b.iter(|| CornerDetector::detect(black_box(img), 20, 9, 16))
        });
    }
    group.finish();
}

fn bench_full_detection(c: &mut Criterion) {
    let detector = FastDetector::new(ExtractorConfig::default()).expect("default config");
    let mut group = c.benchmark_group("pyramid_detection");
    for &levels in &[1usize, 3, 5] {
        let detector = FastDetector::new(ExtractorConfig {
            n_levels: levels,
            ..detector.config().clone()
        })
        .expect("valid config");
        let img = create_benchmark_image(256, 256);
        group.bench_with_input(BenchmarkId::from_parameter(levels), &img, |b, img| {
            b.iter(|| detector.detect(black_box(img)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segment_test, bench_full_detection);
criterion_main!(benches);
