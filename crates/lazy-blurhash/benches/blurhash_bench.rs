use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgb, RgbImage};
use lazy_blurhash::{
    decode, encode, BlurHash, BlurHashService, CachedBlurHash, MemoryCache, PixelGrid,
    ThumbnailFormat, ThumbnailRenderer,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn gradient_grid(width: u32, height: u32) -> PixelGrid {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[(x * 255 / width) as u8, (y * 255 / height) as u8, 128]);
        }
    }
    PixelGrid::new(width, height, pixels).expect("valid grid")
}

fn gradient_file(dir: &tempfile::TempDir, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(format!("gradient-{width}x{height}.png"));
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    })
    .save(&path)
    .expect("write fixture");
    path
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &size in &[32u32, 75, 128] {
        let grid = gradient_grid(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("4x3", format!("{size}x{size}")), &grid, |b, g| {
            b.iter(|| encode(g, 4, 3).unwrap());
        });
    }

    let grid = gradient_grid(75, 75);
    for &(cx, cy) in &[(1u32, 1u32), (4, 4), (9, 9)] {
        group.bench_with_input(BenchmarkId::new("75x75", format!("{cx}x{cy}")), &grid, |b, g| {
            b.iter(|| encode(g, cx, cy).unwrap());
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let sig = encode(&gradient_grid(64, 64), 4, 3).expect("encode ok");

    for &(w, h) in &[(32u32, 32u32), (128, 128)] {
        group.throughput(Throughput::Elements((w * h) as u64));
        group.bench_with_input(BenchmarkId::new("4x3", format!("{w}x{h}")), &sig, |b, s| {
            b.iter(|| decode(s, w, h, 1.0).unwrap());
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let sig = encode(&gradient_grid(64, 64), 4, 3).expect("encode ok");

    for format in [ThumbnailFormat::Jpeg, ThumbnailFormat::Png] {
        let renderer = ThumbnailRenderer::new(format, 80);
        group.bench_function(format!("{format}_32x32"), |b| {
            b.iter(|| renderer.render_signature(&sig, 32, 32).unwrap().to_data_uri());
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

fn bench_service(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");
    let dir = tempfile::tempdir().expect("tempdir");
    let file = gradient_file(&dir, 640, 480);
    let file = file.to_str().expect("utf-8 path");

    let service = BlurHash::default();
    group.bench_function("encode_uncached", |b| {
        b.iter(|| service.encode(file, 75, 75).unwrap());
    });

    let cached = CachedBlurHash::new(BlurHash::default(), MemoryCache::new(), None);
    cached.encode(file, 75, 75).expect("warm cache");
    group.bench_function("encode_cached_hit", |b| {
        b.iter(|| cached.encode(file, 75, 75).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_render, bench_service);
criterion_main!(benches);
