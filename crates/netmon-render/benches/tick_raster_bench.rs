//! Benchmarks for the tick background.
//!
//! The cached path should be a key comparison; a redraw is linear in width.
//!
//! Run with: cargo bench -p netmon-render --bench tick_raster_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use netmon_render::{Direction, Scale, TickPolicy, TickRasterizer, TickStyle, rasterize};
use std::hint::black_box;

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_raster/rasterize");

    for width in [320u32, 1280, 3840] {
        group.throughput(Throughput::Elements(u64::from(width)));
        for (name, scale) in [("full", Scale::MAX), ("coarse", Scale::clamped(0.01))] {
            group.bench_with_input(
                BenchmarkId::new(name, width),
                &width,
                |b, &width| {
                    b.iter(|| {
                        black_box(rasterize(
                            width,
                            scale,
                            Direction::Ltr,
                            &TickPolicy::BACKGROUND,
                            &TickStyle::default(),
                        ))
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_raster/cache");

    let mut raster = TickRasterizer::default();
    raster.background(1280, Scale::MAX, Direction::Ltr);
    group.bench_function("hit", |b| {
        b.iter(|| black_box(raster.background(1280, Scale::clamped(0.5), Direction::Ltr).width()))
    });

    let mut widths = [1279u32, 1280].into_iter().cycle();
    let mut resizing = TickRasterizer::default();
    group.bench_function("resize_miss", |b| {
        b.iter(|| {
            let w = widths.next().unwrap_or(1280);
            black_box(resizing.background(w, Scale::MAX, Direction::Ltr).width())
        })
    });

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let image = rasterize(
        1280,
        Scale::MAX,
        Direction::Ltr,
        &TickPolicy::BACKGROUND,
        &TickStyle::default(),
    );
    c.bench_function("tick_raster/encode_png_1280", |b| {
        b.iter(|| black_box(image.encode_png()))
    });
}

criterion_group!(benches, bench_rasterize, bench_cache, bench_encode);
criterion_main!(benches);
