//! Benchmarks for the spritemap pipeline.

use std::path::Path;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use spritemap::{Context, Direction, ImageList, RasterCodec, Registry, Session, Value};

fn write_fixtures(dir: &Path, count: u32) {
    for i in 0..count {
        let img = RgbaImage::from_pixel(16 + i % 8, 16, Rgba([i as u8, 0, 0, 255]));
        img.save(dir.join(format!("icon-{:03}.png", i))).unwrap();
    }
}

// -- Sheet benchmarks --

fn bench_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("sheet");

    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), 64);
    let pattern = format!("{}/*.png", dir.path().display());

    group.bench_function("decode_64", |b| {
        b.iter(|| {
            let mut list = ImageList::new(Arc::new(RasterCodec), Direction::Vertical);
            list.decode(&[pattern.as_str()]).unwrap();
            list
        })
    });

    let mut list = ImageList::new(Arc::new(RasterCodec), Direction::Horizontal);
    list.decode(&[pattern.as_str()]).unwrap();

    group.bench_function("position_last", |b| {
        b.iter(|| list.css_position(black_box("icon-063")).unwrap())
    });

    group.bench_function("combine_64", |b| {
        b.iter(|| {
            let mut fresh = ImageList::new(Arc::new(RasterCodec), Direction::Horizontal);
            fresh.decode(&[pattern.as_str()]).unwrap();
            fresh.combine().unwrap();
            fresh
        })
    });

    group.finish();
}

// -- Cache benchmarks --

fn bench_cached_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache");

    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), 16);
    let ctx = Context {
        image_dir: dir.path().to_path_buf(),
        build_dir: dir.path().to_path_buf(),
        gen_img_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let session = Session::new(ctx);
    let registry = Registry::with_builtins().unwrap();
    let key = registry
        .call(&session, "sprite-map", &[Value::string("*.png")])
        .unwrap();

    group.bench_function("sprite_map_hit", |b| {
        b.iter(|| {
            registry
                .call(&session, "sprite-map", black_box(&[Value::string("*.png")]))
                .unwrap()
        })
    });

    group.bench_function("sprite", |b| {
        b.iter(|| {
            registry
                .call(&session, "sprite", &[key.clone(), Value::string("icon-007")])
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sheet, bench_cached_lookup);
criterion_main!(benches);
