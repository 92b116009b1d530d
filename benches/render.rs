#[macro_use]
extern crate criterion;
extern crate bandbrot;

use bandbrot::band::partition;
use bandbrot::worker::render_row;
use bandbrot::{Mandelbrot, Palette, RenderConfig, RenderJob, Viewport};
use criterion::Criterion;

fn row(c: &mut Criterion) {
    let config = RenderConfig::new(Viewport::default(), 1000, 1, 800, 600).unwrap();
    let band = partition(&config)[0];
    let palette = Palette::new();
    let mut pixels = Vec::with_capacity(800);
    c.bench_function("render middle row", move |b| {
        b.iter(|| render_row(&band, 300, &Mandelbrot, &palette, &mut pixels))
    });
}

fn full_render(c: &mut Criterion) {
    let config = RenderConfig::new(Viewport::default(), 256, 4, 200, 150).unwrap();
    c.bench_function("render 200x150 with 4 bands", move |b| {
        let mut job = RenderJob::default();
        b.iter(|| {
            job.start(config).unwrap();
            job.wait()
        })
    });
}

criterion_group!(benches, row, full_render);
criterion_main!(benches);
