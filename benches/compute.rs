#[macro_use]
extern crate criterion;
extern crate mandelmovie;
extern crate num;

use criterion::Criterion;
use mandelmovie::{compute_image, Framing, Raster};
use num::Complex;

fn seahorse(c: &mut Criterion) {
    let viewport = Framing {
        center: Complex::new(-0.743643887037151, 0.131825904205330),
        xscale: 0.004,
        width: 200,
        height: 150,
        max_iterations: 500,
    }
    .viewport()
    .unwrap();

    for &workers in &[1, 4, 8] {
        c.bench_function(&format!("seahorse 200x150, {} workers", workers), move |b| {
            let mut raster = Raster::new(200, 150).unwrap();
            b.iter(|| compute_image(&mut raster, &viewport, workers).unwrap())
        });
    }
}

criterion_group!(benches, seahorse);
criterion_main!(benches);
