use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use shapeview_geometry::{MAX_ICOSPHERE_LEVEL, icosphere};

fn bench_level(level: u32, iterations: usize) {
    let start = Instant::now();
    let mut vertices = 0;
    for _ in 0..iterations {
        let mesh = icosphere(black_box(Vec3::ZERO), black_box(1.0), black_box(level))
            .expect("valid radius");
        vertices = mesh.vertex_count();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  icosphere level {level} ({vertices} vertices, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("icosphere generation benchmarks");
    for level in 0..=MAX_ICOSPHERE_LEVEL {
        let iterations = match level {
            0..=4 => 200,
            5..=6 => 20,
            _ => 3,
        };
        bench_level(level, iterations);
    }
}
