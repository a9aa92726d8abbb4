/// Benchmark suite for the ray marcher hot loop
/// Compares distance skipping against exact boundary stepping.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{IVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use voxel_marcher::{generate_terrain, MarchConfig, RayMarcher, ShadowConfig, TerrainConfig};

fn random_rays(count: usize, size: IVec3) -> Vec<(Vec3, Vec3)> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let origin = Vec3::new(
                rng.gen_range(0.0..size.x as f32),
                rng.gen_range(0.0..size.y as f32),
                rng.gen_range(40.0..size.z as f32),
            );
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..-0.05),
            );
            (origin, dir)
        })
        .collect()
}

fn bench_march(c: &mut Criterion) {
    let config = TerrainConfig::default();
    let world = generate_terrain(&config)
        .expect("terrain")
        .finalize_with(&ShadowConfig {
            enabled: false,
            ..Default::default()
        });
    let rays = random_rays(4096, config.size);

    let mut group = c.benchmark_group("march_4096_rays");
    for (name, march) in [
        ("skipping", MarchConfig::primary()),
        ("exact", MarchConfig::primary().without_skipping()),
    ] {
        let marcher = RayMarcher::new(&world, march);
        group.bench_with_input(BenchmarkId::from_parameter(name), &rays, |b, rays| {
            b.iter(|| {
                let mut hits = 0u32;
                for &(origin, dir) in rays {
                    hits += marcher.march(black_box(origin), black_box(dir)).is_hit() as u32;
                }
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn bench_long_empty_ray(c: &mut Criterion) {
    let mut builder = voxel_marcher::WorldBuilder::new(512, 512, 64).expect("world");
    builder.set(500, 256, 32, voxel_marcher::Block::solid(voxel_marcher::Rgba::WHITE));
    let world = builder.finalize();
    let marcher = RayMarcher::new(&world, MarchConfig::primary());

    c.bench_function("march_long_empty_ray", |b| {
        b.iter(|| black_box(marcher.march(black_box(Vec3::new(0.5, 256.5, 32.5)), Vec3::X)));
    });
}

criterion_group!(benches, bench_march, bench_long_empty_ray);
criterion_main!(benches);
