/// Benchmark suite for full frames
/// Band count scaling of the frame scheduler.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use voxel_marcher::{
    generate_terrain, Angle3, FrameScheduler, Framebuffer, RenderConfig, Session, TerrainConfig,
};

fn bench_render_frame(c: &mut Criterion) {
    let world = generate_terrain(&TerrainConfig::default())
        .expect("terrain")
        .finalize();
    let mut session = Session::at(Vec3::new(64.0, 128.0, 40.0));
    session.camera.direction = Angle3::new(100.0, 0.0);

    let mut group = c.benchmark_group("render_frame_320x180");
    group.sample_size(20);
    for &bands in &[1usize, 2, 4, 8] {
        let scheduler = FrameScheduler::new(RenderConfig {
            bands,
            frame_budget: None,
            ..Default::default()
        })
        .expect("scheduler");
        let mut framebuffer = Framebuffer::new(320, 180);

        group.bench_with_input(BenchmarkId::from_parameter(bands), &bands, |b, _| {
            b.iter(|| black_box(scheduler.render(&world, &session, &mut framebuffer)));
        });
    }
    group.finish();
}

fn bench_present(c: &mut Criterion) {
    c.bench_function("present_1280x720", |b| {
        let framebuffer = Framebuffer::new(1280, 720);
        let mut surface = vec![0u32; 1280 * 720];
        b.iter(|| framebuffer.present_into(black_box(&mut surface)));
    });
}

criterion_group!(benches, bench_render_frame, bench_present);
criterion_main!(benches);
