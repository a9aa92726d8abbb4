/// Interactive viewer
/// Builds a terrain world, then renders it every frame into a softbuffer window
use clap::Parser;
use glam::{IVec3, Vec3};
use log::{error, info};
use mimalloc::MiMalloc;
use std::num::NonZeroU32;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use voxel_marcher::perf::FrameStats;
use voxel_marcher::*;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "voxel-marcher", about = "CPU voxel ray marcher")]
struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Window height in pixels
    #[arg(long, default_value_t = 360)]
    height: u32,
    /// Row bands rendered in parallel (1 = single-threaded)
    #[arg(long, default_value_t = 4)]
    bands: usize,
    /// World extent along X and Y
    #[arg(long, default_value_t = 256)]
    size: i32,
    /// World extent along Z
    #[arg(long, default_value_t = 64)]
    depth: i32,
    /// Terrain seed
    #[arg(long, default_value_t = 12345)]
    seed: u32,
    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 55.0)]
    fov: f32,
    /// Disable the baked point-light shadows
    #[arg(long)]
    no_shadows: bool,
    /// Disable reflection bounces
    #[arg(long)]
    no_reflections: bool,
    /// March with exact boundary steps only
    #[arg(long)]
    no_skipping: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ViewerError> {
    info!("Controls: WASD move, Q/E up/down, arrows look, L toggle heat map, P counters, Esc quit");

    // World
    let terrain = TerrainConfig {
        size: IVec3::new(args.size, args.size, args.depth),
        seed: args.seed,
        light: Some(IVec3::new(args.size / 2, args.size / 2, args.depth - 4)),
        ..Default::default()
    };
    let gen_start = Instant::now();
    let builder = generate_terrain(&terrain)?;
    info!("terrain generation took {:?}", gen_start.elapsed());

    let shadows = ShadowConfig {
        enabled: !args.no_shadows,
        ..Default::default()
    };
    let world = builder.finalize_with(&shadows);
    info!(
        "world {}x{}x{} ready, {} voxels in shadow",
        world.size().x,
        world.size().y,
        world.size().z,
        world.shadowed_count()
    );

    // Renderer
    let mut render_config = RenderConfig {
        bands: args.bands,
        reflections: !args.no_reflections,
        ..Default::default()
    };
    if args.no_skipping {
        render_config.primary = render_config.primary.without_skipping();
        render_config.reflection = render_config.reflection.without_skipping();
    }
    let scheduler = FrameScheduler::new(render_config)?;

    let start = Vec3::new(
        args.size as f32 * 0.25,
        args.size as f32 * 0.5,
        (terrain.base_height as f32 + terrain.amplitude as f32 + 6.0).min(args.depth as f32 - 1.0),
    );
    let mut session = Session::new(Camera::new(start, Angle3::new(100.0, 0.0)));
    session.camera.fov_h_degrees = args.fov;
    let mut controller = CameraController::new();

    // Window
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Voxel Marcher")
            .with_inner_size(winit::dpi::LogicalSize::new(args.width, args.height))
            .build(&event_loop)?,
    );
    let context = softbuffer::Context::new(window.clone())?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())?;

    let size = window.inner_size();
    let mut framebuffer = Framebuffer::new(size.width as usize, size.height as usize);

    let mut last_frame = Instant::now();
    let mut stats = FrameStats::new();
    let mut stats_timer = Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(new_size) => {
                    framebuffer.resize(new_size.width as usize, new_size.height as usize);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;
                    if let PhysicalKey::Code(keycode) = event.physical_key {
                        match keycode {
                            KeyCode::KeyW => controller.forward_pressed = pressed,
                            KeyCode::KeyS => controller.backward_pressed = pressed,
                            KeyCode::KeyA => controller.left_pressed = pressed,
                            KeyCode::KeyD => controller.right_pressed = pressed,
                            KeyCode::KeyQ => controller.up_pressed = pressed,
                            KeyCode::KeyE => controller.down_pressed = pressed,
                            KeyCode::ArrowUp => controller.look_up_pressed = pressed,
                            KeyCode::ArrowDown => controller.look_down_pressed = pressed,
                            KeyCode::ArrowLeft => controller.turn_left_pressed = pressed,
                            KeyCode::ArrowRight => controller.turn_right_pressed = pressed,
                            KeyCode::KeyL if pressed && !event.repeat => {
                                let mode = session.toggle_render_mode();
                                info!("render mode: {mode:?}");
                            }
                            KeyCode::KeyP if pressed && !event.repeat => {
                                MARCH_COUNTERS.snapshot().log_report();
                                MARCH_COUNTERS.reset();
                            }
                            KeyCode::Escape if pressed => elwt.exit(),
                            _ => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    // Pose changes only between frames.
                    controller.update_camera(&mut session.camera, dt);

                    let (Some(w), Some(h)) = (
                        NonZeroU32::new(framebuffer.width as u32),
                        NonZeroU32::new(framebuffer.height as u32),
                    ) else {
                        return;
                    };

                    let frame_time = scheduler.render(&world, &session, &mut framebuffer);
                    stats.record(frame_time);
                    session.advance_frame();

                    let presented = surface.resize(w, h).and_then(|()| {
                        let mut buffer = surface.buffer_mut()?;
                        framebuffer.present_into(&mut buffer);
                        buffer.present()
                    });
                    if let Err(e) = presented {
                        error!("present failed: {e}");
                        elwt.exit();
                    }

                    if stats_timer.elapsed().as_secs() >= 1 {
                        let p = session.camera.position;
                        info!(
                            "FPS: {} | render {:.2}ms avg, {:.2}ms worst | pos ({:.1}, {:.1}, {:.1})",
                            stats.frames(),
                            stats.average_ms(),
                            stats.worst_ms(),
                            p.x,
                            p.y,
                            p.z
                        );
                        stats.reset();
                        stats_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    })?;

    Ok(())
}
