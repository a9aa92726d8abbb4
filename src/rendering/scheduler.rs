/// Parallel frame rendering.
///
/// The framebuffer is cut into contiguous row bands, one per worker of a
/// rayon pool that is built once and reused every frame. Each band owns a
/// disjoint `&mut` slice of pixels while the world and the camera view are
/// shared read-only, so no locking is needed. `render` returns after every
/// band has finished.
use super::framebuffer::{FrameSlice, Framebuffer};
use super::marcher::{MarchConfig, RayMarcher};
use super::shading::{composite_reflection, iteration_heatmap};
use crate::camera::CameraView;
use crate::count_call;
use crate::error::RenderError;
use crate::session::{RenderMode, Session};
use crate::voxel::Rgba;
use crate::world::World;
use log::{debug, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Row bands per frame; also the worker count. 1 renders on the caller.
    pub bands: usize,
    pub sky_color: Rgba,
    pub reflections: bool,
    pub primary: MarchConfig,
    pub reflection: MarchConfig,
    /// Iteration count that maps to the bright end of the heat map.
    pub heatmap_scale: u32,
    /// Frames slower than this are reported at warn level.
    pub frame_budget: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bands: 4,
            // Sky blue
            sky_color: Rgba::opaque(135, 206, 235),
            reflections: true,
            primary: MarchConfig::primary(),
            reflection: MarchConfig::reflection(),
            heatmap_scale: 250,
            frame_budget: Some(Duration::from_millis(100)),
        }
    }
}

pub struct FrameScheduler {
    config: RenderConfig,
    pool: Option<ThreadPool>,
}

impl FrameScheduler {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        if config.bands == 0 {
            return Err(RenderError::NoBands);
        }
        let pool = if config.bands > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(config.bands)
                    .thread_name(|i| format!("render-band-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        debug!("frame scheduler ready with {} band(s)", config.bands);
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render one frame of `world` as seen from `session` into `framebuffer`.
    /// Every pixel is written exactly once. Returns the wall time taken.
    pub fn render(&self, world: &World, session: &Session, framebuffer: &mut Framebuffer) -> Duration {
        let frame_start = Instant::now();
        if framebuffer.width == 0 || framebuffer.height == 0 {
            return frame_start.elapsed();
        }

        let view = session.camera.view(framebuffer.width, framebuffer.height);
        let shader = PixelShader {
            view: &view,
            primary: RayMarcher::new(world, self.config.primary),
            reflection: RayMarcher::new(world, self.config.reflection),
            mode: session.render_mode,
            config: &self.config,
        };

        match &self.pool {
            None => shader.render_band(&mut framebuffer.as_full_slice_mut()),
            Some(pool) => {
                let bands = framebuffer.split_into_stripes(self.config.bands);
                pool.install(|| {
                    bands
                        .into_par_iter()
                        .for_each(|mut band| shader.render_band(&mut band));
                });
            }
        }

        let frame_time = frame_start.elapsed();
        if let Some(budget) = self.config.frame_budget {
            if frame_time > budget {
                warn!(
                    "frame {} took {:.2}ms (budget {:.2}ms)",
                    session.frame_count,
                    frame_time.as_secs_f64() * 1000.0,
                    budget.as_secs_f64() * 1000.0
                );
            }
        }
        frame_time
    }
}

/// Everything a worker needs to colour a pixel; shared by reference.
struct PixelShader<'a> {
    view: &'a CameraView,
    primary: RayMarcher<'a>,
    reflection: RayMarcher<'a>,
    mode: RenderMode,
    config: &'a RenderConfig,
}

impl PixelShader<'_> {
    fn render_band(&self, band: &mut FrameSlice<'_>) {
        for row in band.rows() {
            let Some(pixels) = band.row_mut(row) else {
                continue;
            };
            for (x, pixel) in pixels.iter_mut().enumerate() {
                *pixel = self.shade(x, row);
            }
        }
    }

    #[inline]
    fn shade(&self, x: usize, row: usize) -> Rgba {
        let dir = self.view.ray_direction(x, row);
        let primary = self.primary.march(self.view.origin, dir);

        if self.mode == RenderMode::Iterations {
            return iteration_heatmap(primary.iterations, self.config.heatmap_scale);
        }

        let Some(hit) = primary.hit else {
            return self.config.sky_color;
        };
        let front = hit.block.color;
        if !(self.config.reflections && hit.block.is_reflective) {
            return front;
        }
        let Some(face) = primary.face() else {
            return front;
        };

        count_call!(crate::perf::MARCH_COUNTERS.reflection_rays);
        let (origin, bounce_dir) = face.reflect(primary.position, dir);
        let bounce = self.reflection.march(origin, bounce_dir);
        composite_reflection(front, bounce.hit.map(|h| h.block.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Block;
    use crate::world::WorldBuilder;
    use glam::Vec3;

    #[test]
    fn zero_bands_are_rejected() {
        let config = RenderConfig {
            bands: 0,
            ..Default::default()
        };
        assert!(matches!(FrameScheduler::new(config), Err(RenderError::NoBands)));
    }

    #[test]
    fn empty_world_is_all_sky() {
        let world = WorldBuilder::new(8, 8, 8).unwrap().finalize();
        let scheduler = FrameScheduler::new(RenderConfig::default()).unwrap();
        let mut fb = Framebuffer::new(16, 9);
        fb.clear(Rgba::TRANSPARENT);
        scheduler.render(&world, &Session::at(Vec3::splat(4.0)), &mut fb);
        assert!(fb.pixels().iter().all(|&p| p == scheduler.config().sky_color));
    }

    #[test]
    fn wall_fills_the_view() {
        let mut builder = WorldBuilder::new(8, 32, 32).unwrap();
        let red = Rgba::opaque(200, 0, 0);
        for y in 0..32 {
            for z in 0..32 {
                builder.set(6, y, z, Block::solid(red));
            }
        }
        let world = builder.finalize();
        let scheduler = FrameScheduler::new(RenderConfig {
            bands: 1,
            ..Default::default()
        })
        .unwrap();
        let mut fb = Framebuffer::new(8, 6);
        scheduler.render(&world, &Session::at(Vec3::new(1.0, 16.0, 16.0)), &mut fb);
        assert!(fb.pixels().iter().all(|&p| p == red));
    }

    #[test]
    fn reflective_floor_blends_with_what_it_mirrors() {
        // Half-transparent mirror floor at z = 0, blue ceiling at z = 7.
        let mirror = Rgba::new(255, 255, 255, 128);
        let blue = Rgba::opaque(0, 0, 255);
        let mut builder = WorldBuilder::new(16, 16, 8).unwrap();
        for x in 0..16 {
            for y in 0..16 {
                builder.set(x, y, 0, Block::reflective(mirror));
                builder.set(x, y, 7, Block::solid(blue));
            }
        }
        let world = builder.finalize();

        let mut session = Session::at(Vec3::new(2.0, 8.0, 3.5));
        session.camera.direction = crate::camera::Angle3::new(135.0, 0.0);
        let mut fb = Framebuffer::new(9, 9);

        let shaded = |reflections: bool, fb: &mut Framebuffer| {
            let scheduler = FrameScheduler::new(RenderConfig {
                bands: 1,
                reflections,
                ..Default::default()
            })
            .unwrap();
            scheduler.render(&world, &session, fb);
            fb.pixel(4, 4).unwrap()
        };

        assert_eq!(shaded(false, &mut fb), mirror);
        assert_eq!(shaded(true, &mut fb), mirror.over(blue));
    }

    #[test]
    fn iteration_mode_ignores_colour() {
        let world = WorldBuilder::new(8, 8, 8).unwrap().finalize();
        let scheduler = FrameScheduler::new(RenderConfig {
            bands: 2,
            ..Default::default()
        })
        .unwrap();
        let mut session = Session::at(Vec3::splat(4.0));
        session.toggle_render_mode();
        let mut fb = Framebuffer::new(4, 4);
        scheduler.render(&world, &session, &mut fb);
        assert!(fb.pixels().iter().all(|&p| p != scheduler.config().sky_color));
    }
}
