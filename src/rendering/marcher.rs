/// Ray marching through a finalized world.
///
/// The loop reads the 8-bit presence map. A value of 0 is an occupied voxel.
/// Larger values allow a jump of `(d - skip_margin) / sqrt(3)` along the ray,
/// which never passes an occupied voxel because the field is a Manhattan
/// distance and `d / sqrt(3)` bounds the Euclidean distance from below.
/// Small values fall back to exact boundary stepping so thin features and
/// face positions stay exact.
use super::face::BlockFace;
use super::stepper::BoundaryStepper;
use crate::voxel::distance_field::SQRT_3;
use crate::voxel::Block;
use crate::world::World;
use crate::{count_add, count_call};
use glam::{IVec3, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarchConfig {
    /// Iterations (skips and steps together) before a ray counts as escaped.
    pub max_iterations: u32,
    /// Presence values at or below this take an exact boundary step.
    pub skip_threshold: u8,
    /// Subtracted from the field value before converting it to a jump length.
    pub skip_margin: f32,
    pub distance_skipping: bool,
}

impl MarchConfig {
    pub const fn primary() -> Self {
        Self {
            max_iterations: 512,
            skip_threshold: 4,
            skip_margin: 3.0,
            distance_skipping: true,
        }
    }

    pub const fn reflection() -> Self {
        Self {
            max_iterations: 256,
            ..Self::primary()
        }
    }

    pub const fn shadow() -> Self {
        Self::primary()
    }

    /// Same limits, exact stepping only. Used to validate skipping.
    pub const fn without_skipping(self) -> Self {
        Self {
            distance_skipping: false,
            ..self
        }
    }
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self::primary()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarchHit {
    pub voxel: IVec3,
    pub block: Block,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MarchResult {
    /// Where marching stopped: on the hit voxel's boundary for a hit.
    pub position: Vec3,
    pub hit: Option<MarchHit>,
    pub iterations: u32,
}

impl MarchResult {
    #[inline]
    fn miss(position: Vec3, iterations: u32) -> Self {
        Self {
            position,
            hit: None,
            iterations,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }

    /// Face of the hit voxel the ray entered through.
    #[inline]
    pub fn face(&self) -> Option<BlockFace> {
        self.hit
            .as_ref()
            .and_then(|hit| BlockFace::classify(self.position, hit.voxel))
    }
}

/// Borrowing marcher; cheap to build, `Sync`, shared across render workers.
#[derive(Copy, Clone)]
pub struct RayMarcher<'w> {
    world: &'w World,
    config: MarchConfig,
}

impl<'w> RayMarcher<'w> {
    pub fn new(world: &'w World, config: MarchConfig) -> Self {
        Self { world, config }
    }

    #[inline]
    pub fn config(&self) -> &MarchConfig {
        &self.config
    }

    #[inline]
    pub fn march(&self, origin: Vec3, direction: Vec3) -> MarchResult {
        self.march_ignoring(origin, direction, None)
    }

    /// March, treating `ignore` as empty. The voxel keeps its occupancy in
    /// the world; when the ray is inside it the loop just steps on.
    pub fn march_ignoring(&self, origin: Vec3, direction: Vec3, ignore: Option<IVec3>) -> MarchResult {
        count_call!(crate::perf::MARCH_COUNTERS.rays_cast);

        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return MarchResult::miss(origin, 0);
        }

        let size = self.world.size();
        let Some(t_enter) = enter_box(origin, dir, size.as_vec3()) else {
            count_call!(crate::perf::MARCH_COUNTERS.world_misses);
            return MarchResult::miss(origin, 0);
        };

        let start = origin + dir * t_enter;
        let voxel = start.floor().as_ivec3().clamp(IVec3::ZERO, size - IVec3::ONE);
        let mut stepper = BoundaryStepper::new(start, voxel, dir);

        let presence = self.world.presence();
        let threshold = self.config.skip_threshold;
        let mut iterations = 0u32;
        #[cfg(feature = "profiling")]
        let mut steps = 0u64;
        #[cfg(feature = "profiling")]
        let mut skips = 0u64;

        let result = loop {
            if iterations >= self.config.max_iterations {
                count_call!(crate::perf::MARCH_COUNTERS.iteration_cap_hits);
                break MarchResult::miss(stepper.position(), iterations);
            }
            iterations += 1;

            let voxel = stepper.voxel();
            if !self.world.in_bounds(voxel) {
                break MarchResult::miss(stepper.position(), iterations);
            }

            let d = presence.get(voxel);
            if d == 0 && Some(voxel) != ignore {
                break MarchResult {
                    position: stepper.position(),
                    hit: Some(MarchHit {
                        voxel,
                        block: self.world.block(voxel),
                    }),
                    iterations,
                };
            }

            if self.config.distance_skipping && d > threshold {
                let jump = (d as f32 - self.config.skip_margin) / SQRT_3;
                if jump > 0.0 {
                    let p = stepper.position() + dir * jump;
                    stepper = BoundaryStepper::new(p, p.floor().as_ivec3(), dir);
                    #[cfg(feature = "profiling")]
                    {
                        skips += 1;
                    }
                    continue;
                }
            }

            if stepper.step().is_none() {
                break MarchResult::miss(stepper.position(), iterations);
            }
            #[cfg(feature = "profiling")]
            {
                steps += 1;
            }
        };

        count_add!(crate::perf::MARCH_COUNTERS.boundary_steps, steps);
        count_add!(crate::perf::MARCH_COUNTERS.distance_skips, skips);
        result
    }
}

/// Slab test against the box `[0, size]`. Returns the parametric distance at
/// which the ray enters (0 when the origin is already inside). A ray that
/// only touches the box, or starts on a face heading out, gets `None`.
fn enter_box(origin: Vec3, dir: Vec3, size: Vec3) -> Option<f32> {
    let mut t0 = 0.0f32;
    let mut t1 = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, hi) = (origin[axis], dir[axis], size[axis]);
        if d == 0.0 {
            if o < 0.0 || o >= hi {
                return None;
            }
            continue;
        }
        let ta = -o / d;
        let tb = (hi - o) / d;
        t0 = t0.max(ta.min(tb));
        t1 = t1.min(ta.max(tb));
    }
    (t0 < t1).then_some(t0)
}
