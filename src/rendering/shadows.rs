/// Baked point-light shadows.
///
/// Runs once per finalize. Every occupied voxel that cannot see the light
/// gets its alpha replaced, so shadowed surfaces read darker once the frame
/// is composited over black.
use super::face::BlockFace;
use super::marcher::{MarchConfig, RayMarcher};
use crate::count_call;
use crate::world::World;
use glam::{IVec3, Vec3};
use log::debug;
use rayon::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowConfig {
    pub enabled: bool,
    /// Alpha of shadowed voxels as a fraction of 255.
    pub darken_factor: f32,
    pub march: MarchConfig,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            darken_factor: 0.3,
            march: MarchConfig::shadow(),
        }
    }
}

/// Darken every occupied, non-light voxel that has no line of sight to the
/// light. Only runs with exactly one registered light. Returns how many
/// voxels were darkened.
pub fn compute_shadows(world: &mut World, config: &ShadowConfig) -> usize {
    if !config.enabled {
        return 0;
    }
    let light = match world.lights() {
        [light] => *light,
        lights => {
            debug!("shadow pass skipped: {} lights registered", lights.len());
            return 0;
        }
    };

    let occluded = occluded_voxels(world, light, config.march);
    for &p in &occluded {
        world.darken(p, config.darken_factor);
    }
    occluded.len()
}

/// Shadow rays are cast against the read-only world; the caller applies the
/// colour edits afterwards.
fn occluded_voxels(world: &World, light: IVec3, march: MarchConfig) -> Vec<IVec3> {
    crate::perf_scope!("shadow rays");
    let mut candidates = Vec::new();
    world.store().for_each_occupied(|p, block| {
        if !block.is_light_source {
            candidates.push(p);
        }
    });
    debug!("casting {} shadow rays", candidates.len());

    let marcher = RayMarcher::new(world, march);
    let light_center = light.as_vec3() + Vec3::splat(0.5);
    candidates
        .into_par_iter()
        .filter(|&p| !sees_light(&marcher, p, light, light_center))
        .collect()
}

#[inline]
fn sees_light(marcher: &RayMarcher<'_>, voxel: IVec3, light: IVec3, light_center: Vec3) -> bool {
    count_call!(crate::perf::MARCH_COUNTERS.shadow_rays);
    let voxel_center = voxel.as_vec3() + Vec3::splat(0.5);
    let start = BlockFace::facing(light_center - voxel_center).center(voxel);
    let result = marcher.march_ignoring(start, light_center - start, Some(voxel));
    matches!(result.hit, Some(hit) if hit.voxel == light && hit.block.is_light_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{Block, Rgba};
    use crate::world::WorldBuilder;

    #[test]
    fn two_lights_skip_the_pass() {
        let mut builder = WorldBuilder::new(8, 3, 3).unwrap();
        builder.set(0, 1, 1, Block::solid(Rgba::WHITE));
        builder.set(3, 1, 1, Block::solid(Rgba::WHITE));
        builder.create_light(6, 1, 1).unwrap();
        builder.create_light(7, 1, 1).unwrap();
        let world = builder.finalize();
        assert_eq!(world.shadowed_count(), 0);
        assert_eq!(world.get(0, 1, 1).0.color.a, 255);
    }

    #[test]
    fn disabled_config_skips_the_pass() {
        let mut builder = WorldBuilder::new(8, 3, 3).unwrap();
        builder.set(0, 1, 1, Block::solid(Rgba::WHITE));
        builder.set(3, 1, 1, Block::solid(Rgba::WHITE));
        builder.create_light(6, 1, 1).unwrap();
        let config = ShadowConfig {
            enabled: false,
            ..Default::default()
        };
        let world = builder.finalize_with(&config);
        assert_eq!(world.shadowed_count(), 0);
    }
}
