/// World lifecycle: a mutable `WorldBuilder` is populated block by block and
/// then finalized into an immutable `World` that carries the distance field,
/// presence map and baked shadows. Only a `World` can be rendered, so the
/// acceleration data always matches the occupancy it was built from.
use crate::error::WorldError;
use crate::rendering::shadows::{compute_shadows, ShadowConfig};
use crate::voxel::{compute_nearest_blocks, Block, BlockStore, DistanceField, PresenceMap, Rgba};
use glam::IVec3;
use log::{debug, info};
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Mutable world under construction.
pub struct WorldBuilder {
    store: BlockStore,
    lights: Vec<IVec3>,
}

impl WorldBuilder {
    pub fn new(x: i32, y: i32, z: i32) -> Result<Self, WorldError> {
        Ok(Self {
            store: BlockStore::new(x, y, z)?,
            lights: Vec::new(),
        })
    }

    /// Reallocate as an empty grid of the given extent; forgets all lights.
    pub fn set_size(&mut self, x: i32, y: i32, z: i32) -> Result<(), WorldError> {
        self.store.set_size(x, y, z)?;
        self.lights.clear();
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> IVec3 {
        self.store.size()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> (Block, bool) {
        self.store.get(x, y, z)
    }

    /// Write a block; out-of-range writes are ignored and return false.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        self.store.set(x, y, z, block)
    }

    #[inline]
    pub fn get_raw_mut(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Block> {
        self.store.get_raw_mut(x, y, z)
    }

    /// Turn the voxel at `(x, y, z)` into a white light source and register it.
    pub fn create_light(&mut self, x: i32, y: i32, z: i32) -> Result<(), WorldError> {
        let block = self
            .store
            .get_raw_mut(x, y, z)
            .ok_or(WorldError::LightOutOfBounds { x, y, z })?;
        *block = Block {
            distance_to_nearest: block.distance_to_nearest,
            ..Block::light()
        };
        let p = IVec3::new(x, y, z);
        if !self.lights.contains(&p) {
            self.lights.push(p);
        }
        Ok(())
    }

    pub fn lights(&self) -> &[IVec3] {
        &self.lights
    }

    /// Build the distance field and presence map, then bake shadows.
    pub fn finalize(self) -> World {
        self.finalize_with(&ShadowConfig::default())
    }

    pub fn finalize_with(mut self, shadows: &ShadowConfig) -> World {
        let t0 = Instant::now();
        let field = compute_nearest_blocks(&self.store);
        info!("compute_nearest_blocks took {:?}", t0.elapsed());

        let t0 = Instant::now();
        let presence = PresenceMap::from_field(&field);
        self.store.for_each_materialized_mut(|p, block| {
            block.distance_to_nearest = field.get(p).unwrap_or(0);
        });
        info!("building presence map took {:?}", t0.elapsed());

        let mut world = World {
            store: self.store,
            field,
            presence,
            lights: self.lights,
            shadowed: Vec::new(),
        };

        let t0 = Instant::now();
        let darkened = compute_shadows(&mut world, shadows);
        info!(
            "compute_shadows took {:?} ({} voxels in shadow)",
            t0.elapsed(),
            darkened
        );

        world
    }
}

/// Finalized, read-only world. Safe to share across render workers.
pub struct World {
    store: BlockStore,
    field: DistanceField,
    presence: PresenceMap,
    lights: Vec<IVec3>,
    /// Voxels darkened by the shadow pass with their original colour.
    shadowed: Vec<(IVec3, Rgba)>,
}

impl World {
    #[inline]
    pub fn size(&self) -> IVec3 {
        self.store.size()
    }

    #[inline]
    pub fn in_bounds(&self, p: IVec3) -> bool {
        self.store.in_bounds(p)
    }

    /// Block at `(x, y, z)` with its distance value, and whether it is present.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> (Block, bool) {
        let p = IVec3::new(x, y, z);
        let mut block = self.store.block(p);
        block.distance_to_nearest = self.field.get(p).unwrap_or(0);
        (block, block.occupied)
    }

    /// Block at `p` as stored (hot path; no distance overlay).
    #[inline]
    pub fn block(&self, p: IVec3) -> Block {
        self.store.block(p)
    }

    #[inline]
    pub fn distance_field(&self) -> &DistanceField {
        &self.field
    }

    #[inline]
    pub fn presence(&self) -> &PresenceMap {
        &self.presence
    }

    pub fn lights(&self) -> &[IVec3] {
        &self.lights
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    /// Number of voxels the shadow pass darkened.
    pub fn shadowed_count(&self) -> usize {
        self.shadowed.len()
    }

    /// Colour-only edit used by the shadow pass; occupancy is untouched so
    /// the distance data stays valid.
    pub(crate) fn darken(&mut self, p: IVec3, factor: f32) {
        if let Some(block) = self.store.get_raw_mut(p.x, p.y, p.z) {
            self.shadowed.push((p, block.color));
            block.color = block.color.with_alpha_factor(factor);
        }
    }

    /// Go back to an editable builder. Shadowed colours are restored so the
    /// next finalize bakes from the original palette.
    pub fn into_builder(mut self) -> WorldBuilder {
        for (p, color) in self.shadowed.drain(..) {
            if let Some(block) = self.store.get_raw_mut(p.x, p.y, p.z) {
                block.color = color;
            }
        }
        debug!("world reopened for editing");
        WorldBuilder {
            store: self.store,
            lights: self.lights,
        }
    }
}

/// Parameters of the procedural terrain populator.
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    pub size: IVec3,
    pub seed: u32,
    /// Horizontal noise frequency
    pub scale: f64,
    pub base_height: i32,
    pub amplitude: f64,
    /// Columns below this height are filled with reflective water
    pub water_level: i32,
    pub light: Option<IVec3>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: IVec3::new(256, 256, 64),
            seed: 12345,
            scale: 0.02,
            base_height: 20,
            amplitude: 14.0,
            water_level: 16,
            light: Some(IVec3::new(128, 128, 60)),
        }
    }
}

const GRASS: Rgba = Rgba::opaque(34, 139, 34);
const DIRT: Rgba = Rgba::opaque(139, 69, 19);
const STONE: Rgba = Rgba::opaque(128, 128, 128);
const WATER: Rgba = Rgba::new(40, 90, 200, 150);

/// Populate a builder with a Perlin heightmap (Z is up).
pub fn generate_terrain(config: &TerrainConfig) -> Result<WorldBuilder, WorldError> {
    let size = config.size;
    let mut builder = WorldBuilder::new(size.x, size.y, size.z)?;
    let perlin = Perlin::new(config.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed as u64);
    // Keep one air layer on top when there is room for it.
    let max_height = (size.z - 1).max(1);

    for y in 0..size.y {
        for x in 0..size.x {
            let height = sample_terrain_height(&perlin, config, x, y).clamp(1, max_height);

            for z in 0..height {
                let base = if z == height - 1 {
                    GRASS
                } else if z > height - 4 {
                    DIRT
                } else {
                    STONE
                };
                builder.set(x, y, z, Block::solid(jitter(&mut rng, base)));
            }

            for z in height..config.water_level.min(size.z) {
                builder.set(x, y, z, Block::reflective(WATER));
            }
        }
    }

    if let Some(light) = config.light {
        builder.create_light(light.x, light.y, light.z)?;
    }

    Ok(builder)
}

#[inline]
fn sample_terrain_height(perlin: &Perlin, config: &TerrainConfig, x: i32, y: i32) -> i32 {
    let noise_value = perlin.get([x as f64 * config.scale, y as f64 * config.scale]);
    config.base_height + (noise_value * config.amplitude) as i32
}

fn jitter(rng: &mut ChaCha8Rng, c: Rgba) -> Rgba {
    let v: i16 = rng.gen_range(-12..=12);
    let shift = |ch: u8| (ch as i16 + v).clamp(0, 255) as u8;
    Rgba::new(shift(c.r), shift(c.g), shift(c.b), c.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_stamps_distances() {
        let mut builder = WorldBuilder::new(8, 8, 8).unwrap();
        builder.set(2, 2, 2, Block::solid(Rgba::WHITE));
        builder.set(2, 2, 5, Block::solid(Rgba::WHITE));
        let world = builder.finalize();

        assert_eq!(world.get(2, 2, 2).0.distance_to_nearest, 0);
        // Materialised air in the same tile got the field value stamped in.
        assert_eq!(world.store().block(IVec3::new(2, 2, 3)).distance_to_nearest, 1);
        assert_eq!(world.get(2, 2, 3).0.distance_to_nearest, 1);
        assert_eq!(world.get(7, 7, 7).0.distance_to_nearest, 5 + 5 + 2);
    }

    #[test]
    fn set_size_forgets_lights() {
        let mut builder = WorldBuilder::new(4, 4, 4).unwrap();
        builder.create_light(1, 1, 1).unwrap();
        assert_eq!(builder.lights().len(), 1);
        builder.set_size(4, 4, 4).unwrap();
        assert!(builder.lights().is_empty());
        assert!(!builder.get(1, 1, 1).1);
    }

    #[test]
    fn light_outside_world_is_rejected() {
        let mut builder = WorldBuilder::new(4, 4, 4).unwrap();
        assert_eq!(
            builder.create_light(4, 0, 0),
            Err(WorldError::LightOutOfBounds { x: 4, y: 0, z: 0 })
        );
    }

    #[test]
    fn terrain_has_ground_and_sky() {
        let config = TerrainConfig {
            size: IVec3::new(32, 32, 48),
            light: None,
            ..Default::default()
        };
        let world = generate_terrain(&config).unwrap().finalize();
        assert!(world.get(5, 5, 0).1, "bottom layer is solid");
        assert!(!world.get(5, 5, 47).1, "top layer is open sky");
    }

    #[test]
    fn one_layer_terrain_is_a_solid_floor() {
        let config = TerrainConfig {
            size: IVec3::new(8, 8, 1),
            light: None,
            ..Default::default()
        };
        let world = generate_terrain(&config).unwrap().finalize();
        for y in 0..8 {
            for x in 0..8 {
                assert!(world.get(x, y, 0).1, "({x}, {y}) should be ground");
            }
        }
    }
}
