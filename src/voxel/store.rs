/// Sparse tiled block store.
///
/// The grid is cut into 16³ tiles kept in a growable pool; a hash map from
/// tile coordinate to pool slot locates them. Tiles that were never written
/// do not exist and read as air. Coordinates outside `[0, size)` on any axis
/// are "absent": reads return air, writes are ignored.
use super::tile::{Tile, TILE_MASK, TILE_SHIFT, TILE_SIZE};
use super::Block;
use crate::error::WorldError;
use glam::IVec3;
use std::collections::HashMap;

/// Largest accepted extent on any axis.
pub const MAX_DIMENSION: i32 = 4096;

/// Largest accepted voxel count. Finalize allocates a `u16` field and a
/// `u8` presence map over the whole extent.
pub const MAX_VOLUME: usize = 1 << 26;

pub struct BlockStore {
    size: IVec3,
    /// Tile coordinate -> index into `pool`
    index: HashMap<IVec3, u32>,
    pool: Vec<Tile>,
}

impl BlockStore {
    /// Empty store with zero extent; every lookup is absent until `set_size`.
    pub fn empty() -> Self {
        Self {
            size: IVec3::ZERO,
            index: HashMap::new(),
            pool: Vec::new(),
        }
    }

    pub fn new(x: i32, y: i32, z: i32) -> Result<Self, WorldError> {
        let mut store = Self::empty();
        store.set_size(x, y, z)?;
        Ok(store)
    }

    /// Reset to an all-air grid of the given extent, dropping every tile.
    pub fn set_size(&mut self, x: i32, y: i32, z: i32) -> Result<(), WorldError> {
        let size = IVec3::new(x, y, z);
        if size.min_element() <= 0 || size.max_element() > MAX_DIMENSION {
            return Err(WorldError::InvalidDimensions {
                x,
                y,
                z,
                max: MAX_DIMENSION,
            });
        }
        let volume = x as usize * y as usize * z as usize;
        if volume > MAX_VOLUME {
            return Err(WorldError::TooLarge {
                volume,
                max: MAX_VOLUME,
            });
        }

        self.size = size;
        self.index.clear();
        self.pool.clear();
        Ok(())
    }

    #[inline]
    pub fn size(&self) -> IVec3 {
        self.size
    }

    /// Total number of voxels covered by the extent.
    #[inline]
    pub fn volume(&self) -> usize {
        self.size.x as usize * self.size.y as usize * self.size.z as usize
    }

    #[inline]
    pub fn in_bounds(&self, p: IVec3) -> bool {
        p.x >= 0
            && p.y >= 0
            && p.z >= 0
            && p.x < self.size.x
            && p.y < self.size.y
            && p.z < self.size.z
    }

    /// Number of materialised tiles.
    pub fn tile_count(&self) -> usize {
        self.pool.len()
    }

    /// Block at `(x, y, z)` and whether it is present (occupied).
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> (Block, bool) {
        let block = self.block(IVec3::new(x, y, z));
        (block, block.occupied)
    }

    /// Block at `p`; air for unmaterialised tiles and out-of-range points.
    #[inline]
    pub fn block(&self, p: IVec3) -> Block {
        if !self.in_bounds(p) {
            return Block::AIR;
        }
        match self.index.get(&tile_coord(p)) {
            Some(&slot) => {
                let (lx, ly, lz) = local_coord(p);
                self.pool[slot as usize].get(lx, ly, lz)
            }
            None => Block::AIR,
        }
    }

    /// Write a block. Returns false (and writes nothing) when out of range.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        let p = IVec3::new(x, y, z);
        if !self.in_bounds(p) {
            return false;
        }
        let key = tile_coord(p);
        if block == Block::AIR && !self.index.contains_key(&key) {
            return true;
        }
        let (lx, ly, lz) = local_coord(p);
        self.tile_mut(key).set(lx, ly, lz, block);
        true
    }

    /// Mutable handle for in-place updates. Materialises the tile.
    pub fn get_raw_mut(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Block> {
        let p = IVec3::new(x, y, z);
        if !self.in_bounds(p) {
            return None;
        }
        let (lx, ly, lz) = local_coord(p);
        Some(self.tile_mut(tile_coord(p)).get_mut(lx, ly, lz))
    }

    /// Visit every occupied voxel, in tile order.
    pub fn for_each_occupied<F: FnMut(IVec3, &Block)>(&self, mut f: F) {
        for (&key, &slot) in &self.index {
            let tile = &self.pool[slot as usize];
            if tile.occupied_count() == 0 {
                continue;
            }
            let origin = key * TILE_SIZE as i32;
            for lz in 0..TILE_SIZE {
                for ly in 0..TILE_SIZE {
                    for lx in 0..TILE_SIZE {
                        let block = tile.get(lx, ly, lz);
                        if !block.occupied {
                            continue;
                        }
                        let p = origin + IVec3::new(lx as i32, ly as i32, lz as i32);
                        if self.in_bounds(p) {
                            f(p, &block);
                        }
                    }
                }
            }
        }
    }

    /// Visit every materialised voxel mutably (used to stamp precomputed data).
    pub fn for_each_materialized_mut<F: FnMut(IVec3, &mut Block)>(&mut self, mut f: F) {
        let size = self.size;
        for (&key, &slot) in &self.index {
            let tile = &mut self.pool[slot as usize];
            if tile.is_uniform() && tile.occupied_count() == 0 {
                continue;
            }
            let origin = key * TILE_SIZE as i32;
            for lz in 0..TILE_SIZE {
                for ly in 0..TILE_SIZE {
                    for lx in 0..TILE_SIZE {
                        let p = origin + IVec3::new(lx as i32, ly as i32, lz as i32);
                        if p.cmplt(size).all() {
                            f(p, tile.get_mut(lx, ly, lz));
                        }
                    }
                }
            }
        }
    }

    fn tile_mut(&mut self, key: IVec3) -> &mut Tile {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.pool.len() as u32;
                self.pool.push(Tile::air());
                self.index.insert(key, slot);
                slot
            }
        };
        &mut self.pool[slot as usize]
    }
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::empty()
    }
}

/// Tile containing the (in-bounds, non-negative) voxel `p`.
#[inline]
fn tile_coord(p: IVec3) -> IVec3 {
    IVec3::new(p.x >> TILE_SHIFT, p.y >> TILE_SHIFT, p.z >> TILE_SHIFT)
}

#[inline]
fn local_coord(p: IVec3) -> (usize, usize, usize) {
    (
        (p.x & TILE_MASK) as usize,
        (p.y & TILE_MASK) as usize,
        (p.z & TILE_MASK) as usize,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Rgba;

    #[test]
    fn set_then_get_roundtrip() {
        let mut store = BlockStore::new(32, 32, 32).unwrap();
        let b = Block::solid(Rgba::opaque(9, 8, 7));
        assert!(store.set(5, 5, 5, b));
        assert_eq!(store.get(5, 5, 5), (b, true));
        assert_eq!(store.get(5, 5, 6), (Block::AIR, false));
    }

    #[test]
    fn out_of_range_is_absent_in_every_direction() {
        let mut store = BlockStore::new(8, 8, 8).unwrap();
        store.set(0, 0, 0, Block::solid(Rgba::WHITE));
        for p in [
            IVec3::new(-1, 0, 0),
            IVec3::new(0, -1, 0),
            IVec3::new(0, 0, -1),
            IVec3::new(8, 0, 0),
            IVec3::new(0, 8, 0),
            IVec3::new(0, 0, 8),
            IVec3::new(i32::MIN, i32::MAX, 0),
        ] {
            assert_eq!(store.get(p.x, p.y, p.z), (Block::AIR, false), "{p}");
            assert!(store.get_raw_mut(p.x, p.y, p.z).is_none());
        }
        assert!(!store.set(-1, 0, 0, Block::solid(Rgba::WHITE)));
    }

    #[test]
    fn air_writes_do_not_materialise_tiles() {
        let mut store = BlockStore::new(64, 64, 64).unwrap();
        store.set(40, 40, 40, Block::AIR);
        assert_eq!(store.tile_count(), 0);
        store.set(40, 40, 40, Block::solid(Rgba::WHITE));
        assert_eq!(store.tile_count(), 1);
    }

    #[test]
    fn set_size_clears_contents() {
        let mut store = BlockStore::new(16, 16, 16).unwrap();
        store.set(1, 1, 1, Block::solid(Rgba::WHITE));
        store.set_size(16, 16, 16).unwrap();
        assert!(!store.get(1, 1, 1).1);
        assert!(store.set_size(0, 4, 4).is_err());
        assert!(store.set_size(4, 4, MAX_DIMENSION + 1).is_err());
        assert_eq!(
            store.set_size(4096, 4096, 4096),
            Err(WorldError::TooLarge {
                volume: 1 << 36,
                max: MAX_VOLUME
            })
        );
        // Previous extent survives a rejected resize.
        assert_eq!(store.size(), IVec3::splat(16));
        store.set_size(512, 512, 64).unwrap();
    }

    #[test]
    fn raw_handle_updates_in_place() {
        let mut store = BlockStore::new(16, 16, 16).unwrap();
        store.set(2, 3, 4, Block::solid(Rgba::WHITE));
        if let Some(b) = store.get_raw_mut(2, 3, 4) {
            b.is_reflective = true;
        }
        assert!(store.get(2, 3, 4).0.is_reflective);
    }

    #[test]
    fn occupied_iteration_respects_extent() {
        // 20 is not a multiple of the tile size; the last tile is partial.
        let mut store = BlockStore::new(20, 20, 20).unwrap();
        store.set(19, 19, 19, Block::solid(Rgba::WHITE));
        store.set(0, 0, 0, Block::solid(Rgba::WHITE));
        let mut seen = Vec::new();
        store.for_each_occupied(|p, _| seen.push(p));
        seen.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(seen, vec![IVec3::ZERO, IVec3::splat(19)]);
    }
}
