/// Fixed-size storage tile for the block store.
/// Uses an enum so all-air (and other homogeneous) tiles stay a single value
use super::Block;

pub const TILE_SIZE: usize = 16;
pub const TILE_SIZE_I32: i32 = TILE_SIZE as i32;
pub const TILE_VOLUME: usize = TILE_SIZE * TILE_SIZE * TILE_SIZE;
/// log2(TILE_SIZE), used to split world coordinates into tile / local parts.
pub const TILE_SHIFT: u32 = 4;
pub const TILE_MASK: i32 = TILE_SIZE_I32 - 1;

/// Tile storage optimized for common cases
/// Homogeneous tiles are stored as a single block value
pub enum TileData {
    /// Every voxel holds the same block
    Uniform(Block),
    /// Heterogeneous voxels - stores full array
    /// Boxed to keep the pool entries small
    Varied(Box<[Block; TILE_VOLUME]>),
}

pub struct Tile {
    pub data: TileData,
}

impl Tile {
    pub fn uniform(block: Block) -> Self {
        Self {
            data: TileData::Uniform(block),
        }
    }

    pub fn air() -> Self {
        Self::uniform(Block::AIR)
    }

    /// Get block at local coordinates (0..TILE_SIZE)
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        debug_assert!(x < TILE_SIZE && y < TILE_SIZE && z < TILE_SIZE);

        match &self.data {
            TileData::Uniform(block) => *block,
            TileData::Varied(blocks) => blocks[coords_to_index(x, y, z)],
        }
    }

    #[inline]
    pub fn is_uniform(&self) -> bool {
        matches!(self.data, TileData::Uniform(_))
    }

    /// Set block at local coordinates (0..TILE_SIZE)
    /// Converts uniform tiles to varied if the value differs
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: Block) {
        if let TileData::Uniform(uniform) = &self.data {
            if *uniform == block {
                return;
            }
        }
        *self.get_mut(x, y, z) = block;
    }

    /// Mutable handle to a voxel. Always expands the tile to varied storage.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Block {
        debug_assert!(x < TILE_SIZE && y < TILE_SIZE && z < TILE_SIZE);

        if let TileData::Uniform(uniform) = self.data {
            self.data = TileData::Varied(Box::new([uniform; TILE_VOLUME]));
        }

        match &mut self.data {
            TileData::Varied(blocks) => &mut blocks[coords_to_index(x, y, z)],
            TileData::Uniform(_) => unreachable!("tile was expanded above"),
        }
    }

    /// Number of occupied voxels in this tile.
    pub fn occupied_count(&self) -> usize {
        match &self.data {
            TileData::Uniform(block) => {
                if block.occupied {
                    TILE_VOLUME
                } else {
                    0
                }
            }
            TileData::Varied(blocks) => blocks.iter().filter(|b| b.occupied).count(),
        }
    }
}

/// Convert 3D local coordinates to linear index
#[inline]
pub const fn coords_to_index(x: usize, y: usize, z: usize) -> usize {
    (z * TILE_SIZE * TILE_SIZE) + (y * TILE_SIZE) + x
}
