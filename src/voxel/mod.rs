/// Voxel storage and the precomputed acceleration data derived from it
pub mod block;
pub mod distance_field;
pub mod store;
pub mod tile;

pub use block::{Block, Rgba};
pub use distance_field::{compute_nearest_blocks, DistanceField, PresenceMap};
pub use store::BlockStore;
pub use tile::{Tile, TILE_SIZE, TILE_VOLUME};
