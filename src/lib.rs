/// Voxel Marcher - CPU ray marching over a voxel grid
/// Distance-field empty-space skipping, baked point-light shadows,
/// one-bounce reflections and band-parallel frame rendering
pub mod camera;
pub mod error;
pub mod perf;
pub mod rendering;
pub mod session;
pub mod voxel;
pub mod world;

pub use camera::{Angle3, Camera, CameraController, CameraView};
pub use error::{RenderError, ViewerError, WorldError};
pub use perf::{CounterSnapshot, MarchCounters, MARCH_COUNTERS};
pub use rendering::{
    BlockFace, FrameScheduler, Framebuffer, MarchConfig, MarchResult, RayMarcher, RenderConfig,
    ShadowConfig,
};
pub use session::{RenderMode, Session};
pub use voxel::{Block, BlockStore, DistanceField, PresenceMap, Rgba};
pub use world::{generate_terrain, TerrainConfig, World, WorldBuilder};
