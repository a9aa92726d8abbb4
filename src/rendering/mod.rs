/// Ray-marching renderer
/// Marching core, baked shadows and the parallel frame scheduler
pub mod face;
pub mod framebuffer;
pub mod marcher;
pub mod scheduler;
pub mod shading;
pub mod shadows;
pub mod stepper;

pub use face::BlockFace;
pub use framebuffer::{FrameSlice, Framebuffer};
pub use marcher::{MarchConfig, MarchHit, MarchResult, RayMarcher};
pub use scheduler::{FrameScheduler, RenderConfig};
pub use shadows::{compute_shadows, ShadowConfig};
pub use stepper::BoundaryStepper;
