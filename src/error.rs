use thiserror::Error;

/// Errors raised while building a world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("invalid world dimensions {x}x{y}x{z} (each axis must be in 1..={max})")]
    InvalidDimensions { x: i32, y: i32, z: i32, max: i32 },

    #[error("world of {volume} voxels exceeds the limit of {max}")]
    TooLarge { volume: usize, max: usize },

    #[error("light position ({x}, {y}, {z}) is outside the world")]
    LightOutOfBounds { x: i32, y: i32, z: i32 },
}

/// Errors raised while setting up the renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("band count must be at least 1")]
    NoBands,
}

/// Errors raised by the interactive viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("softbuffer error: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
