/// Per-viewer state that lives alongside a finalized world: the player pose
/// and the display toggles. Passed by reference to the scheduler each frame.
use crate::camera::{Angle3, Camera};
use glam::Vec3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Block colours with reflections
    #[default]
    Shaded,
    /// Heat map of primary-ray iteration counts
    Iterations,
}

pub struct Session {
    pub camera: Camera,
    pub render_mode: RenderMode,
    pub frame_count: u64,
}

impl Session {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            render_mode: RenderMode::Shaded,
            frame_count: 0,
        }
    }

    /// Session whose camera stands at `position` looking level along +X.
    pub fn at(position: Vec3) -> Self {
        Self::new(Camera::new(position, Angle3::default()))
    }

    pub fn toggle_render_mode(&mut self) -> RenderMode {
        self.render_mode = match self.render_mode {
            RenderMode::Shaded => RenderMode::Iterations,
            RenderMode::Iterations => RenderMode::Shaded,
        };
        self.render_mode
    }

    pub fn advance_frame(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_count
    }
}
