/// First-person camera with polar orientation
/// Keyboard movement and the per-pixel ray directions the scheduler casts
use glam::{Quat, Vec3};

/// Orientation in degrees. `theta` is the polar angle measured from +Z
/// (0 looks straight up, 90 is level, 180 straight down); `phi` is the
/// azimuth in the XY plane measured from +X.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Angle3 {
    pub theta: f32,
    pub phi: f32,
}

impl Angle3 {
    pub const fn new(theta: f32, phi: f32) -> Self {
        Self { theta, phi }
    }

    /// Keep `theta` inside the visible range without touching `phi`.
    pub fn clamp_to_view(self) -> Self {
        Self {
            theta: self.theta.clamp(0.0, 180.0),
            ..self
        }
    }

    /// Bring `theta` into [0, 180] and `phi` into [0, 360) while describing
    /// the same direction. A polar angle past a pole flips the azimuth.
    pub fn normalize(self) -> Self {
        let mut theta = self.theta.rem_euclid(360.0);
        let mut phi = self.phi;
        if theta > 180.0 {
            theta = 360.0 - theta;
            phi += 180.0;
        }
        Self {
            theta,
            phi: phi.rem_euclid(360.0),
        }
    }

    pub fn rotate_phi(self, degrees: f32) -> Self {
        Self {
            phi: self.phi + degrees,
            ..self
        }
        .normalize()
    }

    pub fn rotate_theta(self, degrees: f32) -> Self {
        Self {
            theta: self.theta + degrees,
            ..self
        }
        .normalize()
    }

    /// Level the view, keeping the azimuth.
    pub fn reset_theta(self) -> Self {
        Self {
            theta: 90.0,
            ..self
        }
    }

    /// Cartesian vector of length `r`: `r * (sin t cos p, sin t sin p, cos t)`.
    pub fn to_cartesian(self, r: f32) -> Vec3 {
        let (st, ct) = self.theta.to_radians().sin_cos();
        let (sp, cp) = self.phi.to_radians().sin_cos();
        Vec3::new(st * cp, st * sp, ct) * r
    }
}

impl Default for Angle3 {
    fn default() -> Self {
        Self::new(90.0, 0.0)
    }
}

pub struct Camera {
    pub position: Vec3,
    pub direction: Angle3,
    pub fov_h_degrees: f32,

    // Movement state
    /// World units per second
    pub move_speed: f32,
    /// Degrees per second
    pub turn_speed: f32,
}

impl Camera {
    pub fn new(position: Vec3, direction: Angle3) -> Self {
        Self {
            position,
            direction,
            fov_h_degrees: 55.0,
            move_speed: 18.0,
            turn_speed: 120.0,
        }
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        self.direction.to_cartesian(1.0)
    }

    /// Horizontal unit vector to the right of the view direction
    pub fn strafe_right(&self) -> Vec3 {
        self.direction.reset_theta().rotate_phi(90.0).to_cartesian(1.0)
    }

    /// Move along the view direction, the horizontal strafe axis and world Z.
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let move_vec = self.forward() * forward + self.strafe_right() * right + Vec3::Z * up;
        self.position += move_vec * self.move_speed * dt;
    }

    /// Positive `pitch` looks up, positive `yaw` turns right.
    pub fn turn(&mut self, pitch: f32, yaw: f32) {
        self.direction.theta -= pitch;
        self.direction = self.direction.clamp_to_view().rotate_phi(yaw);
    }

    /// Freeze the pose into per-row / per-column rotations for one frame.
    pub fn view(&self, width: usize, height: usize) -> CameraView {
        CameraView::new(self, width, height)
    }
}

/// Ray directions for one frame at a fixed resolution.
///
/// The forward vector +X is pitched about Y by the row offset, yawed about
/// Z by the column offset, then rotated by the camera orientation
/// (`theta - 90` about Y, then `phi` about Z). Offsets are sampled at pixel
/// centres with `fov_v = fov_h * height / width`. Row 0 is the bottom row.
pub struct CameraView {
    pub origin: Vec3,
    /// Orientation combined with each column's yaw offset
    columns: Vec<Quat>,
    /// Pitched forward vector for each row
    rows: Vec<Vec3>,
}

impl CameraView {
    pub fn new(camera: &Camera, width: usize, height: usize) -> Self {
        let fov_h = camera.fov_h_degrees;
        let deg_per_pixel = if width == 0 { 0.0 } else { fov_h / width as f32 };
        let fov_v = deg_per_pixel * height as f32;

        let orientation = Quat::from_rotation_z(camera.direction.phi.to_radians())
            * Quat::from_rotation_y((camera.direction.theta - 90.0).to_radians());

        let columns = (0..width)
            .map(|x| {
                let yaw = -fov_h / 2.0 + (x as f32 + 0.5) * deg_per_pixel;
                orientation * Quat::from_rotation_z(yaw.to_radians())
            })
            .collect();

        // Positive rotation about Y tips +X downwards.
        let rows = (0..height)
            .map(|row| {
                let pitch_down = fov_v / 2.0 - (row as f32 + 0.5) * deg_per_pixel;
                Quat::from_rotation_y(pitch_down.to_radians()) * Vec3::X
            })
            .collect();

        Self {
            origin: camera.position,
            columns,
            rows,
        }
    }

    /// Unit direction of the ray through pixel (`x`, `row`).
    #[inline]
    pub fn ray_direction(&self, x: usize, row: usize) -> Vec3 {
        self.columns[x] * self.rows[row]
    }
}

/// Camera controller - handles input state
#[derive(Default)]
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    pub look_up_pressed: bool,
    pub look_down_pressed: bool,
    pub turn_left_pressed: bool,
    pub turn_right_pressed: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update camera based on controller state
    pub fn update_camera(&self, camera: &mut Camera, dt: f32) {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;

        let forward = axis(self.forward_pressed, self.backward_pressed);
        let right = axis(self.right_pressed, self.left_pressed);
        let up = axis(self.up_pressed, self.down_pressed);
        camera.move_local(forward, right, up, dt);

        let pitch = axis(self.look_up_pressed, self.look_down_pressed);
        let yaw = axis(self.turn_right_pressed, self.turn_left_pressed);
        if pitch != 0.0 || yaw != 0.0 {
            let step = camera.turn_speed * dt;
            camera.turn(pitch * step, yaw * step);
        }
    }
}
