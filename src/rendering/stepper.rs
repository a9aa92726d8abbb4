/// Exact voxel boundary stepping (Amanatides & Woo).
///
/// Each call to `step` moves the ray onto the nearest integer boundary plane
/// and into the neighbouring voxel. Axes with a zero direction component
/// never cross a boundary: their `t_max` and `t_delta` are +inf, so no
/// division by zero can happen and the axis is never picked.
use glam::{IVec3, Vec3};

#[derive(Copy, Clone, Debug)]
pub struct BoundaryStepper {
    origin: Vec3,
    dir: Vec3,
    voxel: IVec3,
    position: Vec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
}

impl BoundaryStepper {
    /// Seed a stepper at `position`, which must lie inside (or on the
    /// boundary of) `voxel`. `dir` is expected to be normalised.
    pub fn new(position: Vec3, voxel: IVec3, dir: Vec3) -> Self {
        let (sx, dx, mx) = axis_setup(position.x, voxel.x, dir.x);
        let (sy, dy, my) = axis_setup(position.y, voxel.y, dir.y);
        let (sz, dz, mz) = axis_setup(position.z, voxel.z, dir.z);
        Self {
            origin: position,
            dir,
            voxel,
            position,
            step: IVec3::new(sx, sy, sz),
            t_max: Vec3::new(mx, my, mz),
            t_delta: Vec3::new(dx, dy, dz),
        }
    }

    #[inline]
    pub fn voxel(&self) -> IVec3 {
        self.voxel
    }

    /// Current point on the ray. After a step it lies exactly on the
    /// boundary plane that was crossed.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn t_max(&self) -> Vec3 {
        self.t_max
    }

    #[inline]
    pub fn t_delta(&self) -> Vec3 {
        self.t_delta
    }

    /// Advance to the next voxel. Returns the axis (0 = x, 1 = y, 2 = z)
    /// that was crossed, or `None` when the direction is zero.
    #[inline]
    pub fn step(&mut self) -> Option<usize> {
        let axis = if self.t_max.x <= self.t_max.y && self.t_max.x <= self.t_max.z {
            0
        } else if self.t_max.y <= self.t_max.z {
            1
        } else {
            2
        };

        let t = self.t_max[axis];
        if !t.is_finite() {
            return None;
        }

        let step = self.step[axis];
        let old = self.voxel[axis];
        self.voxel[axis] = old + step;
        self.position = self.origin + self.dir * t;
        // Snap onto the crossed plane so face classification is exact.
        self.position[axis] = if step > 0 { (old + 1) as f32 } else { old as f32 };
        self.t_max[axis] += self.t_delta[axis];
        Some(axis)
    }
}

/// Returns (step, t_delta, t_max) for one axis.
#[inline]
fn axis_setup(pos: f32, cell: i32, dir: f32) -> (i32, f32, f32) {
    if dir > 0.0 {
        (1, 1.0 / dir, ((cell + 1) as f32 - pos) / dir)
    } else if dir < 0.0 {
        (-1, -1.0 / dir, (cell as f32 - pos) / dir)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_components_never_cross() {
        let mut s = BoundaryStepper::new(Vec3::new(0.5, 0.5, 0.5), IVec3::ZERO, Vec3::X);
        assert!(s.t_max().y.is_infinite() && s.t_delta().z.is_infinite());
        for i in 1..=5 {
            assert_eq!(s.step(), Some(0));
            assert_eq!(s.voxel(), IVec3::new(i, 0, 0));
            assert_eq!(s.position().x, i as f32);
            assert_eq!(s.position().y, 0.5);
        }
    }

    #[test]
    fn zero_direction_does_not_move() {
        let mut s = BoundaryStepper::new(Vec3::splat(1.5), IVec3::ONE, Vec3::ZERO);
        assert_eq!(s.step(), None);
        assert_eq!(s.voxel(), IVec3::ONE);
    }

    #[test]
    fn negative_direction_leaves_through_lower_plane() {
        let mut s = BoundaryStepper::new(Vec3::new(2.5, 0.5, 0.5), IVec3::new(2, 0, 0), Vec3::NEG_X);
        assert_eq!(s.step(), Some(0));
        assert_eq!(s.voxel(), IVec3::new(1, 0, 0));
        assert_eq!(s.position().x, 2.0);
    }

    #[test]
    fn diagonal_visits_face_connected_cells() {
        let dir = Vec3::new(1.0, 1.0, 0.0).normalize();
        let mut s = BoundaryStepper::new(Vec3::new(0.5, 0.2, 0.5), IVec3::ZERO, dir);
        let mut prev = s.voxel();
        for _ in 0..10 {
            s.step();
            let d = (s.voxel() - prev).abs();
            assert_eq!(d.x + d.y + d.z, 1, "each step crosses exactly one face");
            prev = s.voxel();
        }
    }
}
