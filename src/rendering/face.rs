/// Voxel face classification and mirror reflection.
use glam::{IVec3, Vec3};

/// Face of a unit voxel. Z is up; Left/Right are -X/+X, Back/Front -Y/+Y.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockFace {
    Bottom,
    Top,
    Left,
    Right,
    Back,
    Front,
}

impl BlockFace {
    /// Tolerance for "lies on a boundary plane".
    pub const EPSILON: f32 = 1e-3;
    /// Distance a reflected ray is pushed off the surface.
    pub const REFLECT_BIAS: f32 = 1e-3;

    pub const ALL: [BlockFace; 6] = [
        BlockFace::Bottom,
        BlockFace::Top,
        BlockFace::Left,
        BlockFace::Right,
        BlockFace::Back,
        BlockFace::Front,
    ];

    /// Which face of `voxel` the point `pos` lies on. Planes are tested in
    /// the order bottom, top, left, right, back, front; the first match wins,
    /// so edge and corner hits resolve deterministically.
    pub fn classify(pos: Vec3, voxel: IVec3) -> Option<BlockFace> {
        let lo = voxel.as_vec3();
        let hi = lo + Vec3::ONE;
        let near = |a: f32, b: f32| (a - b).abs() < Self::EPSILON;

        if near(pos.z, lo.z) {
            Some(BlockFace::Bottom)
        } else if near(pos.z, hi.z) {
            Some(BlockFace::Top)
        } else if near(pos.x, lo.x) {
            Some(BlockFace::Left)
        } else if near(pos.x, hi.x) {
            Some(BlockFace::Right)
        } else if near(pos.y, lo.y) {
            Some(BlockFace::Back)
        } else if near(pos.y, hi.y) {
            Some(BlockFace::Front)
        } else {
            None
        }
    }

    /// Outward unit normal.
    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            BlockFace::Bottom => Vec3::NEG_Z,
            BlockFace::Top => Vec3::Z,
            BlockFace::Left => Vec3::NEG_X,
            BlockFace::Right => Vec3::X,
            BlockFace::Back => Vec3::NEG_Y,
            BlockFace::Front => Vec3::Y,
        }
    }

    #[inline]
    fn axis(self) -> usize {
        match self {
            BlockFace::Left | BlockFace::Right => 0,
            BlockFace::Back | BlockFace::Front => 1,
            BlockFace::Bottom | BlockFace::Top => 2,
        }
    }

    /// Mirror `dir` about this face and push `pos` just outside it.
    #[inline]
    pub fn reflect(self, pos: Vec3, dir: Vec3) -> (Vec3, Vec3) {
        let mut out = dir;
        out[self.axis()] = -out[self.axis()];
        (pos + self.normal() * Self::REFLECT_BIAS, out)
    }

    /// Centre of this face of `voxel`.
    #[inline]
    pub fn center(self, voxel: IVec3) -> Vec3 {
        voxel.as_vec3() + Vec3::splat(0.5) + self.normal() * 0.5
    }

    /// Face whose normal is most aligned with `dir`.
    pub fn facing(dir: Vec3) -> BlockFace {
        let mut best = BlockFace::Top;
        let mut best_dot = f32::NEG_INFINITY;
        for face in Self::ALL {
            let d = face.normal().dot(dir);
            if d > best_dot {
                best_dot = d;
                best = face;
            }
        }
        best
    }
}
