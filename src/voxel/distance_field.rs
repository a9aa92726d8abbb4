/// Distance-to-nearest-occupied-voxel field and its 8-bit presence map.
///
/// The field is built by six linear sweeps (forward and backward along each
/// axis). A running counter resets on occupied voxels, grows by one per step
/// and is folded with the value already stored in the cell, so distances
/// propagate across axes. The result is the exact Manhattan distance between
/// voxel centres, which bounds the Euclidean distance from both sides:
/// `d / sqrt(3) <= euclidean <= d`.
use super::store::BlockStore;
use glam::IVec3;
use rayon::prelude::*;

/// Value of cells with no occupied voxel reachable along the swept lines.
pub const FAR: u16 = u16::MAX;

pub const SQRT_3: f32 = 1.732_050_8;

pub struct DistanceField {
    size: IVec3,
    values: Vec<u16>,
}

impl DistanceField {
    #[inline]
    pub fn size(&self) -> IVec3 {
        self.size
    }

    #[inline]
    fn index(&self, p: IVec3) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.z < 0 || p.x >= self.size.x || p.y >= self.size.y || p.z >= self.size.z
        {
            return None;
        }
        let (sx, sy) = (self.size.x as usize, self.size.y as usize);
        Some(p.x as usize + p.y as usize * sx + p.z as usize * sx * sy)
    }

    /// Field value at `p`, `None` outside the grid.
    #[inline]
    pub fn get(&self, p: IVec3) -> Option<u16> {
        self.index(p).map(|i| self.values[i])
    }

    /// Conservative Euclidean distance from the centre of `p` to the centre
    /// of the nearest occupied voxel.
    #[inline]
    pub fn euclidean_lower_bound(&self, p: IVec3) -> Option<f32> {
        self.get(p).map(|d| d as f32 / SQRT_3)
    }

    pub fn values(&self) -> &[u16] {
        &self.values
    }
}

/// Build the distance field for the current occupancy of `store`.
pub fn compute_nearest_blocks(store: &BlockStore) -> DistanceField {
    let size = store.size();
    let (sx, sy, sz) = (size.x as usize, size.y as usize, size.z as usize);

    let mut values = vec![FAR; store.volume()];
    store.for_each_occupied(|p, _| {
        values[p.x as usize + p.y as usize * sx + p.z as usize * sx * sy] = 0;
    });

    if values.is_empty() {
        return DistanceField { size, values };
    }

    // X lines are contiguous rows.
    values
        .par_chunks_mut(sx)
        .for_each(|row| sweep_line(row, 0, 1, sx));

    // Y lines are strided within a z-slice.
    values
        .par_chunks_mut(sx * sy)
        .for_each(|slice| {
            for x in 0..sx {
                sweep_line(slice, x, sx, sy);
            }
        });

    // Z lines: walk whole slices, carrying one counter per (x, y) column.
    sweep_z(&mut values, sx * sy, sz);

    DistanceField { size, values }
}

/// Forward then backward sweep over `len` cells starting at `start`.
#[inline]
fn sweep_line(values: &mut [u16], start: usize, stride: usize, len: usize) {
    let mut d = FAR;
    for i in 0..len {
        d = step(&mut values[start + i * stride], d);
    }
    d = FAR;
    for i in (0..len).rev() {
        d = step(&mut values[start + i * stride], d);
    }
}

/// One sweep step: reset on occupied cells, otherwise advance the counter and
/// fold it with the stored value. Returns the new counter.
#[inline(always)]
fn step(cell: &mut u16, d: u16) -> u16 {
    if *cell == 0 {
        return 0;
    }
    let next = d.saturating_add(1).min(*cell);
    *cell = next;
    next
}

fn sweep_z(values: &mut [u16], slice_len: usize, depth: usize) {
    let mut carry = vec![FAR; slice_len];
    for z in 0..depth {
        let slice = &mut values[z * slice_len..(z + 1) * slice_len];
        for (cell, d) in slice.iter_mut().zip(carry.iter_mut()) {
            *d = step(cell, *d);
        }
    }
    carry.fill(FAR);
    for z in (0..depth).rev() {
        let slice = &mut values[z * slice_len..(z + 1) * slice_len];
        for (cell, d) in slice.iter_mut().zip(carry.iter_mut()) {
            *d = step(cell, *d);
        }
    }
}

/// Clamped 8-bit copy of the distance field, laid out for dense lookups in
/// the marching loop. Out-of-range lookups read 0.
pub struct PresenceMap {
    size: IVec3,
    stride_y: usize,
    stride_z: usize,
    present: Vec<u8>,
}

impl PresenceMap {
    pub fn from_field(field: &DistanceField) -> Self {
        let size = field.size();
        let present = field.values().iter().map(|&d| d.min(255) as u8).collect();
        Self {
            size,
            stride_y: size.x as usize,
            stride_z: size.x as usize * size.y as usize,
            present,
        }
    }

    #[inline]
    pub fn size(&self) -> IVec3 {
        self.size
    }

    #[inline(always)]
    pub fn get(&self, p: IVec3) -> u8 {
        if p.x < 0 || p.y < 0 || p.z < 0 || p.x >= self.size.x || p.y >= self.size.y || p.z >= self.size.z
        {
            return 0;
        }
        self.present[p.x as usize + p.y as usize * self.stride_y + p.z as usize * self.stride_z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{Block, Rgba};

    fn store_with(size: i32, points: &[IVec3]) -> BlockStore {
        let mut store = BlockStore::new(size, size, size).unwrap();
        for p in points {
            store.set(p.x, p.y, p.z, Block::solid(Rgba::WHITE));
        }
        store
    }

    #[test]
    fn single_voxel_gives_manhattan_distance() {
        let store = store_with(9, &[IVec3::splat(4)]);
        let field = compute_nearest_blocks(&store);
        assert_eq!(field.get(IVec3::splat(4)), Some(0));
        assert_eq!(field.get(IVec3::new(5, 4, 4)), Some(1));
        assert_eq!(field.get(IVec3::new(5, 5, 4)), Some(2));
        assert_eq!(field.get(IVec3::new(5, 5, 5)), Some(3));
        assert_eq!(field.get(IVec3::new(0, 0, 0)), Some(12));
        assert_eq!(field.get(IVec3::new(9, 0, 0)), None);
    }

    #[test]
    fn empty_world_is_far_everywhere() {
        let store = store_with(4, &[]);
        let field = compute_nearest_blocks(&store);
        assert!(field.values().iter().all(|&d| d == FAR));
        let pm = PresenceMap::from_field(&field);
        assert_eq!(pm.get(IVec3::ZERO), 255);
        assert_eq!(pm.get(IVec3::new(-1, 0, 0)), 0);
    }

    #[test]
    fn presence_map_clamps() {
        let mut store = BlockStore::new(400, 1, 1).unwrap();
        store.set(0, 0, 0, Block::solid(Rgba::WHITE));
        let field = compute_nearest_blocks(&store);
        let pm = PresenceMap::from_field(&field);
        assert_eq!(field.get(IVec3::new(300, 0, 0)), Some(300));
        assert_eq!(pm.get(IVec3::new(300, 0, 0)), 255);
        assert_eq!(pm.get(IVec3::new(10, 0, 0)), 10);
        assert_eq!(pm.get(IVec3::ZERO), 0);
    }
}
