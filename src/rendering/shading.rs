/// Pixel colouring helpers kept apart from the marching loop.
use crate::voxel::Rgba;

/// Control points of a magma-like ramp, dark to bright.
const MAGMA: [Rgba; 5] = [
    Rgba::opaque(0, 0, 4),
    Rgba::opaque(81, 18, 124),
    Rgba::opaque(183, 55, 121),
    Rgba::opaque(252, 137, 97),
    Rgba::opaque(252, 253, 191),
];

/// Heat-map colour for a ray that needed `iterations` out of `scale`.
/// Values past `scale` saturate at the bright end.
#[inline]
pub fn iteration_heatmap(iterations: u32, scale: u32) -> Rgba {
    let t = if scale == 0 {
        1.0
    } else {
        (iterations as f32 / scale as f32).min(1.0)
    };
    magma(t)
}

/// Sample the ramp at `t` in `[0, 1]`.
pub fn magma(t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0) * (MAGMA.len() - 1) as f32;
    let i = (t.floor() as usize).min(MAGMA.len() - 2);
    MAGMA[i].lerp(MAGMA[i + 1], t - i as f32)
}

/// Composite a reflective surface over what its bounce ray saw.
#[inline]
pub fn composite_reflection(front: Rgba, bounce: Option<Rgba>) -> Rgba {
    match bounce {
        Some(back) => front.over(back),
        None => front,
    }
}
