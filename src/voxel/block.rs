/// Per-voxel render state and the colour operations the passes need.
/// Colours are non-premultiplied RGBA8.

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Composite `self` over `back` (Porter-Duff "over", straight alpha).
    /// The result is again non-premultiplied.
    #[inline]
    pub fn over(self, back: Rgba) -> Rgba {
        let fa = self.a as u32;
        let ba = back.a as u32 * (255 - fa);
        // out_a scaled by 255
        let out_a = fa * 255 + ba;
        if out_a == 0 {
            return Rgba::TRANSPARENT;
        }
        let channel = |f: u8, b: u8| -> u8 {
            let num = f as u32 * fa * 255 + b as u32 * ba;
            ((num + out_a / 2) / out_a) as u8
        };
        Rgba {
            r: channel(self.r, back.r),
            g: channel(self.g, back.g),
            b: channel(self.b, back.b),
            a: ((out_a + 127) / 255) as u8,
        }
    }

    /// Shadow darkening: replaces alpha with `255 * factor`.
    #[inline]
    pub fn with_alpha_factor(self, factor: f32) -> Rgba {
        let a = (255.0 * factor.clamp(0.0, 1.0)).round() as u8;
        Rgba { a, ..self }
    }

    /// Composite over black and pack as `0x00RRGGBB` for a softbuffer surface.
    #[inline]
    pub fn to_argb_premultiplied(self) -> u32 {
        let a = self.a as u32;
        let r = (self.r as u32 * a + 127) / 255;
        let g = (self.g as u32 * a + 127) / 255;
        let b = (self.b as u32 * a + 127) / 255;
        (r << 16) | (g << 8) | b
    }

    /// Linear blend between two colours, `t` in `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// One voxel's render-relevant state. `Block::AIR` (the zero value) is empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub color: Rgba,
    pub occupied: bool,
    pub is_light_source: bool,
    pub is_reflective: bool,
    /// Written by the distance field builder; 0 for occupied voxels.
    pub distance_to_nearest: u16,
}

impl Block {
    pub const AIR: Block = Block {
        color: Rgba::TRANSPARENT,
        occupied: false,
        is_light_source: false,
        is_reflective: false,
        distance_to_nearest: 0,
    };

    /// An occupied, non-reflective voxel of the given colour.
    #[inline]
    pub const fn solid(color: Rgba) -> Self {
        Block {
            color,
            occupied: true,
            is_light_source: false,
            is_reflective: false,
            distance_to_nearest: 0,
        }
    }

    /// An occupied voxel that spawns a bounce ray when hit.
    #[inline]
    pub const fn reflective(color: Rgba) -> Self {
        Block {
            is_reflective: true,
            ..Block::solid(color)
        }
    }

    #[inline]
    pub const fn light() -> Self {
        Block {
            is_light_source: true,
            ..Block::solid(Rgba::WHITE)
        }
    }
}
