/// Framebuffer for the software ray marcher
/// Stores one straight-alpha colour per pixel
///
/// Layout: row-major, row 0 is the BOTTOM of the image (camera pitch grows
/// with the row index). `present_into` flips to the top-down order a window
/// surface expects.
use crate::voxel::Rgba;

/// View into a contiguous set of rows in the framebuffer.
/// Used for multi-core rendering where each worker owns a disjoint band.
pub struct FrameSlice<'a> {
    pub width: usize,
    pub y0: usize,
    pub height: usize,
    pub pixels: &'a mut [Rgba],
}

impl<'a> FrameSlice<'a> {
    /// Global row indices covered by this band.
    #[inline]
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.y0..self.y0 + self.height
    }

    /// Mutable view of one global row, or None when the row is not ours.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> Option<&mut [Rgba]> {
        if row < self.y0 || row >= self.y0 + self.height {
            return None;
        }
        let start = (row - self.y0) * self.width;
        Some(&mut self.pixels[start..start + self.width])
    }
}

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixel at column `x` of row `row` (row 0 = bottom).
    #[inline]
    pub fn pixel(&self, x: usize, row: usize) -> Option<Rgba> {
        if x >= self.width || row >= self.height {
            return None;
        }
        Some(self.pixels[row * self.width + x])
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, row: usize, color: Rgba) {
        if x < self.width && row < self.height {
            self.pixels[row * self.width + x] = color;
        }
    }

    /// Create a FrameSlice covering the entire framebuffer
    pub fn as_full_slice_mut(&mut self) -> FrameSlice<'_> {
        FrameSlice {
            width: self.width,
            y0: 0,
            height: self.height,
            pixels: &mut self.pixels,
        }
    }

    /// Resize framebuffer; contents are unspecified until the next render.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.resize(width * height, Rgba::TRANSPARENT);
    }

    /// Split the framebuffer into horizontal stripes for multi-core rendering.
    /// Each stripe owns a disjoint subset of rows, so they can be rendered in parallel.
    pub fn split_into_stripes(&mut self, stripes: usize) -> Vec<FrameSlice<'_>> {
        let stripes = stripes.max(1);
        let width = self.width;
        let height = self.height;

        let mut slices = Vec::with_capacity(stripes);
        let mut remaining: &mut [Rgba] = self.pixels.as_mut_slice();

        let mut y0 = 0usize;
        let rows_per_stripe = height.div_ceil(stripes);

        for _ in 0..stripes {
            if y0 >= height {
                break;
            }
            let rows = (height - y0).min(rows_per_stripe);
            let (head, tail) = remaining.split_at_mut(rows * width);

            slices.push(FrameSlice {
                width,
                y0,
                height: rows,
                pixels: head,
            });

            remaining = tail;
            y0 += rows;
        }

        slices
    }

    /// Copy into a top-down `0x00RRGGBB` surface buffer, compositing each
    /// pixel over black. `out` must hold exactly `width * height` entries.
    pub fn present_into(&self, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.pixels.len());
        if self.width == 0 {
            return;
        }
        for (dst_row, src_row) in out
            .chunks_exact_mut(self.width)
            .zip(self.pixels.chunks_exact(self.width).rev())
        {
            for (dst, src) in dst_row.iter_mut().zip(src_row) {
                *dst = src.to_argb_premultiplied();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripes_cover_every_row_once() {
        let mut fb = Framebuffer::new(3, 10);
        let stripes = fb.split_into_stripes(4);
        assert_eq!(stripes.len(), 4);
        let rows: Vec<usize> = stripes.iter().flat_map(|s| s.rows()).collect();
        assert_eq!(rows, (0..10).collect::<Vec<_>>());
        assert!(stripes.iter().all(|s| s.pixels.len() == s.height * 3));
    }

    #[test]
    fn more_stripes_than_rows() {
        let mut fb = Framebuffer::new(2, 2);
        assert_eq!(fb.split_into_stripes(8).len(), 2);
    }

    #[test]
    fn present_flips_rows() {
        let mut fb = Framebuffer::new(1, 2);
        fb.set_pixel(0, 0, Rgba::opaque(255, 0, 0));
        fb.set_pixel(0, 1, Rgba::opaque(0, 0, 255));
        let mut out = [0u32; 2];
        fb.present_into(&mut out);
        // Top of the surface is the highest row.
        assert_eq!(out, [0x0000_00FF, 0x00FF_0000]);
    }

    #[test]
    fn row_mut_rejects_foreign_rows() {
        let mut fb = Framebuffer::new(2, 4);
        let mut stripes = fb.split_into_stripes(2);
        assert!(stripes[0].row_mut(2).is_none());
        assert_eq!(stripes[1].row_mut(3).map(|r| r.len()), Some(2));
    }
}
