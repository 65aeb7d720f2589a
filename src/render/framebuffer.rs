//! Color and depth rasters with a resizable viewport.
//!
//! The framebuffer owns two independently addressed rasters: an RGBA8 color
//! buffer (four bytes per pixel, row-major) and an `f32` depth buffer in the
//! same row-major order. Both are allocated once, at the hard maximum of
//! 2048x2048 pixels; [`Framebuffer::set_viewport`] only changes the logical
//! extent, never the allocation.
//!
//! Row 0 is the bottom of the image (lower-left origin). The PNG writer can
//! flip vertically for viewers that expect a top-left origin.

use std::path::Path;

use crate::math::Vec4;

/// Hard upper bound for the viewport width.
pub const MAX_WIDTH: i32 = 2048;
/// Hard upper bound for the viewport height.
pub const MAX_HEIGHT: i32 = 2048;

const MIN_EXTENT: i32 = 2;

/// Quantize a [0, 1] float channel to 8 bits.
///
/// The 255.999 factor maps 1.0 to 255 without a rounding step; values
/// outside [0, 1] are clamped first.
#[inline]
pub fn quantize_channel(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.999) as u8
}

/// Owning pair of color and depth rasters.
pub struct Framebuffer {
    color: Vec<u8>,
    depth: Vec<f32>,
    width: i32,
    height: i32,
}

impl Framebuffer {
    /// Allocates the rasters at maximum capacity and clears them to opaque
    /// black.
    ///
    /// # Panics
    /// Panics if `width` or `height` is outside `[2, 2048]`.
    pub fn new(width: i32, height: i32) -> Self {
        assert_extent(width, height);
        let mut fb = Self {
            color: vec![0; (MAX_WIDTH * MAX_HEIGHT) as usize * 4],
            depth: vec![0.0; (MAX_WIDTH * MAX_HEIGHT) as usize],
            width,
            height,
        };
        fb.clear(0.0, 0.0, 0.0, 1.0);
        fb
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Updates the logical extent. The underlying allocation is unchanged
    /// because it was sized to the hard maximum up front.
    ///
    /// # Panics
    /// Panics if `width` or `height` is outside `[2, 2048]`.
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        assert_extent(width, height);
        self.width = width;
        self.height = height;
    }

    /// Sets every color pixel to the quantized `(r, g, b, a)` tuple and
    /// every depth cell to `f32::MAX`.
    pub fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        let pixel = [
            quantize_channel(r),
            quantize_channel(g),
            quantize_channel(b),
            quantize_channel(a),
        ];
        let count = (self.width * self.height) as usize;
        for chunk in self.color[..4 * count].chunks_exact_mut(4) {
            chunk.copy_from_slice(&pixel);
        }
        self.depth[..count].fill(f32::MAX);
    }

    /// Quantizes `color` and writes it at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the viewport; out-of-bounds writes are
    /// programming errors, not geometry to be tolerated.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Vec4) {
        self.assert_bounds(x, y);
        let at = 4 * (y * self.width + x) as usize;
        self.color[at] = quantize_channel(color.x);
        self.color[at + 1] = quantize_channel(color.y);
        self.color[at + 2] = quantize_channel(color.z);
        self.color[at + 3] = quantize_channel(color.w);
    }

    /// Returns the depth value stored at `(x, y)`.
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the viewport.
    #[inline]
    pub fn depth(&self, x: i32, y: i32) -> f32 {
        self.assert_bounds(x, y);
        self.depth[(y * self.width + x) as usize]
    }

    /// Stores `z` at `(x, y)` as given (NDC z for written pixels).
    ///
    /// # Panics
    /// Panics if `(x, y)` is outside the viewport.
    #[inline]
    pub fn set_depth(&mut self, x: i32, y: i32, z: f32) {
        self.assert_bounds(x, y);
        self.depth[(y * self.width + x) as usize] = z;
    }

    /// Raw RGBA8 pixels of the current extent, row-major from the bottom
    /// row up. Suitable for direct texture upload.
    pub fn color_bytes(&self) -> &[u8] {
        &self.color[..4 * (self.width * self.height) as usize]
    }

    /// Raw depth cells of the current extent, in the same row-major order
    /// as the color pixels. Cleared cells hold `f32::MAX`; written cells
    /// hold NDC z in [-1, 1]. This is the shadow-map handoff surface.
    pub fn depth_values(&self) -> &[f32] {
        &self.depth[..(self.width * self.height) as usize]
    }

    /// Writes the current extent as a PNG. With `flip` the rows are
    /// reversed so the bottom-left-origin raster displays upright in
    /// top-left-origin viewers.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, flip: bool) -> image::ImageResult<()> {
        let (w, h) = (self.width as u32, self.height as u32);
        if flip {
            let row = 4 * self.width as usize;
            let mut flipped = Vec::with_capacity(row * self.height as usize);
            for chunk in self.color_bytes().chunks_exact(row).rev() {
                flipped.extend_from_slice(chunk);
            }
            image::save_buffer(path, &flipped, w, h, image::ExtendedColorType::Rgba8)
        } else {
            image::save_buffer(
                path,
                self.color_bytes(),
                w,
                h,
                image::ExtendedColorType::Rgba8,
            )
        }
    }

    #[inline]
    fn assert_bounds(&self, x: i32, y: i32) {
        assert!(
            x >= 0 && x < self.width && y >= 0 && y < self.height,
            "pixel ({x}, {y}) outside {}x{} viewport",
            self.width,
            self.height
        );
    }
}

fn assert_extent(width: i32, height: i32) {
    assert!(
        (MIN_EXTENT..=MAX_WIDTH).contains(&width) && (MIN_EXTENT..=MAX_HEIGHT).contains(&height),
        "viewport {width}x{height} outside [{MIN_EXTENT}, {MAX_WIDTH}]x[{MIN_EXTENT}, {MAX_HEIGHT}]"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_quantizes_channels_and_resets_depth() {
        let mut fb = Framebuffer::new(4, 3);
        fb.clear(0.25, 0.5, 0.75, 1.0);

        let expected = [
            (0.25f32 * 255.999) as u8,
            (0.5f32 * 255.999) as u8,
            (0.75f32 * 255.999) as u8,
            255,
        ];
        for pixel in fb.color_bytes().chunks_exact(4) {
            assert_eq!(pixel, expected);
        }
        assert!(fb.depth_values().iter().all(|&z| z == f32::MAX));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut fb = Framebuffer::new(8, 8);
        fb.clear(0.1, 0.9, 0.3, 0.5);
        let color: Vec<u8> = fb.color_bytes().to_vec();
        let depth: Vec<f32> = fb.depth_values().to_vec();

        fb.clear(0.1, 0.9, 0.3, 0.5);
        assert_eq!(fb.color_bytes(), &color[..]);
        assert_eq!(fb.depth_values(), &depth[..]);
    }

    #[test]
    fn clear_clamps_out_of_range_channels() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(-1.0, 2.0, 0.0, 1.0);
        assert_eq!(&fb.color_bytes()[..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn set_pixel_writes_quantized_rgba() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(2, 1, Vec4::new(1.0, 0.0, 0.5, 1.0));

        let at = 4 * (4 + 2) as usize;
        assert_eq!(
            &fb.color_bytes()[at..at + 4],
            &[255, 0, (0.5f32 * 255.999) as u8, 255]
        );
    }

    #[test]
    fn depth_round_trips() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_depth(3, 2, -0.25);
        assert_eq!(fb.depth(3, 2), -0.25);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn set_pixel_out_of_bounds_is_fatal() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(4, 0, Vec4::ONE);
    }

    #[test]
    #[should_panic(expected = "viewport")]
    fn oversized_viewport_is_fatal() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_viewport(MAX_WIDTH + 1, 4);
    }

    #[test]
    fn viewport_resize_repacks_rows() {
        let mut fb = Framebuffer::new(100, 100);
        fb.clear(1.0, 1.0, 1.0, 1.0);

        fb.set_viewport(50, 60);
        fb.clear(0.0, 0.0, 0.0, 1.0);
        fb.set_pixel(49, 59, Vec4::ONE);

        assert_eq!(fb.color_bytes().len(), 50 * 60 * 4);
        assert_eq!(fb.depth_values().len(), 50 * 60);
        let at = 4 * (59 * 50 + 49);
        assert_eq!(&fb.color_bytes()[at..at + 4], &[255, 255, 255, 255]);
    }

    #[test]
    fn png_snapshot_flips_rows() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(0.0, 0.0, 0.0, 1.0);
        fb.set_pixel(0, 0, Vec4::new(1.0, 0.0, 0.0, 1.0));

        let path = std::env::temp_dir().join("softras_snapshot_test.png");
        fb.write_to_file(&path, true).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        // Bottom raster row lands on the bottom image row after the flip.
        assert_eq!(img.get_pixel(0, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        std::fs::remove_file(&path).ok();
    }
}
