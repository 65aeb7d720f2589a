//! Texture and shadow-map sampling for fragment shaders.

use std::path::Path;

use crate::math::{Vec3, Vec4};

/// A 2D RGBA texture sampled with nearest-neighbor filtering.
pub struct Texture {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, etc.).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// Wrap raw RGBA8 pixels as a texture.
    ///
    /// # Panics
    /// Panics if `data` does not hold exactly `width * height` pixels.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Sample at UV coordinates with repeat wrapping.
    ///
    /// UVs use a bottom-left origin like the rest of the pipeline; image
    /// rows are stored top-down, so V is flipped during lookup.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        let u = u.rem_euclid(1.0);
        let v = (1.0 - v).rem_euclid(1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        let at = 4 * (y * self.width + x) as usize;
        Vec4::new(
            self.data[at] as f32 / 255.0,
            self.data[at + 1] as f32 / 255.0,
            self.data[at + 2] as f32 / 255.0,
            self.data[at + 3] as f32 / 255.0,
        )
    }

    /// Sample and drop alpha.
    #[inline]
    pub fn sample_rgb(&self, u: f32, v: f32) -> Vec3 {
        self.sample(u, v).to_vec3()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// An owned copy of a depth raster, sampled by UV with clamping.
///
/// This is the shadow-map side of the depth handoff: a depth-only pass
/// renders into a [`Renderer`], its [`depth_buffer`] slice is captured
/// here, and a later pass compares light-space depths against it.
///
/// [`Renderer`]: crate::render::renderer::Renderer
/// [`depth_buffer`]: crate::render::renderer::Renderer::depth_buffer
pub struct DepthMap {
    data: Vec<f32>,
    width: i32,
    height: i32,
}

impl DepthMap {
    /// Copy a depth raster. Cleared cells hold `f32::MAX`, written cells
    /// NDC z in [-1, 1].
    ///
    /// # Panics
    /// Panics if `data` does not hold exactly `width * height` cells.
    pub fn new(width: i32, height: i32, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (width * height) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Capture the current depth buffer of a renderer.
    pub fn from_renderer(renderer: &crate::render::renderer::Renderer) -> Self {
        Self::new(
            renderer.width(),
            renderer.height(),
            renderer.depth_buffer().to_vec(),
        )
    }

    /// Sample at UV coordinates in [0, 1], clamped to the edges.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let x = ((u * self.width as f32) as i32).clamp(0, self.width - 1);
        let y = ((v * self.height as f32) as i32).clamp(0, self.height - 1);
        self.data[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Texture {
        // Top image row: red, green. Bottom image row: blue, white.
        #[rustfmt::skip]
        let data = vec![
            255, 0, 0, 255,   0, 255, 0, 255,
            0, 0, 255, 255,   255, 255, 255, 255,
        ];
        Texture::from_raw(2, 2, data)
    }

    #[test]
    fn sampling_flips_v_to_bottom_left_origin() {
        let tex = two_by_two();
        // Low V addresses the bottom-left texel, which is the last image row.
        assert_eq!(tex.sample(0.1, 0.1), Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(tex.sample(0.9, 0.9), Vec4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn sampling_wraps_out_of_range_uvs() {
        let tex = two_by_two();
        assert_eq!(tex.sample(0.25, 0.25), tex.sample(1.25, 0.25));
        assert_eq!(tex.sample(0.25, 0.25), tex.sample(-0.75, 0.25));
    }

    #[test]
    fn depth_map_clamps_at_the_edges() {
        let map = DepthMap::new(2, 2, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(map.sample(0.0, 0.0), 0.1);
        assert_eq!(map.sample(2.0, 2.0), 0.4);
        assert_eq!(map.sample(-1.0, 0.0), 0.1);
    }
}
