//! The draw-call facade tying the pipeline stages together.
//!
//! One [`Renderer::process_triangle`] call runs the whole pipeline for a
//! single indexed triangle: the shader's vertex stage, near-plane clipping,
//! then rasterization of each resulting sub-triangle. Triangles are
//! processed strictly in submission order on the calling thread; pixels
//! within a triangle are visited row-major across its bounding box.
//!
//! The renderer exclusively owns its color and depth rasters. The shader is
//! borrowed mutably for the duration of each draw call, which also
//! guarantees a program is always bound when a triangle is processed.

use std::path::Path;

use crate::math::Vec4;
use crate::render::clipper::clip_triangle;
use crate::render::framebuffer::Framebuffer;
use crate::render::rasterizer::rasterize_triangle;
use crate::render::shader::ShaderProgram;
use crate::render::state::RenderState;

pub struct Renderer {
    framebuffer: Framebuffer,
    state: RenderState,
    /// Clip-space positions of the current triangle, with room for the up
    /// to six vertices near-plane clipping can produce. After a draw call
    /// the slots hold NDC positions with 1/w in the w component; exposed
    /// through [`Renderer::clip_vertices`] for instrumentation.
    clip: [Vec4; 6],
}

impl Renderer {
    /// Creates a renderer with the given viewport. The rasters are
    /// allocated once, at the 2048x2048 hard maximum, so later viewport
    /// changes never reallocate.
    ///
    /// # Panics
    /// Panics if the viewport is outside `[2, 2048]` on either axis.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            state: RenderState::default(),
            clip: [Vec4::ZERO; 6],
        }
    }

    pub fn width(&self) -> i32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> i32 {
        self.framebuffer.height()
    }

    pub fn enable(&mut self, flags: RenderState) {
        self.state |= flags;
    }

    pub fn disable(&mut self, flags: RenderState) {
        self.state &= !flags;
    }

    pub fn toggle(&mut self, flags: RenderState) {
        self.state ^= flags;
    }

    pub fn is_enabled(&self, flags: RenderState) -> bool {
        self.state.contains(flags)
    }

    /// See [`Framebuffer::set_viewport`].
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.framebuffer.set_viewport(width, height);
    }

    /// See [`Framebuffer::clear`].
    pub fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.framebuffer.clear(r, g, b, a);
    }

    /// Runs one triangle through vertex stage, clipper and rasterizer.
    ///
    /// The attribute records are opaque to the pipeline; only the shader
    /// interprets them. Rejected geometry (degenerate, back-facing,
    /// off-frustum) is skipped silently.
    pub fn process_triangle<S: ShaderProgram>(
        &mut self,
        shader: &mut S,
        v0: &S::Attribute,
        v1: &S::Attribute,
        v2: &S::Attribute,
    ) {
        let [p0, p1, p2] = shader.vertex([v0, v1, v2]);
        self.clip[0] = p0;
        self.clip[1] = p1;
        self.clip[2] = p2;

        let sub_triangles = clip_triangle(&mut self.clip, shader.varyings());
        for tri_idx in 0..sub_triangles {
            rasterize_triangle(
                &mut self.framebuffer,
                self.state,
                &mut self.clip,
                tri_idx,
                shader,
            );
        }
    }

    /// Raw RGBA8 pixels of the viewport, for texture upload by the host.
    pub fn color_buffer(&self) -> &[u8] {
        self.framebuffer.color_bytes()
    }

    /// Raw depth cells of the viewport, for shadow-map consumption by a
    /// later pass.
    pub fn depth_buffer(&self) -> &[f32] {
        self.framebuffer.depth_values()
    }

    /// The six-slot clip array as left by the last draw call.
    pub fn clip_vertices(&self) -> &[Vec4; 6] {
        &self.clip
    }

    /// Direct access to the underlying rasters, for per-pixel reads and
    /// host-drawn overlays.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// See [`Framebuffer::write_to_file`].
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P, flip: bool) -> image::ImageResult<()> {
        self.framebuffer.write_to_file(path, flip)
    }
}
