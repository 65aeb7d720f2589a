//! Renderer capability flags.

use bitflags::bitflags;

bitflags! {
    /// Pipeline toggles checked during rasterization.
    ///
    /// All flags are off by default; each one is independently switchable
    /// through [`Renderer::enable`], [`Renderer::disable`] and
    /// [`Renderer::toggle`].
    ///
    /// [`Renderer::enable`]: crate::render::renderer::Renderer::enable
    /// [`Renderer::disable`]: crate::render::renderer::Renderer::disable
    /// [`Renderer::toggle`]: crate::render::renderer::Renderer::toggle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RenderState: u32 {
        /// Skip triangles whose signed screen area is negative.
        const CULL_FACE = 1 << 0;
        /// Only draw pixels within a thin band along triangle edges.
        const WIREFRAME = 1 << 1;
        /// Test interpolated depth against the depth buffer before writing.
        const DEPTH_TEST = 1 << 2;
    }
}
