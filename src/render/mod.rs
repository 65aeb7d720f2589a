//! The CPU rendering pipeline.
//!
//! A draw call flows through three stages, strictly in order and on the
//! calling thread: the shader's vertex stage produces homogeneous clip-space
//! positions, the clipper splits or rejects the triangle against the near
//! plane, and the rasterizer walks each surviving sub-triangle's bounding
//! box writing color and depth into the [framebuffer].

pub mod framebuffer;
pub mod renderer;
pub mod shader;
pub mod state;

pub(crate) mod clipper;
pub(crate) mod rasterizer;

pub use framebuffer::Framebuffer;
pub use renderer::Renderer;
pub use shader::{Fragment, ShaderProgram, VaryingSlots, Varyings};
pub use state::RenderState;
