//! A CPU-only 3D rasterizer with programmable shader stages.
//!
//! `softras` turns indexed triangle meshes into an RGBA color raster and an
//! `f32` depth raster entirely on the CPU: vertex shading into homogeneous
//! clip space, near-plane clipping, perspective-correct attribute
//! interpolation, bounding-box rasterization with integer edge functions,
//! backface culling, depth testing and a wireframe overlay mode. SDL2 is
//! used only to present the finished raster.
//!
//! # Quick Start
//!
//! ```no_run
//! use softras::prelude::*;
//!
//! let mut renderer = Renderer::new(800, 600);
//! renderer.enable(RenderState::DEPTH_TEST);
//! renderer.clear(0.0, 0.0, 0.0, 1.0);
//!
//! let mut shader = VertexColorShader::new();
//! renderer.process_triangle(
//!     &mut shader,
//!     &ColorVertex::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(1.0, 0.0, 0.0)),
//!     &ColorVertex::new(Vec3::new(0.5, -0.5, 0.0), Vec3::new(0.0, 1.0, 0.0)),
//!     &ColorVertex::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0)),
//! );
//! renderer.write_to_file("triangle.png", true).unwrap();
//! ```

pub mod math;
pub mod mesh;
pub mod render;
pub mod shaders;
pub mod texture;
pub mod window;

// Re-export the types most callers need at the crate root.
pub use render::renderer::Renderer;
pub use render::shader::ShaderProgram;
pub use render::state::RenderState;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::math::{Mat4, Vec2, Vec3, Vec4};
    pub use crate::mesh::{Mesh, MeshVertex};
    pub use crate::render::renderer::Renderer;
    pub use crate::render::shader::{Fragment, ShaderProgram, VaryingSlots, Varyings};
    pub use crate::render::state::RenderState;
    pub use crate::shaders::{BlinnPhongShader, ColorVertex, DepthShader, VertexColorShader};
    pub use crate::texture::{DepthMap, Texture};
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}
