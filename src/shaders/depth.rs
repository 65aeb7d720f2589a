//! Depth-only shader for shadow-map passes.

use crate::math::{Mat4, Vec4};
use crate::mesh::MeshVertex;
use crate::render::shader::{Fragment, ShaderProgram};

/// Transforms vertices into light space and writes plain white; only the
/// depth raster produced by the pass matters. Carries no varyings, so the
/// clipper skips attribute interpolation entirely.
pub struct DepthShader {
    /// Light projection * light view * model.
    pub light_mvp: Mat4,
}

impl DepthShader {
    pub fn new() -> Self {
        Self {
            light_mvp: Mat4::identity(),
        }
    }
}

impl Default for DepthShader {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram for DepthShader {
    type Attribute = MeshVertex;

    fn vertex(&mut self, input: [&MeshVertex; 3]) -> [Vec4; 3] {
        input.map(|v| self.light_mvp * Vec4::from_vec3(v.position, 1.0))
    }

    fn fragment(&mut self, _frag: &Fragment) -> Option<Vec4> {
        Some(Vec4::ONE)
    }
}
