//! Flat-attribute shader: transform positions, interpolate vertex colors.

use crate::math::{Mat4, Vec3, Vec4};
use crate::render::shader::{Fragment, ShaderProgram, VaryingSlots, Varyings};

/// Attribute record for [`VertexColorShader`].
#[derive(Clone, Copy, Debug)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl ColorVertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

/// Transforms positions by a single matrix and shades fragments with the
/// interpolated per-vertex color.
pub struct VertexColorShader {
    pub mvp: Mat4,
    vars: VaryingSlots<3>,
}

impl VertexColorShader {
    pub fn new() -> Self {
        Self {
            mvp: Mat4::identity(),
            vars: VaryingSlots::new(),
        }
    }
}

impl Default for VertexColorShader {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram for VertexColorShader {
    type Attribute = ColorVertex;

    fn vertex(&mut self, input: [&ColorVertex; 3]) -> [Vec4; 3] {
        let mut positions = [Vec4::ZERO; 3];
        for (i, vert) in input.iter().enumerate() {
            *self.vars.slot_mut(i) = [vert.color.x, vert.color.y, vert.color.z];
            positions[i] = self.mvp * Vec4::from_vec3(vert.position, 1.0);
        }
        positions
    }

    fn fragment(&mut self, _frag: &Fragment) -> Option<Vec4> {
        let [r, g, b] = *self.vars.output();
        Some(Vec4::new(r, g, b, 1.0))
    }

    fn varyings(&mut self) -> Option<Varyings<'_>> {
        Some(self.vars.view())
    }
}
