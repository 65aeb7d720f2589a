//! Blinn-Phong shading with optional texturing and shadow mapping.

use crate::math::{Mat4, Vec2, Vec3, Vec4};
use crate::mesh::MeshVertex;
use crate::render::shader::{Fragment, ShaderProgram, VaryingSlots, Varyings};
use crate::texture::{DepthMap, Texture};

const AMBIENT: f32 = 0.3;
const SPECULAR_STRENGTH: f32 = 0.5;
const SHININESS: f32 = 32.0;
const SHADOW_BIAS: f32 = 0.05;

/// Varyings layout: world position (3), world normal (3), texcoord (2),
/// light-space position (4).
const VARYING_FLOATS: usize = 12;

/// Per-pixel Blinn-Phong lighting with a directional or point light, an
/// optional diffuse texture and an optional shadow map from a previous
/// depth-only pass.
pub struct BlinnPhongShader<'a> {
    pub mvp: Mat4,
    pub model: Mat4,
    /// Transform for normals; the inverse transpose of `model`. For the
    /// rigid transforms the demo uses, `model` itself works.
    pub normal_matrix: Mat4,
    /// Light projection * light view; composed with `model` per vertex.
    pub light_space: Mat4,
    pub light_pos: Vec3,
    pub light_dir: Vec3,
    pub view_pos: Vec3,
    /// Albedo when no diffuse map is bound.
    pub base_color: Vec3,
    /// Treat the light as a point light at `light_pos` instead of a
    /// directional light along `light_dir`.
    pub point_light: bool,
    pub diffuse_map: Option<&'a Texture>,
    pub shadow_map: Option<&'a DepthMap>,
    vars: VaryingSlots<VARYING_FLOATS>,
}

impl<'a> BlinnPhongShader<'a> {
    pub fn new() -> Self {
        Self {
            mvp: Mat4::identity(),
            model: Mat4::identity(),
            normal_matrix: Mat4::identity(),
            light_space: Mat4::identity(),
            light_pos: Vec3::ZERO,
            light_dir: Vec3::new(0.0, -1.0, 0.0),
            view_pos: Vec3::ZERO,
            base_color: Vec3::ONE,
            point_light: false,
            diffuse_map: None,
            shadow_map: None,
            vars: VaryingSlots::new(),
        }
    }

    /// 1.0 when the fragment is occluded from the light, 0.0 otherwise.
    fn shadow_factor(&self, light_frag: Vec4) -> f32 {
        let Some(map) = self.shadow_map else {
            return 0.0;
        };
        let ndc = light_frag.to_vec3_perspective();
        let closest = map.sample(0.5 * ndc.x + 0.5, 0.5 * ndc.y + 0.5);
        if ndc.z - SHADOW_BIAS > closest {
            1.0
        } else {
            0.0
        }
    }
}

impl<'a> Default for BlinnPhongShader<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ShaderProgram for BlinnPhongShader<'a> {
    type Attribute = MeshVertex;

    fn vertex(&mut self, input: [&MeshVertex; 3]) -> [Vec4; 3] {
        let mut positions = [Vec4::ZERO; 3];
        for (i, vert) in input.iter().enumerate() {
            let local = Vec4::from_vec3(vert.position, 1.0);
            let world = self.model * local;
            let normal = self.normal_matrix * Vec4::from_vec3(vert.normal, 0.0);
            let light = self.light_space * world;

            let v = self.vars.slot_mut(i);
            v[0] = world.x;
            v[1] = world.y;
            v[2] = world.z;
            v[3] = normal.x;
            v[4] = normal.y;
            v[5] = normal.z;
            v[6] = vert.texcoord.x;
            v[7] = vert.texcoord.y;
            v[8] = light.x;
            v[9] = light.y;
            v[10] = light.z;
            v[11] = light.w;

            positions[i] = self.mvp * local;
        }
        positions
    }

    fn fragment(&mut self, _frag: &Fragment) -> Option<Vec4> {
        let v = *self.vars.output();
        let frag_pos = Vec3::new(v[0], v[1], v[2]);
        let normal = Vec3::new(v[3], v[4], v[5]).normalize();
        let uv = Vec2::new(v[6], v[7]);
        let light_frag = Vec4::new(v[8], v[9], v[10], v[11]);

        let light_dir = if self.point_light {
            (self.light_pos - frag_pos).normalize()
        } else {
            -self.light_dir
        };
        let diffuse = normal.dot(light_dir).max(0.0);

        let view_dir = (self.view_pos - frag_pos).normalize();
        let half_dir = (light_dir + view_dir).normalize();
        let specular = normal.dot(half_dir).max(0.0).powf(SHININESS);

        let shadow = self.shadow_factor(light_frag);
        let albedo = match self.diffuse_map {
            Some(map) => map.sample_rgb(uv.x, uv.y),
            None => self.base_color,
        };

        let lit = albedo * (AMBIENT + (1.0 - shadow) * diffuse)
            + Vec3::ONE * ((1.0 - shadow) * SPECULAR_STRENGTH * specular);
        Some(Vec4::from_vec3(lit, 1.0))
    }

    fn varyings(&mut self) -> Option<Varyings<'_>> {
        Some(self.vars.view())
    }
}
