//! Bounding-box triangle rasterization with integer edge functions.
//!
//! Each sub-triangle coming out of the clipper is mapped to integer pixel
//! coordinates, an edge-function setup is computed once, and the clamped
//! screen-space bounding box is walked row by row. The three edge weights
//! are updated additively per pixel and per row, so the inner loop contains
//! no multiplications; at every covered pixel the weights divided by twice
//! the signed area are the screen-linear barycentric coordinates.
//!
//! The per-pixel work is: inside test (with a small tolerance so shared
//! edges don't crack), perspective correction, the optional wireframe band
//! test, screen-linear depth interpolation with NDC range rejection, the
//! optional depth test, varying interpolation, and the fragment stage.

use crate::math::{Vec3, Vec4};
use crate::render::framebuffer::Framebuffer;
use crate::render::shader::{perspective_correct, Fragment, ShaderProgram};
use crate::render::state::RenderState;

/// Inside tolerance for the barycentric sign test. Slightly negative
/// coordinates still count as covered, which fills hairline cracks where
/// two triangles share an edge.
pub(crate) const RASTER_EPSILON: f32 = 5.0e-5;

/// Integer screen-space setup for one triangle.
///
/// The y components of the edge deltas are negated up front so the weight
/// formulas below need no further sign handling. `surface` is twice the
/// signed screen area: zero means degenerate, negative means back-facing.
struct ScreenTri {
    x: [i32; 3],
    y: [i32; 3],
    d01: [i32; 2],
    d12: [i32; 2],
    d20: [i32; 2],
    surface: i32,
}

/// Pixel-space bounding box, inclusive on all sides.
struct Bbox {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

/// Replaces the homogeneous position with its NDC equivalent, keeping the
/// reciprocal of the original w for perspective correction:
/// `(x, y, z, w) -> (x/w, y/w, z/w, 1/w)`.
#[inline]
fn normalize_coordinates(p: &mut Vec4) {
    p.w = 1.0 / p.w;
    p.x *= p.w;
    p.y *= p.w;
    p.z *= p.w;
}

/// Maps NDC x/y in [-1, 1] to integer pixel coordinates and precomputes the
/// edge deltas and doubled signed area.
fn screen_setup(p0: &Vec4, p1: &Vec4, p2: &Vec4, width: i32, height: i32) -> ScreenTri {
    // [-1, 1] -> [0, extent); the 0.001 shave keeps +1.0 inside the last
    // pixel column/row instead of one past it.
    let w = width as f32 - 0.001;
    let h = height as f32 - 0.001;

    let x = [
        ((0.5 + 0.5 * p0.x) * w).floor() as i32,
        ((0.5 + 0.5 * p1.x) * w).floor() as i32,
        ((0.5 + 0.5 * p2.x) * w).floor() as i32,
    ];
    let y = [
        ((0.5 + 0.5 * p0.y) * h).floor() as i32,
        ((0.5 + 0.5 * p1.y) * h).floor() as i32,
        ((0.5 + 0.5 * p2.y) * h).floor() as i32,
    ];

    let d01 = [x[1] - x[0], y[0] - y[1]];
    let d12 = [x[2] - x[1], y[1] - y[2]];
    let d20 = [x[0] - x[2], y[2] - y[0]];

    let surface = d01[1] * x[2] + d01[0] * y[2] + x[0] * y[1] - y[0] * x[1];

    ScreenTri {
        x,
        y,
        d01,
        d12,
        d20,
        surface,
    }
}

/// Bounding box of the three vertices, clamped to the viewport. This is
/// where the left/right/top/bottom frustum planes are enforced.
fn bounding_box(tri: &ScreenTri, width: i32, height: i32) -> Bbox {
    let x_min = tri.x[0].min(tri.x[1]).min(tri.x[2]).clamp(0, width - 1);
    let x_max = tri.x[0].max(tri.x[1]).max(tri.x[2]).clamp(0, width - 1);
    let y_min = tri.y[0].min(tri.y[1]).min(tri.y[2]).clamp(0, height - 1);
    let y_max = tri.y[0].max(tri.y[1]).max(tri.y[2]).clamp(0, height - 1);
    Bbox {
        x_min,
        y_min,
        x_max,
        y_max,
    }
}

/// Initial edge weights at `(x0, y0)`, biased by half a pixel in each axis
/// so the triple evaluated at a pixel center equals the doubled signed
/// sub-area opposite each vertex.
fn initial_weights(tri: &ScreenTri, x0: i32, y0: i32) -> [i32; 3] {
    [
        2 * (tri.d12[1] * x0 + tri.d12[0] * y0 + tri.y[2] * tri.x[1] - tri.x[2] * tri.y[1])
            + tri.d12[0]
            + tri.d12[1],
        2 * (tri.d20[1] * x0 + tri.d20[0] * y0 + tri.y[0] * tri.x[2] - tri.x[0] * tri.y[2])
            + tri.d20[0]
            + tri.d20[1],
        2 * (tri.d01[1] * x0 + tri.d01[0] * y0 + tri.y[1] * tri.x[0] - tri.x[1] * tri.y[0])
            + tri.d01[0]
            + tri.d01[1],
    ]
}

/// Rasterizes sub-triangle `tri_idx` of the six-slot clip array into the
/// framebuffer. Degenerate and (under `CULL_FACE`) back-facing triangles
/// are silently skipped, as are fragments that fail the coverage,
/// wireframe, z-range or depth tests, and fragments the shader discards.
pub(crate) fn rasterize_triangle<S: ShaderProgram>(
    fb: &mut Framebuffer,
    state: RenderState,
    clip: &mut [Vec4; 6],
    tri_idx: usize,
    shader: &mut S,
) {
    let base = 3 * tri_idx;
    normalize_coordinates(&mut clip[base]);
    normalize_coordinates(&mut clip[base + 1]);
    normalize_coordinates(&mut clip[base + 2]);
    let p0 = clip[base];
    let p1 = clip[base + 1];
    let p2 = clip[base + 2];

    let tri = screen_setup(&p0, &p1, &p2, fb.width(), fb.height());

    if tri.surface == 0 {
        return; // degenerate
    }
    if state.contains(RenderState::CULL_FACE) && tri.surface < 0 {
        return; // back-facing
    }

    let bbox = bounding_box(&tri, fb.width(), fb.height());

    let mut row_weights = initial_weights(&tri, bbox.x_min, bbox.y_min);
    let step_x = [2 * tri.d12[1], 2 * tri.d20[1], 2 * tri.d01[1]];
    let step_y = [2 * tri.d12[0], 2 * tri.d20[0], 2 * tri.d01[0]];

    let inv_surface = 1.0 / (2 * tri.surface) as f32;
    let inv_w = [p0.w, p1.w, p2.w];

    for y in bbox.y_min..=bbox.y_max {
        let mut weights = row_weights;
        for x in bbox.x_min..=bbox.x_max {
            let bar = Vec3::new(
                weights[0] as f32 * inv_surface,
                weights[1] as f32 * inv_surface,
                weights[2] as f32 * inv_surface,
            );

            // Step before any of the rejects below can leave the iteration.
            weights[0] += step_x[0];
            weights[1] += step_x[1];
            weights[2] += step_x[2];

            // Negative barycentric coordinate <=> pixel outside triangle.
            if bar.x < -RASTER_EPSILON || bar.y < -RASTER_EPSILON || bar.z < -RASTER_EPSILON {
                continue;
            }

            let bar_correct = perspective_correct(bar, inv_w);

            if state.contains(RenderState::WIREFRAME)
                && bar_correct.x > 0.01
                && bar_correct.y > 0.01
                && bar_correct.z > 0.01
            {
                continue;
            }

            // NDC z interpolates linearly in screen space.
            let z = bar.x * p0.z + bar.y * p1.z + bar.z * p2.z;

            // Near was clipped geometrically; this also covers the far
            // plane, which never was.
            if z < -1.0 || z > 1.0 {
                continue;
            }

            if state.contains(RenderState::DEPTH_TEST) && z > fb.depth(x, y) {
                continue;
            }

            if let Some(mut vars) = shader.varyings() {
                vars.interpolate(tri_idx, bar_correct);
            }
            let frag = Fragment {
                bar: bar_correct,
                bar_screen: bar,
            };
            if let Some(color) = shader.fragment(&frag) {
                fb.set_pixel(x, y, color);
                fb.set_depth(x, y, z);
            }
        }
        row_weights[0] += step_y[0];
        row_weights[1] += step_y[1];
        row_weights[2] += step_y[2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pass-through shader painting a fixed color, for geometry-only tests.
    struct SolidShader {
        color: Vec4,
    }

    impl ShaderProgram for SolidShader {
        type Attribute = Vec4;

        fn vertex(&mut self, input: [&Vec4; 3]) -> [Vec4; 3] {
            [*input[0], *input[1], *input[2]]
        }

        fn fragment(&mut self, _frag: &Fragment) -> Option<Vec4> {
            Some(self.color)
        }
    }

    fn draw(fb: &mut Framebuffer, state: RenderState, verts: [Vec4; 3]) {
        let mut shader = SolidShader { color: Vec4::ONE };
        let mut clip = [
            verts[0],
            verts[1],
            verts[2],
            Vec4::ZERO,
            Vec4::ZERO,
            Vec4::ZERO,
        ];
        rasterize_triangle(fb, state, &mut clip, 0, &mut shader);
    }

    fn written_pixels(fb: &Framebuffer) -> Vec<(i32, i32)> {
        let mut out = vec![];
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.color_bytes()[4 * (y * fb.width() + x) as usize] != 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn coverage_matches_pixel_center_half_plane_test() {
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(0.0, 0.0, 0.0, 1.0);

        let verts = [
            Vec4::new(-0.7, -0.6, 0.0, 1.0),
            Vec4::new(0.8, -0.2, 0.0, 1.0),
            Vec4::new(0.0, 0.7, 0.0, 1.0),
        ];
        draw(&mut fb, RenderState::default(), verts);

        // Reference: the mapped integer vertices and a float edge test at
        // every pixel center.
        let map = |v: f32, extent: i32| ((0.5 + 0.5 * v) * (extent as f32 - 0.001)).floor();
        let px: Vec<(f32, f32)> = verts
            .iter()
            .map(|v| (map(v.x, 64), map(v.y, 64)))
            .collect();
        let edge = |a: (f32, f32), b: (f32, f32), p: (f32, f32)| {
            (p.0 - a.0) * (b.1 - a.1) - (p.1 - a.1) * (b.0 - a.0)
        };
        let area = edge(px[0], px[1], px[2]);

        for y in 0..64 {
            for x in 0..64 {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                let bar = [
                    edge(px[1], px[2], center) / area,
                    edge(px[2], px[0], center) / area,
                    edge(px[0], px[1], center) / area,
                ];
                let written = fb.color_bytes()[4 * (y * 64 + x) as usize] != 0;
                let inside = bar.iter().all(|&b| b >= 0.0);
                // Pixels exactly on an edge may fall either way within the
                // rasterizer's tolerance; everything else must agree.
                if bar.iter().all(|&b| b.abs() > 1e-3) {
                    assert_eq!(
                        written,
                        inside,
                        "coverage mismatch at ({x}, {y}), bar {bar:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn no_pixel_outside_bounding_box_is_written() {
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(0.0, 0.0, 0.0, 1.0);
        draw(
            &mut fb,
            RenderState::default(),
            [
                Vec4::new(-0.5, -0.5, 0.0, 1.0),
                Vec4::new(0.0, -0.5, 0.0, 1.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
            ],
        );

        // NDC [-0.5, 0] spans pixels [15, 31] on both axes.
        for (x, y) in written_pixels(&fb) {
            assert!((15..=31).contains(&x), "x {x} outside bounding box");
            assert!((15..=31).contains(&y), "y {y} outside bounding box");
        }
        assert!(!written_pixels(&fb).is_empty());
    }

    #[test]
    fn degenerate_triangle_is_skipped() {
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(0.0, 0.0, 0.0, 1.0);
        let v = Vec4::new(0.1, 0.1, 0.0, 1.0);
        draw(&mut fb, RenderState::default(), [v, v, v]);
        assert!(written_pixels(&fb).is_empty());
    }

    #[test]
    fn winding_flips_the_surface_sign_under_culling() {
        let ccw = [
            Vec4::new(-0.5, -0.5, 0.0, 1.0),
            Vec4::new(0.5, -0.5, 0.0, 1.0),
            Vec4::new(0.0, 0.5, 0.0, 1.0),
        ];
        let cw = [ccw[2], ccw[1], ccw[0]];

        let mut front = Framebuffer::new(32, 32);
        front.clear(0.0, 0.0, 0.0, 1.0);
        draw(&mut front, RenderState::CULL_FACE, ccw);

        let mut back = Framebuffer::new(32, 32);
        back.clear(0.0, 0.0, 0.0, 1.0);
        draw(&mut back, RenderState::CULL_FACE, cw);

        let drew_front = !written_pixels(&front).is_empty();
        let drew_back = !written_pixels(&back).is_empty();
        assert!(drew_front != drew_back, "exactly one winding must survive");
    }

    #[test]
    fn ndc_z_outside_range_is_dropped_per_pixel() {
        // w = 1 everywhere so the clipper would pass this through; the
        // far-side rejection has to happen pixel by pixel.
        let mut fb = Framebuffer::new(32, 32);
        fb.clear(0.0, 0.0, 0.0, 1.0);
        draw(
            &mut fb,
            RenderState::default(),
            [
                Vec4::new(-0.5, -0.5, 1.5, 1.0),
                Vec4::new(0.5, -0.5, 1.5, 1.0),
                Vec4::new(0.0, 0.5, 1.5, 1.0),
            ],
        );
        assert!(written_pixels(&fb).is_empty());
    }
}
