//! Near-plane clipping in homogeneous clip space.
//!
//! Only the near plane is clipped geometrically: it is the one plane across
//! which the homogeneous divide changes sign, so geometry straddling it
//! cannot survive to the rasterizer. The other five frustum planes get a
//! cheap whole-triangle reject here and per-pixel rejection during
//! rasterization (the bounding box is clamped to the viewport and NDC z is
//! range-checked per fragment).
//!
//! Clipping operates on the renderer's six-slot clip-position array. Slots
//! 0..3 hold the vertex-stage outputs; when a split produces a second
//! sub-triangle its vertices are copied into slots 3..6 so each slot is
//! normalized exactly once downstream. Varying records are interpolated with
//! the same parameters through the untyped [`Varyings`] view, and the
//! second sub-triangle is expressed by rewriting the view's index table.

use crate::math::Vec4;
use crate::render::shader::Varyings;

/// A vertex is behind the near plane when z < -w.
#[inline]
fn behind_near(p: &Vec4) -> bool {
    p.z < -p.w
}

/// True when all three vertices violate the same frustum half-space, which
/// means the whole triangle is invisible and can be dropped before any
/// geometric work.
fn outside_same_halfspace(p0: &Vec4, p1: &Vec4, p2: &Vec4) -> bool {
    (p0.x < -p0.w && p1.x < -p1.w && p2.x < -p2.w)
        || (p0.x > p0.w && p1.x > p1.w && p2.x > p2.w)
        || (p0.y < -p0.w && p1.y < -p1.w && p2.y < -p2.w)
        || (p0.y > p0.w && p1.y > p1.w && p2.y > p2.w)
        || (p0.z < -p0.w && p1.z < -p1.w && p2.z < -p2.w)
        || (p0.z > p0.w && p1.z > p1.w && p2.z > p2.w)
}

/// Clips the triangle in `clip[0..3]` against the near plane, returning the
/// number of sub-triangles to rasterize (0, 1 or 2).
///
/// A vertex exactly on the plane (z == -w) counts as in front, so a
/// triangle touching the plane passes through unchanged.
pub(crate) fn clip_triangle(clip: &mut [Vec4; 6], varyings: Option<Varyings<'_>>) -> usize {
    if outside_same_halfspace(&clip[0], &clip[1], &clip[2]) {
        return 0;
    }

    let behind = [
        behind_near(&clip[0]),
        behind_near(&clip[1]),
        behind_near(&clip[2]),
    ];
    match behind.iter().filter(|b| **b).count() {
        0 => 1,
        1 => {
            let k = behind.iter().position(|b| *b).unwrap_or(0);
            clip_one_behind(clip, k, varyings);
            2
        }
        2 => {
            let front = behind.iter().position(|b| !*b).unwrap_or(0);
            clip_two_behind(clip, front, varyings);
            1
        }
        // All three behind; the half-space reject above already caught this.
        _ => 0,
    }
}

/// Interpolation parameter of the near-plane crossing on the edge from `a`
/// to `c`, solving `lerp(a, c, t).z == -lerp(a, c, t).w`.
#[inline]
fn crossing(a: &Vec4, c: &Vec4) -> f32 {
    (-a.w - a.z) / ((c.w + c.z) - (a.w + a.z))
}

/// One vertex behind: the surviving region is a quad, split into two
/// sub-triangles.
///
/// With `a` behind and `b`, `c` in front (in winding order), the quad is
/// `(a->b crossing, b, c, a->c crossing)`:
///
/// ```text
///             b
///            /|
///   --------x-+------- z = -w
///          /  |
///         a---c        (a behind)
/// ```
///
/// Sub-triangle 0 overwrites the original slots; sub-triangle 1 lives in
/// slots 3..6 and reuses records through the index table.
fn clip_one_behind(clip: &mut [Vec4; 6], k: usize, varyings: Option<Varyings<'_>>) {
    let (i0, i1, i2) = (k, (k + 1) % 3, (k + 2) % 3);
    let a = clip[i0];
    let b = clip[i1];
    let c = clip[i2];

    let t0 = crossing(&a, &c);
    let t1 = crossing(&a, &b);

    clip[3] = a.lerp(b, t1);
    clip[i0] = a.lerp(c, t0);
    clip[4] = b;
    clip[5] = clip[i0];

    if let Some(mut vars) = varyings {
        // Record 3 must blend from the unclipped record i0, so it is
        // written before i0 is overwritten.
        vars.lerp_records(3, i0, i1, t1);
        vars.lerp_records(i0, i0, i2, t0);
        vars.set_second_triangle(3, i1, i0);
    }
}

/// Two vertices behind: the two behind vertices slide up to the plane and
/// one sub-triangle remains.
fn clip_two_behind(clip: &mut [Vec4; 6], front: usize, varyings: Option<Varyings<'_>>) {
    let (i0, i1, i2) = ((front + 1) % 3, (front + 2) % 3, front);
    let a = clip[i0];
    let b = clip[i1];
    let c = clip[i2];

    let t0 = crossing(&a, &c);
    let t1 = crossing(&b, &c);

    clip[i0] = a.lerp(c, t0);
    clip[i1] = b.lerp(c, t1);

    if let Some(mut vars) = varyings {
        vars.lerp_records(i0, i0, i2, t0);
        vars.lerp_records(i1, i1, i2, t1);
    }
}
