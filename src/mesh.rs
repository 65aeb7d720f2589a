//! Indexed triangle meshes and the OBJ text loader.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::math::{Vec2, Vec3};

/// Per-vertex attributes shared by the bundled mesh shaders.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

/// An indexed triangle mesh.
#[derive(Debug)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<[usize; 3]>,
}

/// Errors from [`Mesh::from_obj`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Mesh {
    /// Load a mesh from a Wavefront OBJ text file.
    ///
    /// Supports `v`, `vt`, `vn` and `f` records; faces with more than three
    /// corners are fan-triangulated. All objects and groups in the file are
    /// merged into a single mesh.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_obj(&text)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over the mesh as vertex triples ready for
    /// [`Renderer::process_triangle`].
    ///
    /// [`Renderer::process_triangle`]: crate::render::renderer::Renderer::process_triangle
    pub fn triangles(&self) -> impl Iterator<Item = [&MeshVertex; 3]> + '_ {
        self.indices
            .iter()
            .map(|&[a, b, c]| [&self.vertices[a], &self.vertices[b], &self.vertices[c]])
    }

    /// An axis-aligned cube spanning [-1, 1] on every axis, with per-face
    /// normals and texture coordinates. Faces wind counter-clockwise seen
    /// from outside.
    pub fn unit_cube() -> Self {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            // (normal, right, up) per face
            (Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 0.0, 1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
            (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(12);
        for (normal, right, up) in faces {
            let base = vertices.len();
            for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(MeshVertex {
                    position: normal + right * sx + up * sy,
                    normal,
                    texcoord: Vec2::new(0.5 * (sx + 1.0), 0.5 * (sy + 1.0)),
                });
            }
            indices.push([base, base + 1, base + 2]);
            indices.push([base, base + 2, base + 3]);
        }
        Self { vertices, indices }
    }

    /// A ground plane spanning [-1, 1] in x and z at y = 0, facing +Y.
    pub fn ground_plane() -> Self {
        let normal = Vec3::new(0.0, 1.0, 0.0);
        let corners = [
            (Vec3::new(-1.0, 0.0, -1.0), Vec2::new(0.0, 0.0)),
            (Vec3::new(1.0, 0.0, -1.0), Vec2::new(1.0, 0.0)),
            (Vec3::new(1.0, 0.0, 1.0), Vec2::new(1.0, 1.0)),
            (Vec3::new(-1.0, 0.0, 1.0), Vec2::new(0.0, 1.0)),
        ];
        let vertices = corners
            .iter()
            .map(|&(position, texcoord)| MeshVertex {
                position,
                normal,
                texcoord,
            })
            .collect();
        Self {
            vertices,
            indices: vec![[0, 2, 1], [0, 3, 2]],
        }
    }
}

fn parse_obj(text: &str) -> Result<Mesh, LoadError> {
    let mut positions: Vec<Vec3> = vec![];
    let mut texcoords: Vec<Vec2> = vec![];
    let mut normals: Vec<Vec3> = vec![];

    let mut vertices: Vec<MeshVertex> = vec![];
    let mut indices: Vec<[usize; 3]> = vec![];
    // Deduplicate corners by their (position, texcoord, normal) reference.
    let mut corner_cache: HashMap<(usize, usize, usize), usize> = HashMap::new();

    for (number, line) in text.lines().enumerate() {
        let line_no = number + 1;
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => positions.push(parse_vec3(&mut fields, line_no)?),
            Some("vt") => {
                let u = parse_float(fields.next(), line_no)?;
                let v = parse_float(fields.next(), line_no)?;
                texcoords.push(Vec2::new(u, v));
            }
            Some("vn") => normals.push(parse_vec3(&mut fields, line_no)?),
            Some("f") => {
                let mut corners = vec![];
                for field in fields {
                    let key = parse_corner(field, line_no, positions.len())?;
                    let index = *corner_cache.entry(key).or_insert_with(|| {
                        vertices.push(MeshVertex {
                            position: positions[key.0],
                            texcoord: texcoords.get(key.1).copied().unwrap_or(Vec2::ZERO),
                            normal: normals.get(key.2).copied().unwrap_or(Vec3::ZERO),
                        });
                        vertices.len() - 1
                    });
                    corners.push(index);
                }
                if corners.len() < 3 {
                    return Err(LoadError::Parse {
                        line: line_no,
                        message: format!("face with {} corners", corners.len()),
                    });
                }
                for i in 1..corners.len() - 1 {
                    indices.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            // Comments, object/group/material records and empty lines are
            // ignored.
            _ => {}
        }
    }

    Ok(Mesh { vertices, indices })
}

fn parse_float(field: Option<&str>, line: usize) -> Result<f32, LoadError> {
    field
        .ok_or_else(|| LoadError::Parse {
            line,
            message: "missing coordinate".into(),
        })?
        .parse()
        .map_err(|_| LoadError::Parse {
            line,
            message: "malformed number".into(),
        })
}

fn parse_vec3<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
    line: usize,
) -> Result<Vec3, LoadError> {
    let x = parse_float(fields.next(), line)?;
    let y = parse_float(fields.next(), line)?;
    let z = parse_float(fields.next(), line)?;
    Ok(Vec3::new(x, y, z))
}

/// Parse one `f` corner of the form `v`, `v/vt`, `v//vn` or `v/vt/vn`,
/// returning zero-based (position, texcoord, normal) indices. Missing
/// references map to `usize::MAX`, which no attribute list can reach.
fn parse_corner(
    field: &str,
    line: usize,
    position_count: usize,
) -> Result<(usize, usize, usize), LoadError> {
    let mut parts = field.split('/');
    let index = |part: Option<&str>| -> Result<usize, LoadError> {
        match part {
            None | Some("") => Ok(usize::MAX),
            Some(s) => {
                let one_based: usize = s.parse().map_err(|_| LoadError::Parse {
                    line,
                    message: format!("malformed face corner '{field}'"),
                })?;
                if one_based == 0 {
                    return Err(LoadError::Parse {
                        line,
                        message: "face index 0 (OBJ indices are one-based)".into(),
                    });
                }
                Ok(one_based - 1)
            }
        }
    };

    let v = index(parts.next())?;
    let vt = index(parts.next())?;
    let vn = index(parts.next())?;
    if v >= position_count {
        return Err(LoadError::Parse {
            line,
            message: format!("face corner '{field}' references a missing vertex"),
        });
    }
    Ok((v, vt, vn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_triangles_with_full_corner_references() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 0 1\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 3/3/1\n",
        )
        .unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[1].position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.vertices[2].texcoord, Vec2::new(0.0, 1.0));
        assert_eq!(mesh.vertices[0].normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn fan_triangulates_quads() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             f 1 2 3 4\n",
        )
        .unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices[0], [0, 1, 2]);
        assert_eq!(mesh.indices[1], [0, 2, 3]);
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             f 1 2 3\nf 1 3 4\n",
        )
        .unwrap();
        assert_eq!(mesh.vertices.len(), 4);
    }

    #[test]
    fn missing_vertex_reference_is_an_error() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn unit_cube_has_outward_unit_normals() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertices.len(), 24);
        for vert in &cube.vertices {
            assert_relative_eq!(vert.normal.magnitude(), 1.0);
            // Outward: the normal points away from the cube center.
            assert!(vert.position.dot(vert.normal) > 0.0);
        }
    }
}
