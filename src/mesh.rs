use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra as na;
use na::{vector, Vector2, Vector3};
use obj::raw::object::Polygon;
use obj::raw::parse_obj;

use crate::error::Result;
use crate::texture::MaterialMaps;

/// Read-only triangle queries the pipeline consumes. Faces are always
/// triangles with corners indexed 0..2; the pipeline never mutates a mesh.
pub trait Mesh {
    fn vertex_count(&self) -> usize;
    fn face_count(&self) -> usize;
    /// Object-space position of a face corner.
    fn vertex_at(&self, face: usize, corner: usize) -> Vector3<f32>;
    /// Normal at a face corner. Not required to be unit length.
    fn normal_at(&self, face: usize, corner: usize) -> Vector3<f32>;
    /// Texture coordinate at a face corner.
    fn uv_at(&self, face: usize, corner: usize) -> Vector2<f32>;
}

/// Per-corner indices into the position, uv and normal arrays. Uv and normal
/// are optional in the obj format.
#[derive(Clone, Copy)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

/// Triangle mesh loaded from a wavefront obj file, together with the
/// material maps discovered next to it. Faces with more than 3 corners are
/// fan-triangulated at load.
pub struct ObjMesh {
    positions: Vec<Vector3<f32>>,
    uvs: Vec<Vector2<f32>>,
    normals: Vec<Vector3<f32>>,
    faces: Vec<[Corner; 3]>,
    pub maps: MaterialMaps,
}

impl ObjMesh {
    pub fn load(path: &Path) -> Result<ObjMesh> {
        let file = File::open(path)?;
        let mut mesh = ObjMesh::from_reader(BufReader::new(file))?;
        mesh.maps = MaterialMaps::discover(path);
        return Ok(mesh);
    }

    /// Parses obj data from any buffered reader. No material maps are
    /// attached, since there is no path to look next to.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<ObjMesh> {
        let raw = parse_obj(reader)?;

        let positions = raw
            .positions
            .iter()
            .map(|&(x, y, z, _w)| vector![x, y, z])
            .collect();
        let uvs = raw
            .tex_coords
            .iter()
            .map(|&(u, v, _w)| vector![u, v])
            .collect();
        let normals = raw
            .normals
            .iter()
            .map(|&(x, y, z)| vector![x, y, z])
            .collect();

        let mut faces = Vec::new();
        for polygon in &raw.polygons {
            let corners: Vec<Corner> = match polygon {
                Polygon::P(indices) => indices
                    .iter()
                    .map(|&position| Corner {
                        position,
                        uv: None,
                        normal: None,
                    })
                    .collect(),
                Polygon::PT(indices) => indices
                    .iter()
                    .map(|&(position, uv)| Corner {
                        position,
                        uv: Some(uv),
                        normal: None,
                    })
                    .collect(),
                Polygon::PN(indices) => indices
                    .iter()
                    .map(|&(position, normal)| Corner {
                        position,
                        uv: None,
                        normal: Some(normal),
                    })
                    .collect(),
                Polygon::PTN(indices) => indices
                    .iter()
                    .map(|&(position, uv, normal)| Corner {
                        position,
                        uv: Some(uv),
                        normal: Some(normal),
                    })
                    .collect(),
            };
            // Fan triangulation. Already-triangulated meshes pass through
            // unchanged, n-gons become n - 2 triangles.
            for i in 1..corners.len().saturating_sub(1) {
                faces.push([corners[0], corners[i], corners[i + 1]]);
            }
        }

        return Ok(ObjMesh {
            positions,
            uvs,
            normals,
            faces,
            maps: MaterialMaps::none(),
        });
    }

    /// Axis-aligned bounding box over all vertex positions. None for a mesh
    /// without vertices.
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for position in &self.positions[1..] {
            min = min.inf(position);
            max = max.sup(position);
        }
        return Some((min, max));
    }
}

impl Mesh for ObjMesh {
    fn vertex_count(&self) -> usize {
        return self.positions.len();
    }

    fn face_count(&self) -> usize {
        return self.faces.len();
    }

    fn vertex_at(&self, face: usize, corner: usize) -> Vector3<f32> {
        return self.positions[self.faces[face][corner].position];
    }

    fn normal_at(&self, face: usize, corner: usize) -> Vector3<f32> {
        match self.faces[face][corner].normal {
            Some(index) => return self.normals[index],
            None => {
                // Files without vertex normals get the face geometric normal.
                let a = self.vertex_at(face, 0);
                let b = self.vertex_at(face, 1);
                let c = self.vertex_at(face, 2);
                return (b - a).cross(&(c - a));
            }
        }
    }

    fn uv_at(&self, face: usize, corner: usize) -> Vector2<f32> {
        match self.faces[face][corner].uv {
            Some(index) => return self.uvs[index],
            None => return Vector2::zeros(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = ObjMesh::from_reader(QUAD_OBJ.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        // Second fan triangle reuses the first corner.
        assert_relative_eq!(mesh.vertex_at(1, 0), vector![0.0, 0.0, 0.0]);
        assert_relative_eq!(mesh.vertex_at(1, 1), vector![1.0, 1.0, 0.0]);
        assert_relative_eq!(mesh.vertex_at(1, 2), vector![0.0, 1.0, 0.0]);
    }

    #[test]
    fn corner_attributes_resolve_through_indices() {
        let mesh = ObjMesh::from_reader(QUAD_OBJ.as_bytes()).unwrap();
        assert_relative_eq!(mesh.uv_at(0, 1), vector![1.0, 0.0]);
        assert_relative_eq!(mesh.normal_at(0, 2), vector![0.0, 0.0, 1.0]);
    }

    #[test]
    fn position_only_faces_fall_back_to_face_normal() {
        let source = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let mesh = ObjMesh::from_reader(source.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_relative_eq!(mesh.normal_at(0, 0), vector![0.0, 0.0, 1.0]);
        assert_relative_eq!(mesh.uv_at(0, 0), Vector2::zeros());
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = ObjMesh::from_reader(QUAD_OBJ.as_bytes()).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min, vector![0.0, 0.0, 0.0]);
        assert_relative_eq!(max, vector![1.0, 1.0, 0.0]);
    }

    #[test]
    fn empty_source_has_no_bounds() {
        let mesh = ObjMesh::from_reader("".as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.bounds().is_none());
    }
}
