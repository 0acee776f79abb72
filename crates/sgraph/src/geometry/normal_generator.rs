//! Per-corner normal generation with a crease angle

use std::collections::HashMap;

use crate::foundation::math::{Vector3, Vector3f};
use crate::scene::{SgMesh, SgNormalArray, SgObject};

const COPLANAR_EPSILON: f64 = 1.0e-9;

/// Computes smooth or faceted normals for triangle meshes
///
/// For each triangle corner, the normals of all triangles sharing that
/// vertex are averaged if the angle between them and the corner's own
/// triangle is below the crease angle. Coplanar triangles always merge.
/// Identical results are stored once and referenced through the mesh's
/// normal indices.
#[derive(Debug, Default, Clone)]
pub struct NormalGenerator {
    face_normals: Vec<Vector3>,
    vertex_faces: Vec<Vec<usize>>,
}

impl NormalGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the normals of `mesh`
    ///
    /// Returns false and leaves the mesh untouched if it has no vertices or a
    /// triangle refers to a missing vertex.
    pub fn generate_normals(&mut self, mesh: &SgMesh, crease_angle: f64) -> bool {
        let Some(vertices) = mesh.vertices() else {
            return false;
        };
        let triangles = mesh.triangles();
        let num_vertices = vertices.len();
        if triangles.iter().flatten().any(|&i| i as usize >= num_vertices) {
            log::warn!("Mesh {} has triangle indices out of range", mesh.id());
            return false;
        }

        vertices.with_data(|points| self.compute_face_normals(points, &triangles));

        let cos_crease = crease_angle.cos();
        let mut normals: Vec<Vector3f> = Vec::new();
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();
        let mut indices = Vec::with_capacity(triangles.len() * 3);

        for (face, triangle) in triangles.iter().enumerate() {
            let own = self.face_normals[face];
            for &vertex in triangle {
                let mut sum = Vector3::zeros();
                for &other in &self.vertex_faces[vertex as usize] {
                    let normal = self.face_normals[other];
                    let cos = own.dot(&normal);
                    if other == face || cos >= 1.0 - COPLANAR_EPSILON || cos > cos_crease + COPLANAR_EPSILON {
                        sum += normal;
                    }
                }
                let normal: Vector3f = sum.try_normalize(f64::EPSILON).unwrap_or(own).cast::<f32>();
                let key = normal_key(&normal);
                let index = *lookup.entry(key).or_insert_with(|| {
                    normals.push(normal);
                    (normals.len() - 1) as u32
                });
                indices.push(index);
            }
        }

        log::debug!(
            "Generated {} normals for {} triangles of mesh {}",
            normals.len(),
            triangles.len(),
            mesh.id()
        );
        mesh.set_normals(Some(SgNormalArray::from_vec(normals)));
        mesh.set_normal_indices(indices);
        true
    }

    fn compute_face_normals(&mut self, points: &[Vector3f], triangles: &[[u32; 3]]) {
        self.face_normals.clear();
        self.vertex_faces.clear();
        self.vertex_faces.resize(points.len(), Vec::new());

        for (face, triangle) in triangles.iter().enumerate() {
            let [a, b, c] = triangle.map(|i| points[i as usize].cast::<f64>());
            let normal = (b - a).cross(&(c - a)).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
            self.face_normals.push(normal);
            for &vertex in triangle {
                let faces = &mut self.vertex_faces[vertex as usize];
                if !faces.contains(&face) {
                    faces.push(face);
                }
            }
        }
    }
}

fn normal_key(normal: &Vector3f) -> [u32; 3] {
    // +0.0 and -0.0 must share a key
    normal.map(|v| if v == 0.0 { 0.0_f32.to_bits() } else { v.to_bits() }).into()
}
