//! Tessellation of primitive shapes into triangle meshes
//!
//! All primitives are centered at the origin. Curved primitives have their
//! axis along Y and are divided into `division_number` segments around it.

use std::rc::Rc;

use crate::config::MeshGeneratorConfig;
use crate::foundation::math::{constants, Vector3, Vector3f};
use crate::scene::{MeshPrimitive, SgMesh, SgVertexArray};

use super::normal_generator::NormalGenerator;

/// Builds primitive meshes
#[derive(Debug, Clone)]
pub struct MeshGenerator {
    division_number: u32,
    normal_generation: bool,
    normal_generator: NormalGenerator,
}

impl Default for MeshGenerator {
    fn default() -> Self {
        Self::from_config(&MeshGeneratorConfig::default())
    }
}

impl MeshGenerator {
    /// Create a generator with 20 divisions and normal generation on
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from configuration
    pub fn from_config(config: &MeshGeneratorConfig) -> Self {
        Self {
            division_number: config.division_number,
            normal_generation: config.normal_generation,
            normal_generator: NormalGenerator::new(),
        }
    }

    /// Segments around curved primitives
    pub fn division_number(&self) -> u32 {
        self.division_number
    }

    /// Set the segments around curved primitives
    pub fn set_division_number(&mut self, n: u32) {
        self.division_number = n;
    }

    /// Whether generated meshes get normals
    pub fn is_normal_generation_enabled(&self) -> bool {
        self.normal_generation
    }

    /// Enable or disable normal generation
    pub fn enable_normal_generation(&mut self, on: bool) {
        self.normal_generation = on;
    }

    /// Axis-aligned box with edge lengths `size`
    ///
    /// Returns `None` if any edge length is negative.
    pub fn generate_box(&mut self, size: Vector3) -> Option<Rc<SgMesh>> {
        if size.x < 0.0 || size.y < 0.0 || size.z < 0.0 {
            return None;
        }
        let h = (size * 0.5).cast::<f32>();
        let (x, y, z) = (h.x, h.y, h.z);

        let vertices = vec![
            Vector3f::new(x, y, z),
            Vector3f::new(-x, y, z),
            Vector3f::new(-x, -y, z),
            Vector3f::new(x, -y, z),
            Vector3f::new(x, y, -z),
            Vector3f::new(-x, y, -z),
            Vector3f::new(-x, -y, -z),
            Vector3f::new(x, -y, -z),
        ];
        let triangles = vec![
            [0, 1, 2],
            [2, 3, 0],
            [0, 5, 1],
            [0, 4, 5],
            [1, 5, 6],
            [1, 6, 2],
            [2, 6, 7],
            [2, 7, 3],
            [3, 7, 4],
            [3, 4, 0],
            [4, 6, 5],
            [4, 7, 6],
        ];

        Some(self.finish(vertices, triangles, MeshPrimitive::Box { size }, 0.0))
    }

    /// Sphere of `radius`
    ///
    /// Uses `division_number / 2` latitude bands. Returns `None` for a
    /// negative radius or fewer than 4 divisions.
    pub fn generate_sphere(&mut self, radius: f64) -> Option<Rc<SgMesh>> {
        if radius < 0.0 || self.division_number < 4 {
            return None;
        }
        let vdn = self.division_number / 2;
        let hdn = self.division_number;

        let mut vertices = Vec::with_capacity(((vdn - 1) * hdn + 2) as usize);
        for i in 1..vdn {
            let tv = f64::from(i) * constants::PI / f64::from(vdn);
            for j in 0..hdn {
                let th = f64::from(j) * 2.0 * constants::PI / f64::from(hdn);
                vertices.push(vertex(radius * tv.sin() * th.cos(), radius * tv.cos(), radius * tv.sin() * th.sin()));
            }
        }
        let top = vertices.len() as u32;
        vertices.push(vertex(0.0, radius, 0.0));
        let bottom = vertices.len() as u32;
        vertices.push(vertex(0.0, -radius, 0.0));

        let mut triangles = Vec::with_capacity((vdn * hdn * 2) as usize);
        for i in 0..hdn {
            triangles.push([top, (i + 1) % hdn, i]);
        }
        for i in 0..vdn - 2 {
            let upper = i * hdn;
            let lower = (i + 1) * hdn;
            for j in 0..hdn {
                let next = (j + 1) % hdn;
                triangles.push([j + upper, next + lower, j + lower]);
                triangles.push([j + upper, next + upper, next + lower]);
            }
        }
        let offset = (vdn - 2) * hdn;
        for i in 0..hdn {
            triangles.push([bottom, i + offset, (i + 1) % hdn + offset]);
        }

        Some(self.finish(vertices, triangles, MeshPrimitive::Sphere { radius }, constants::PI))
    }

    /// Cylinder of `radius` and `height` with optional caps and side
    ///
    /// Returns `None` for a negative radius or height, or fewer than 3
    /// divisions.
    pub fn generate_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        bottom: bool,
        side: bool,
        top: bool,
    ) -> Option<Rc<SgMesh>> {
        if radius < 0.0 || height < 0.0 || self.division_number < 3 {
            return None;
        }
        let n = self.division_number;
        let y = height / 2.0;

        let ring = |sign: f64| {
            (0..n).map(move |i| {
                let angle = f64::from(i) * 2.0 * constants::PI / f64::from(n);
                vertex(radius * angle.cos(), sign * y, radius * angle.sin())
            })
        };
        let mut vertices: Vec<Vector3f> = ring(1.0).chain(ring(-1.0)).collect();
        let top_center = vertices.len() as u32;
        vertices.push(vertex(0.0, y, 0.0));
        let bottom_center = vertices.len() as u32;
        vertices.push(vertex(0.0, -y, 0.0));

        let mut triangles = Vec::with_capacity((n * 4) as usize);
        for i in 0..n {
            let next = (i + 1) % n;
            if top {
                triangles.push([top_center, next, i]);
            }
            if side {
                triangles.push([i, next + n, i + n]);
                triangles.push([i, next, next + n]);
            }
            if bottom {
                triangles.push([bottom_center, i + n, next + n]);
            }
        }

        Some(self.finish(
            vertices,
            triangles,
            MeshPrimitive::Cylinder { radius, height },
            constants::HALF_PI,
        ))
    }

    /// Cone of base `radius` and `height`, apex up, with optional base and side
    ///
    /// Returns `None` for a negative radius or height, or fewer than 3
    /// divisions.
    pub fn generate_cone(&mut self, radius: f64, height: f64, bottom: bool, side: bool) -> Option<Rc<SgMesh>> {
        if radius < 0.0 || height < 0.0 || self.division_number < 3 {
            return None;
        }
        let n = self.division_number;
        let y = height / 2.0;

        let mut vertices: Vec<Vector3f> = (0..n)
            .map(|i| {
                let angle = f64::from(i) * 2.0 * constants::PI / f64::from(n);
                vertex(radius * angle.cos(), -y, radius * angle.sin())
            })
            .collect();
        let apex = vertices.len() as u32;
        vertices.push(vertex(0.0, y, 0.0));
        let bottom_center = vertices.len() as u32;
        vertices.push(vertex(0.0, -y, 0.0));

        let mut triangles = Vec::with_capacity((n * 2) as usize);
        for i in 0..n {
            let next = (i + 1) % n;
            if side {
                triangles.push([apex, next, i]);
            }
            if bottom {
                triangles.push([bottom_center, i, next]);
            }
        }

        Some(self.finish(
            vertices,
            triangles,
            MeshPrimitive::Cone { radius, height },
            constants::HALF_PI,
        ))
    }

    fn finish(
        &mut self,
        vertices: Vec<Vector3f>,
        triangles: Vec<[u32; 3]>,
        primitive: MeshPrimitive,
        crease_angle: f64,
    ) -> Rc<SgMesh> {
        let mesh = SgMesh::new();
        mesh.set_vertices(Some(SgVertexArray::from_vec(vertices)));
        mesh.set_triangles(triangles);
        mesh.set_primitive(primitive);
        if self.normal_generation {
            self.normal_generator.generate_normals(&mesh, crease_angle);
        }
        log::debug!("Generated {:?} with {} triangles", primitive, mesh.num_triangles());
        mesh
    }
}

#[allow(clippy::cast_possible_truncation)]
fn vertex(x: f64, y: f64, z: f64) -> Vector3f {
    Vector3f::new(x as f32, y as f32, z as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SgObject;
    use approx::assert_relative_eq;

    #[test]
    fn test_box() {
        let mesh = MeshGenerator::new().generate_box(Vector3::new(2.0, 4.0, 6.0)).unwrap();
        assert_eq!(mesh.vertices().unwrap().len(), 8);
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.primitive(), MeshPrimitive::Box { size: Vector3::new(2.0, 4.0, 6.0) });

        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Vector3::new(1.0, 2.0, 3.0));

        // One normal per face side
        assert_eq!(mesh.normals().unwrap().len(), 6);
        assert_eq!(mesh.normal_indices().len(), 36);
    }

    #[test]
    fn test_box_faces_point_outwards() {
        let mesh = MeshGenerator::new().generate_box(Vector3::new(1.0, 1.0, 1.0)).unwrap();
        let vertices = mesh.vertices().unwrap().to_vec();
        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (vertices[a as usize], vertices[b as usize], vertices[c as usize]);
            let normal = (b - a).cross(&(c - a));
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let mut generator = MeshGenerator::new();
        assert!(generator.generate_box(Vector3::new(1.0, -1.0, 1.0)).is_none());
        assert!(generator.generate_sphere(-1.0).is_none());
        assert!(generator.generate_cylinder(1.0, -1.0, true, true, true).is_none());
        assert!(generator.generate_cone(-1.0, 1.0, true, true).is_none());

        generator.set_division_number(3);
        assert!(generator.generate_sphere(1.0).is_none());
        assert!(generator.generate_cone(1.0, 1.0, true, true).is_some());
        generator.set_division_number(2);
        assert!(generator.generate_cylinder(1.0, 1.0, true, true, true).is_none());
    }

    #[test]
    fn test_sphere() {
        let mesh = MeshGenerator::new().generate_sphere(2.0).unwrap();
        // 9 latitude rings of 20 plus both poles
        assert_eq!(mesh.vertices().unwrap().len(), 182);
        assert_eq!(mesh.num_triangles(), 20 + 8 * 40 + 20);
        // Smooth shading gives one normal per vertex
        assert_eq!(mesh.normals().unwrap().len(), 182);

        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.max.y, 2.0);
        assert_relative_eq!(bbox.min.y, -2.0);
        assert_relative_eq!(bbox.max.x, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cylinder_parts() {
        let mut generator = MeshGenerator::new();
        generator.set_division_number(8);
        let full = generator.generate_cylinder(1.0, 2.0, true, true, true).unwrap();
        assert_eq!(full.vertices().unwrap().len(), 18);
        assert_eq!(full.num_triangles(), 32);
        assert_eq!(full.primitive(), MeshPrimitive::Cylinder { radius: 1.0, height: 2.0 });

        let side_only = generator.generate_cylinder(1.0, 2.0, false, true, false).unwrap();
        assert_eq!(side_only.num_triangles(), 16);

        let bbox = full.bounding_box();
        assert_relative_eq!(bbox.min.y, -1.0);
        assert_relative_eq!(bbox.max.y, 1.0);
    }

    #[test]
    fn test_cone() {
        let mut generator = MeshGenerator::new();
        generator.set_division_number(6);
        let cone = generator.generate_cone(1.0, 3.0, true, true).unwrap();
        assert_eq!(cone.vertices().unwrap().len(), 8);
        assert_eq!(cone.num_triangles(), 12);
        assert_eq!(cone.bounding_box().max.y, 1.5);
    }

    #[test]
    fn test_normal_generation_can_be_disabled() {
        let config = MeshGeneratorConfig { division_number: 8, normal_generation: false };
        let mut generator = MeshGenerator::from_config(&config);
        let mesh = generator.generate_sphere(1.0).unwrap();
        assert!(mesh.normals().is_none());
        assert!(mesh.normal_indices().is_empty());
        assert_eq!(mesh.owner_count(), 0);
    }
}
