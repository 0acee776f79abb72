//! Triangle meshes referenced by shapes

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::SceneResult;
use crate::foundation::math::Vector3;

use super::array::{SgColorArray, SgNormalArray, SgTexCoordArray, SgVertexArray};
use super::bounding_box::BoundingBox;
use super::clone_map::{CloneObject, SgCloneMap};
use super::object::{propagate_update, ObjectCore, OwnedSlot, SgObject, SgObjectPtr};
use super::update::SgUpdate;

/// Shape a mesh was generated from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MeshPrimitive {
    /// Arbitrary triangles
    #[default]
    Mesh,
    /// Axis-aligned box centered at the origin
    Box {
        /// Edge lengths
        size: Vector3,
    },
    /// Sphere centered at the origin
    Sphere {
        /// Radius
        radius: f64,
    },
    /// Cylinder along the Y axis
    Cylinder {
        /// Radius
        radius: f64,
        /// Height
        height: f64,
    },
    /// Cone along the Y axis, apex up
    Cone {
        /// Base radius
        radius: f64,
        /// Height
        height: f64,
    },
}

/// Indexed triangle mesh
///
/// Vertex attributes live in shared arrays. Normal, color and texture
/// coordinate indices are per triangle corner when present.
pub struct SgMesh {
    core: ObjectCore,
    vertices: OwnedSlot<SgVertexArray>,
    normals: OwnedSlot<SgNormalArray>,
    colors: OwnedSlot<SgColorArray>,
    tex_coords: OwnedSlot<SgTexCoordArray>,
    triangles: RefCell<Vec<[u32; 3]>>,
    normal_indices: RefCell<Vec<u32>>,
    color_indices: RefCell<Vec<u32>>,
    tex_coord_indices: RefCell<Vec<u32>>,
    solid: Cell<bool>,
    primitive: Cell<MeshPrimitive>,
    bbox: Cell<Option<BoundingBox>>,
}

impl SgMesh {
    /// Create an empty mesh
    pub fn new() -> Rc<Self> {
        Self::with_core(ObjectCore::new)
    }

    fn with_core(make_core: impl FnOnce(Weak<dyn SgObject>) -> ObjectCore) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgMesh>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgMesh {
                core: make_core(this),
                vertices: OwnedSlot::new(),
                normals: OwnedSlot::new(),
                colors: OwnedSlot::new(),
                tex_coords: OwnedSlot::new(),
                triangles: RefCell::new(Vec::new()),
                normal_indices: RefCell::new(Vec::new()),
                color_indices: RefCell::new(Vec::new()),
                tex_coord_indices: RefCell::new(Vec::new()),
                solid: Cell::new(false),
                primitive: Cell::new(MeshPrimitive::Mesh),
                bbox: Cell::new(None),
            }
        })
    }

    /// Vertex positions
    pub fn vertices(&self) -> Option<Rc<SgVertexArray>> {
        self.vertices.get()
    }

    /// Replace the vertex positions
    pub fn set_vertices(&self, vertices: Option<Rc<SgVertexArray>>) {
        self.vertices.set(self, vertices);
        self.invalidate_bounding_box();
    }

    /// Vertex positions, creating an empty array if needed
    pub fn get_or_create_vertices(&self) -> Rc<SgVertexArray> {
        self.vertices.get_or_create(self, SgVertexArray::new)
    }

    /// Normals
    pub fn normals(&self) -> Option<Rc<SgNormalArray>> {
        self.normals.get()
    }

    /// Replace the normals
    pub fn set_normals(&self, normals: Option<Rc<SgNormalArray>>) {
        self.normals.set(self, normals);
    }

    /// Normals, creating an empty array if needed
    pub fn get_or_create_normals(&self) -> Rc<SgNormalArray> {
        self.normals.get_or_create(self, SgNormalArray::new)
    }

    /// Colors
    pub fn colors(&self) -> Option<Rc<SgColorArray>> {
        self.colors.get()
    }

    /// Replace the colors
    pub fn set_colors(&self, colors: Option<Rc<SgColorArray>>) {
        self.colors.set(self, colors);
    }

    /// Colors, creating an empty array if needed
    pub fn get_or_create_colors(&self) -> Rc<SgColorArray> {
        self.colors.get_or_create(self, SgColorArray::new)
    }

    /// Texture coordinates
    pub fn tex_coords(&self) -> Option<Rc<SgTexCoordArray>> {
        self.tex_coords.get()
    }

    /// Replace the texture coordinates
    pub fn set_tex_coords(&self, tex_coords: Option<Rc<SgTexCoordArray>>) {
        self.tex_coords.set(self, tex_coords);
    }

    /// Texture coordinates, creating an empty array if needed
    pub fn get_or_create_tex_coords(&self) -> Rc<SgTexCoordArray> {
        self.tex_coords.get_or_create(self, SgTexCoordArray::new)
    }

    /// Number of triangles
    pub fn num_triangles(&self) -> usize {
        self.triangles.borrow().len()
    }

    /// Vertex indices of triangle `index`
    pub fn triangle(&self, index: usize) -> Option<[u32; 3]> {
        self.triangles.borrow().get(index).copied()
    }

    /// Copy of all triangles
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.triangles.borrow().clone()
    }

    /// Append a triangle
    pub fn add_triangle(&self, a: u32, b: u32, c: u32) {
        self.triangles.borrow_mut().push([a, b, c]);
    }

    /// Replace all triangles
    pub fn set_triangles(&self, triangles: Vec<[u32; 3]>) {
        *self.triangles.borrow_mut() = triangles;
    }

    /// Per-corner normal indices
    pub fn normal_indices(&self) -> Vec<u32> {
        self.normal_indices.borrow().clone()
    }

    /// Replace the per-corner normal indices
    pub fn set_normal_indices(&self, indices: Vec<u32>) {
        *self.normal_indices.borrow_mut() = indices;
    }

    /// Per-corner color indices
    pub fn color_indices(&self) -> Vec<u32> {
        self.color_indices.borrow().clone()
    }

    /// Replace the per-corner color indices
    pub fn set_color_indices(&self, indices: Vec<u32>) {
        *self.color_indices.borrow_mut() = indices;
    }

    /// Per-corner texture coordinate indices
    pub fn tex_coord_indices(&self) -> Vec<u32> {
        self.tex_coord_indices.borrow().clone()
    }

    /// Replace the per-corner texture coordinate indices
    pub fn set_tex_coord_indices(&self, indices: Vec<u32>) {
        *self.tex_coord_indices.borrow_mut() = indices;
    }

    /// Whether back faces can be culled
    pub fn is_solid(&self) -> bool {
        self.solid.get()
    }

    /// Mark the mesh as closed
    pub fn set_solid(&self, solid: bool) {
        self.solid.set(solid);
    }

    /// Shape the mesh was generated from
    pub fn primitive(&self) -> MeshPrimitive {
        self.primitive.get()
    }

    /// Record the shape the mesh was generated from
    pub fn set_primitive(&self, primitive: MeshPrimitive) {
        self.primitive.set(primitive);
    }

    /// Bounds of the vertex positions
    pub fn bounding_box(&self) -> BoundingBox {
        if let Some(bbox) = self.bbox.get() {
            return bbox;
        }
        let bbox = match self.vertices.get() {
            Some(vertices) => vertices.with_data(|v| BoundingBox::from_points(v)),
            None => BoundingBox::empty(),
        };
        self.bbox.set(Some(bbox));
        bbox
    }

    /// Drop the cached bounding box
    pub fn invalidate_bounding_box(&self) {
        self.bbox.set(None);
    }

    /// Whether the bounding box is currently cached
    pub fn is_bounding_box_cached(&self) -> bool {
        self.bbox.get().is_some()
    }
}

impl SgObject for SgMesh {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        let mut elements = Vec::new();
        self.vertices.push_element(&mut elements);
        self.normals.push_element(&mut elements);
        self.colors.push_element(&mut elements);
        self.tex_coords.push_element(&mut elements);
        elements
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.invalidate_bounding_box();
        propagate_update(&self.core, update);
    }
}

impl CloneObject for SgMesh {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let vertices = map.clone_optional(self.vertices.get())?;
        let normals = map.clone_optional(self.normals.get())?;
        let colors = map.clone_optional(self.colors.get())?;
        let tex_coords = map.clone_optional(self.tex_coords.get())?;

        let clone = Self::with_core(|this| ObjectCore::cloned_from(this, &self.core));
        clone.vertices.set(&*clone, vertices);
        clone.normals.set(&*clone, normals);
        clone.colors.set(&*clone, colors);
        clone.tex_coords.set(&*clone, tex_coords);
        clone.set_triangles(self.triangles());
        clone.set_normal_indices(self.normal_indices());
        clone.set_color_indices(self.color_indices());
        clone.set_tex_coord_indices(self.tex_coord_indices());
        clone.solid.set(self.solid.get());
        clone.primitive.set(self.primitive.get());
        clone.bbox.set(self.bbox.get());
        Ok(clone)
    }
}

impl Drop for SgMesh {
    fn drop(&mut self) {
        self.vertices.release(&*self);
        self.normals.release(&*self);
        self.colors.release(&*self);
        self.tex_coords.release(&*self);
    }
}
