//! Meshes made of arbitrary polygons, as produced by model loaders

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::SceneResult;

use super::array::{SgColorArray, SgNormalArray, SgTexCoordArray, SgVertexArray};
use super::bounding_box::BoundingBox;
use super::clone_map::{CloneObject, SgCloneMap};
use super::mesh::SgMesh;
use super::object::{propagate_update, ObjectCore, OwnedSlot, SgObject, SgObjectPtr};
use super::update::SgUpdate;

/// Separator between polygons in the flat index layout
pub const POLYGON_SEPARATOR: i32 = -1;

/// Mesh whose faces are polygons with any number of corners
///
/// Attribute index lists run over polygon corners in order, the same way
/// [`SgMesh`] indexes triangle corners. Use [`SgPolygonMesh::triangulate`]
/// to obtain a mesh a shape can render.
pub struct SgPolygonMesh {
    core: ObjectCore,
    vertices: OwnedSlot<SgVertexArray>,
    normals: OwnedSlot<SgNormalArray>,
    colors: OwnedSlot<SgColorArray>,
    tex_coords: OwnedSlot<SgTexCoordArray>,
    polygons: RefCell<Vec<Vec<u32>>>,
    normal_indices: RefCell<Vec<u32>>,
    color_indices: RefCell<Vec<u32>>,
    tex_coord_indices: RefCell<Vec<u32>>,
    solid: Cell<bool>,
    bbox: Cell<Option<BoundingBox>>,
}

impl SgPolygonMesh {
    /// Create an empty polygon mesh
    pub fn new() -> Rc<Self> {
        Self::with_core(ObjectCore::new)
    }

    fn with_core(make_core: impl FnOnce(Weak<dyn SgObject>) -> ObjectCore) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgPolygonMesh>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgPolygonMesh {
                core: make_core(this),
                vertices: OwnedSlot::new(),
                normals: OwnedSlot::new(),
                colors: OwnedSlot::new(),
                tex_coords: OwnedSlot::new(),
                polygons: RefCell::new(Vec::new()),
                normal_indices: RefCell::new(Vec::new()),
                color_indices: RefCell::new(Vec::new()),
                tex_coord_indices: RefCell::new(Vec::new()),
                solid: Cell::new(false),
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

    /// Colors
    pub fn colors(&self) -> Option<Rc<SgColorArray>> {
        self.colors.get()
    }

    /// Replace the colors
    pub fn set_colors(&self, colors: Option<Rc<SgColorArray>>) {
        self.colors.set(self, colors);
    }

    /// Texture coordinates
    pub fn tex_coords(&self) -> Option<Rc<SgTexCoordArray>> {
        self.tex_coords.get()
    }

    /// Replace the texture coordinates
    pub fn set_tex_coords(&self, tex_coords: Option<Rc<SgTexCoordArray>>) {
        self.tex_coords.set(self, tex_coords);
    }

    /// Number of polygons
    pub fn num_polygons(&self) -> usize {
        self.polygons.borrow().len()
    }

    /// Total number of polygon corners
    pub fn num_corners(&self) -> usize {
        self.polygons.borrow().iter().map(Vec::len).sum()
    }

    /// Vertex indices of polygon `index`
    pub fn polygon(&self, index: usize) -> Option<Vec<u32>> {
        self.polygons.borrow().get(index).cloned()
    }

    /// Copy of all polygons
    pub fn polygons(&self) -> Vec<Vec<u32>> {
        self.polygons.borrow().clone()
    }

    /// Append a polygon, returning `false` if it has fewer than three corners
    pub fn add_polygon(&self, vertices: &[u32]) -> bool {
        if vertices.len() < 3 {
            log::warn!("Ignoring polygon with {} corners in mesh {}", vertices.len(), self.id());
            return false;
        }
        self.polygons.borrow_mut().push(vertices.to_vec());
        true
    }

    /// Replace all polygons
    pub fn set_polygons(&self, polygons: Vec<Vec<u32>>) {
        *self.polygons.borrow_mut() = polygons;
    }

    /// Polygons in the flat layout, each followed by [`POLYGON_SEPARATOR`]
    pub fn polygon_vertices(&self) -> Vec<i32> {
        let polygons = self.polygons.borrow();
        let mut flat = Vec::with_capacity(polygons.iter().map(|p| p.len() + 1).sum());
        for polygon in polygons.iter() {
            flat.extend(polygon.iter().filter_map(|&v| i32::try_from(v).ok()));
            flat.push(POLYGON_SEPARATOR);
        }
        flat
    }

    /// Replace all polygons from the flat layout
    ///
    /// A trailing polygon without separator is accepted. Polygons with fewer
    /// than three corners are dropped. Returns the number of polygons stored.
    pub fn set_polygon_vertices(&self, flat: &[i32]) -> usize {
        let mut polygons = Vec::new();
        for run in flat.split(|&v| v == POLYGON_SEPARATOR) {
            if run.is_empty() {
                continue;
            }
            if run.len() < 3 || run.iter().any(|&v| v < 0) {
                log::warn!("Dropping malformed polygon {:?} in mesh {}", run, self.id());
                continue;
            }
            polygons.push(run.iter().filter_map(|&v| u32::try_from(v).ok()).collect());
        }
        let count = polygons.len();
        self.set_polygons(polygons);
        count
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

    /// Fan-triangulate every polygon into a new triangle mesh
    ///
    /// The result references the same attribute arrays. Polygons are assumed
    /// convex. An index list whose length does not match the corner count is
    /// left out of the result.
    pub fn triangulate(&self) -> Rc<SgMesh> {
        let mesh = SgMesh::new();
        mesh.set_vertices(self.vertices());
        mesh.set_normals(self.normals());
        mesh.set_colors(self.colors());
        mesh.set_tex_coords(self.tex_coords());
        mesh.set_solid(self.is_solid());

        let polygons = self.polygons.borrow();
        let mut triangles = Vec::new();
        let mut corners = Vec::new();
        let mut offset = 0;
        for polygon in polygons.iter() {
            for k in 1..polygon.len().saturating_sub(1) {
                triangles.push([polygon[0], polygon[k], polygon[k + 1]]);
                corners.extend([offset, offset + k, offset + k + 1]);
            }
            offset += polygon.len();
        }
        log::debug!(
            "Triangulated {} polygons of mesh {} into {} triangles",
            polygons.len(),
            self.id(),
            triangles.len()
        );
        mesh.set_triangles(triangles);
        mesh.set_normal_indices(self.remap_corners("normal", &self.normal_indices.borrow(), &corners, offset));
        mesh.set_color_indices(self.remap_corners("color", &self.color_indices.borrow(), &corners, offset));
        mesh.set_tex_coord_indices(self.remap_corners(
            "texture coordinate",
            &self.tex_coord_indices.borrow(),
            &corners,
            offset,
        ));
        mesh
    }

    fn remap_corners(&self, what: &str, indices: &[u32], corners: &[usize], num_corners: usize) -> Vec<u32> {
        if indices.is_empty() {
            return Vec::new();
        }
        if indices.len() != num_corners {
            log::warn!(
                "Mesh {} has {} {} indices for {} corners; leaving them out",
                self.id(),
                indices.len(),
                what,
                num_corners
            );
            return Vec::new();
        }
        corners.iter().map(|&corner| indices[corner]).collect()
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

impl SgObject for SgPolygonMesh {
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

impl CloneObject for SgPolygonMesh {
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
        clone.set_polygons(self.polygons());
        clone.set_normal_indices(self.normal_indices());
        clone.set_color_indices(self.color_indices());
        clone.set_tex_coord_indices(self.tex_coord_indices());
        clone.solid.set(self.solid.get());
        clone.bbox.set(self.bbox.get());
        Ok(clone)
    }
}

impl Drop for SgPolygonMesh {
    fn drop(&mut self) {
        self.vertices.release(&*self);
        self.normals.release(&*self);
        self.colors.release(&*self);
        self.tex_coords.release(&*self);
    }
}
