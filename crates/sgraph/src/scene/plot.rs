//! Plot nodes: point sets and line sets

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;

use super::array::{SgColorArray, SgNormalArray, SgVertexArray};
use super::bounding_box::BoundingBox;
use super::clone_map::{CloneObject, SgCloneMap};
use super::material::SgMaterial;
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{propagate_update, ObjectCore, OwnedSlot, SgObject, SgObjectPtr};
use super::update::SgUpdate;
use super::visitor::SceneVisitor;

/// Geometry shared by point sets and line sets
pub struct SgPlot {
    core: ObjectCore,
    vertices: OwnedSlot<SgVertexArray>,
    normals: OwnedSlot<SgNormalArray>,
    colors: OwnedSlot<SgColorArray>,
    material: OwnedSlot<SgMaterial>,
    normal_indices: RefCell<Vec<u32>>,
    color_indices: RefCell<Vec<u32>>,
    bbox: Cell<Option<BoundingBox>>,
}

impl SgPlot {
    fn from_core(core: ObjectCore) -> Self {
        Self {
            core,
            vertices: OwnedSlot::new(),
            normals: OwnedSlot::new(),
            colors: OwnedSlot::new(),
            material: OwnedSlot::new(),
            normal_indices: RefCell::new(Vec::new()),
            color_indices: RefCell::new(Vec::new()),
            bbox: Cell::new(None),
        }
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

    /// Referenced material
    pub fn material(&self) -> Option<Rc<SgMaterial>> {
        self.material.get()
    }

    /// Replace the referenced material
    pub fn set_material(&self, material: Option<Rc<SgMaterial>>) {
        self.material.set(self, material);
    }

    /// Per-vertex normal indices
    pub fn normal_indices(&self) -> Vec<u32> {
        self.normal_indices.borrow().clone()
    }

    /// Replace the normal indices
    pub fn set_normal_indices(&self, indices: Vec<u32>) {
        *self.normal_indices.borrow_mut() = indices;
    }

    /// Per-vertex color indices
    pub fn color_indices(&self) -> Vec<u32> {
        self.color_indices.borrow().clone()
    }

    /// Replace the color indices
    pub fn set_color_indices(&self, indices: Vec<u32>) {
        *self.color_indices.borrow_mut() = indices;
    }

    /// Bounds of the vertex positions
    pub fn bounding_box(&self) -> BoundingBox {
        if let Some(bbox) = self.bbox.get() {
            return bbox;
        }
        let bbox = self
            .vertices
            .get()
            .map_or_else(BoundingBox::empty, |v| v.with_data(|points| BoundingBox::from_points(points)));
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

    fn clone_into(&self, target: &SgPlot, map: &mut SgCloneMap) -> SceneResult<()> {
        target.vertices.set(target, map.clone_optional(self.vertices.get())?);
        target.normals.set(target, map.clone_optional(self.normals.get())?);
        target.colors.set(target, map.clone_optional(self.colors.get())?);
        target.material.set(target, map.clone_optional(self.material.get())?);
        target.set_normal_indices(self.normal_indices());
        target.set_color_indices(self.color_indices());
        target.bbox.set(self.bbox.get());
        Ok(())
    }
}

impl SgObject for SgPlot {
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
        self.material.push_element(&mut elements);
        elements
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.invalidate_bounding_box();
        propagate_update(&self.core, update);
    }
}

impl Drop for SgPlot {
    fn drop(&mut self) {
        self.vertices.release(&*self);
        self.normals.release(&*self);
        self.colors.release(&*self);
        self.material.release(&*self);
    }
}

/// Point cloud
pub struct SgPointSet {
    plot: SgPlot,
    point_size: Cell<f64>,
}

impl SgPointSet {
    /// Create an empty point set
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgPointSet>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgPointSet {
                plot: SgPlot::from_core(ObjectCore::new(this)),
                point_size: Cell::new(0.0),
            }
        })
    }

    /// Point size in pixels; zero leaves it to the renderer
    pub fn point_size(&self) -> f64 {
        self.point_size.get()
    }

    /// Set the point size
    pub fn set_point_size(&self, size: f64) {
        self.point_size.set(size);
    }
}

impl Deref for SgPointSet {
    type Target = SgPlot;

    fn deref(&self) -> &SgPlot {
        &self.plot
    }
}

impl SgObject for SgPointSet {
    fn core(&self) -> &ObjectCore {
        self.plot.core()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        self.plot.elements()
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.plot.transfer_update(update);
    }
}

impl SgNode for SgPointSet {
    fn kind(&self) -> NodeKind {
        NodeKind::PointSet
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_point_set(self);
    }

    fn bounding_box(&self) -> BoundingBox {
        self.plot.bounding_box()
    }

    fn clone_node(self: Rc<Self>, map: &mut SgCloneMap) -> SceneResult<SgNodePtr> {
        let clone: SgNodePtr = map.find_or_create_clone(&self)?;
        Ok(clone)
    }

    fn as_object(&self) -> &dyn SgObject {
        self
    }

    fn into_object(self: Rc<Self>) -> SgObjectPtr {
        self
    }
}

impl CloneObject for SgPointSet {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Rc::new_cyclic(|weak: &Weak<SgPointSet>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgPointSet {
                plot: SgPlot::from_core(ObjectCore::cloned_from(this, self.core())),
                point_size: self.point_size.clone(),
            }
        });
        self.plot.clone_into(&clone.plot, map)?;
        Ok(clone)
    }
}

/// Line segments between plot vertices
pub struct SgLineSet {
    plot: SgPlot,
    line_width: Cell<f64>,
    lines: RefCell<Vec<[u32; 2]>>,
}

impl SgLineSet {
    /// Create an empty line set
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgLineSet>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgLineSet {
                plot: SgPlot::from_core(ObjectCore::new(this)),
                line_width: Cell::new(0.0),
                lines: RefCell::new(Vec::new()),
            }
        })
    }

    /// Line width in pixels; zero leaves it to the renderer
    pub fn line_width(&self) -> f64 {
        self.line_width.get()
    }

    /// Set the line width
    pub fn set_line_width(&self, width: f64) {
        self.line_width.set(width);
    }

    /// Number of line segments
    pub fn num_lines(&self) -> usize {
        self.lines.borrow().len()
    }

    /// Vertex index pair of segment `index`
    pub fn line(&self, index: usize) -> Option<[u32; 2]> {
        self.lines.borrow().get(index).copied()
    }

    /// Copy of all segments
    pub fn lines(&self) -> Vec<[u32; 2]> {
        self.lines.borrow().clone()
    }

    /// Append a segment
    pub fn add_line(&self, a: u32, b: u32) {
        self.lines.borrow_mut().push([a, b]);
    }

    /// Remove all segments
    pub fn clear_lines(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Deref for SgLineSet {
    type Target = SgPlot;

    fn deref(&self) -> &SgPlot {
        &self.plot
    }
}

impl SgObject for SgLineSet {
    fn core(&self) -> &ObjectCore {
        self.plot.core()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        self.plot.elements()
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.plot.transfer_update(update);
    }
}

impl SgNode for SgLineSet {
    fn kind(&self) -> NodeKind {
        NodeKind::LineSet
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_line_set(self);
    }

    fn bounding_box(&self) -> BoundingBox {
        self.plot.bounding_box()
    }

    fn clone_node(self: Rc<Self>, map: &mut SgCloneMap) -> SceneResult<SgNodePtr> {
        let clone: SgNodePtr = map.find_or_create_clone(&self)?;
        Ok(clone)
    }

    fn as_object(&self) -> &dyn SgObject {
        self
    }

    fn into_object(self: Rc<Self>) -> SgObjectPtr {
        self
    }
}

impl CloneObject for SgLineSet {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Rc::new_cyclic(|weak: &Weak<SgLineSet>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgLineSet {
                plot: SgPlot::from_core(ObjectCore::cloned_from(this, self.core())),
                line_width: self.line_width.clone(),
                lines: RefCell::new(self.lines()),
            }
        });
        self.plot.clone_into(&clone.plot, map)?;
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vector3, Vector3f};

    #[test]
    fn test_point_set_defaults_and_bounds() {
        let points = SgPointSet::new();
        assert_eq!(points.point_size(), 0.0);
        assert!(points.bounding_box().is_empty());

        let vertices = points.get_or_create_vertices();
        vertices.push(Vector3f::new(1.0, 1.0, 1.0));
        vertices.push(Vector3f::new(-1.0, 0.0, 2.0));
        vertices.notify_update(crate::scene::update::UpdateAction::MODIFIED);

        let bbox = SgNode::bounding_box(&*points);
        assert_eq!(bbox.min, Vector3::new(-1.0, 0.0, 1.0));
        assert_eq!(bbox.max, Vector3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_line_set_clone_shares_vertices_with_point_set() {
        let vertices = SgVertexArray::from_vec(vec![Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0)]);
        let points = SgPointSet::new();
        points.set_vertices(Some(Rc::clone(&vertices)));
        let lines = SgLineSet::new();
        lines.set_vertices(Some(Rc::clone(&vertices)));
        lines.add_line(0, 1);
        lines.set_line_width(2.0);

        let mut map = SgCloneMap::new();
        let points_clone = map.find_or_create_clone(&points).unwrap();
        let lines_clone = map.find_or_create_clone(&lines).unwrap();

        let shared = points_clone.vertices().unwrap();
        assert!(Rc::ptr_eq(&shared, &lines_clone.vertices().unwrap()));
        assert!(!Rc::ptr_eq(&shared, &vertices));
        assert_eq!(lines_clone.lines(), vec![[0, 1]]);
        assert_eq!(lines_clone.line_width(), 2.0);
        assert_eq!(shared.owner_count(), 2);
    }

    #[test]
    fn test_drop_releases_payload() {
        let vertices = SgVertexArray::new();
        {
            let lines = SgLineSet::new();
            lines.set_vertices(Some(Rc::clone(&vertices)));
            assert_eq!(vertices.owner_count(), 1);
        }
        assert_eq!(vertices.owner_count(), 0);
    }
}
