//! Double-dispatch traversal of the scene graph
//!
//! Every node kind has one `visit_*` method. Group-like defaults walk the
//! children in order and leaf defaults do nothing, so a visitor overrides
//! only the kinds it cares about. Overriding a group method without calling
//! [`visit_children`] prunes that subtree.

use std::fmt::Write as _;

use super::bounding_box::BoundingBox;
use super::camera::SgCamera;
use super::fog::SgFog;
use super::group::SgGroup;
use super::light::SgLight;
use super::node::SgNode;
use super::object::SgObject;
use super::plot::{SgLineSet, SgPointSet};
use super::shape::SgShape;
use super::transform::{SgPosTransform, SgScaleTransform};

/// Access to a visitor as a trait object from inside default methods
pub trait AsSceneVisitor {
    /// This visitor as `&mut dyn SceneVisitor`
    fn as_scene_visitor(&mut self) -> &mut dyn SceneVisitor;
}

impl<T: SceneVisitor> AsSceneVisitor for T {
    fn as_scene_visitor(&mut self) -> &mut dyn SceneVisitor {
        self
    }
}

/// Visit every child of `group` in order
pub fn visit_children(visitor: &mut dyn SceneVisitor, group: &SgGroup) {
    for child in group.children() {
        child.accept(visitor);
    }
}

/// Consumer of a scene graph, one method per node kind
#[allow(unused_variables)]
pub trait SceneVisitor: AsSceneVisitor {
    /// Plain group
    fn visit_group(&mut self, group: &SgGroup) {
        visit_children(self.as_scene_visitor(), group);
    }

    /// Invariant group
    fn visit_invariant_group(&mut self, group: &SgGroup) {
        self.visit_group(group);
    }

    /// Unpickable group
    fn visit_unpickable_group(&mut self, group: &SgGroup) {
        self.visit_group(group);
    }

    /// Overlay group
    fn visit_overlay(&mut self, group: &SgGroup) {
        self.visit_group(group);
    }

    /// Position transform
    fn visit_pos_transform(&mut self, transform: &SgPosTransform) {
        self.visit_group(transform.group());
    }

    /// Scale transform
    fn visit_scale_transform(&mut self, transform: &SgScaleTransform) {
        self.visit_group(transform.group());
    }

    /// Shape
    fn visit_shape(&mut self, shape: &SgShape) {}

    /// Point set
    fn visit_point_set(&mut self, points: &SgPointSet) {}

    /// Line set
    fn visit_line_set(&mut self, lines: &SgLineSet) {}

    /// Light
    fn visit_light(&mut self, light: &SgLight) {}

    /// Camera
    fn visit_camera(&mut self, camera: &SgCamera) {}

    /// Fog
    fn visit_fog(&mut self, fog: &SgFog) {}
}

/// Debug visitor rendering the graph as indented text
///
/// One line per node: kind, id, quoted name when set, and bounding box.
/// Shared nodes appear once per path that reaches them.
#[derive(Debug, Default)]
pub struct SceneDumper {
    output: String,
    depth: usize,
    indent: usize,
}

impl SceneDumper {
    /// Create a dumper indenting two spaces per level
    pub fn new() -> Self {
        Self { output: String::new(), depth: 0, indent: 2 }
    }

    /// Set the number of spaces per level
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Dump the subtree rooted at `node`
    pub fn dump(node: &dyn SgNode) -> String {
        let mut dumper = Self::new();
        node.accept(&mut dumper);
        dumper.finish()
    }

    /// Text produced so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Take the text produced so far
    pub fn finish(self) -> String {
        self.output
    }

    fn line(&mut self, node: &dyn SgNode, detail: Option<String>) {
        let _ = write!(self.output, "{:width$}{} {}", "", node.kind(), node.id(), width = self.depth * self.indent);
        let name = node.name();
        if !name.is_empty() {
            let _ = write!(self.output, " \"{}\"", name);
        }
        if let Some(detail) = detail {
            let _ = write!(self.output, " {}", detail);
        }
        let _ = writeln!(self.output, " {}", format_bounds(&node.bounding_box()));
    }

    fn group_like(&mut self, node: &dyn SgNode, group: &SgGroup, detail: Option<String>) {
        self.line(node, detail);
        self.depth += 1;
        visit_children(self, group);
        self.depth -= 1;
    }
}

fn format_bounds(bbox: &BoundingBox) -> String {
    if bbox.is_empty() {
        "[empty]".to_string()
    } else {
        format!(
            "[({}, {}, {}) - ({}, {}, {})]",
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
        )
    }
}

impl SceneVisitor for SceneDumper {
    fn visit_group(&mut self, group: &SgGroup) {
        self.group_like(group, group, None);
    }

    fn visit_pos_transform(&mut self, transform: &SgPosTransform) {
        let t = transform.translation();
        let detail = format!("t=({}, {}, {})", t.x, t.y, t.z);
        self.group_like(transform, transform.group(), Some(detail));
    }

    fn visit_scale_transform(&mut self, transform: &SgScaleTransform) {
        let s = transform.scale();
        let detail = format!("s=({}, {}, {})", s.x, s.y, s.z);
        self.group_like(transform, transform.group(), Some(detail));
    }

    fn visit_shape(&mut self, shape: &SgShape) {
        let detail = shape.mesh().map(|mesh| format!("triangles={}", mesh.num_triangles()));
        self.line(shape, detail);
    }

    fn visit_point_set(&mut self, points: &SgPointSet) {
        let count = points.vertices().map_or(0, |v| v.len());
        self.line(points, Some(format!("points={}", count)));
    }

    fn visit_line_set(&mut self, lines: &SgLineSet) {
        self.line(lines, Some(format!("lines={}", lines.num_lines())));
    }

    fn visit_light(&mut self, light: &SgLight) {
        self.line(light, None);
    }

    fn visit_camera(&mut self, camera: &SgCamera) {
        self.line(camera, None);
    }

    fn visit_fog(&mut self, fog: &SgFog) {
        self.line(fog, Some(format!("range={}", fog.visibility_range())));
    }
}
