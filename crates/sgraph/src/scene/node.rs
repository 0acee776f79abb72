//! Scene nodes: the traversable part of the graph

use std::fmt;
use std::rc::Rc;

use crate::error::SceneResult;

use super::bounding_box::BoundingBox;
use super::clone_map::SgCloneMap;
use super::group::SgGroup;
use super::object::{SgObject, SgObjectPtr};
use super::visitor::SceneVisitor;

/// Shared pointer to any scene node
pub type SgNodePtr = Rc<dyn SgNode>;

/// The closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Plain group
    Group,
    /// Group whose subtree is not expected to change
    InvariantGroup,
    /// Group skipped by hit testing
    UnpickableGroup,
    /// Group rendered in a separate pass
    Overlay,
    /// Rigid transform
    PosTransform,
    /// Scale transform
    ScaleTransform,
    /// Mesh with appearance
    Shape,
    /// Point cloud
    PointSet,
    /// Line segments
    LineSet,
    /// Light source
    Light,
    /// Camera
    Camera,
    /// Fog settings
    Fog,
}

impl NodeKind {
    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::InvariantGroup => "InvariantGroup",
            NodeKind::UnpickableGroup => "UnpickableGroup",
            NodeKind::Overlay => "Overlay",
            NodeKind::PosTransform => "PosTransform",
            NodeKind::ScaleTransform => "ScaleTransform",
            NodeKind::Shape => "Shape",
            NodeKind::PointSet => "PointSet",
            NodeKind::LineSet => "LineSet",
            NodeKind::Light => "Light",
            NodeKind::Camera => "Camera",
            NodeKind::Fog => "Fog",
        }
    }

    /// Whether nodes of this kind hold children
    pub fn is_group(self) -> bool {
        matches!(
            self,
            NodeKind::Group
                | NodeKind::InvariantGroup
                | NodeKind::UnpickableGroup
                | NodeKind::Overlay
                | NodeKind::PosTransform
                | NodeKind::ScaleTransform
        )
    }

    /// Whether nodes of this kind are consumed before the main render pass
    pub fn is_preprocessed(self) -> bool {
        matches!(self, NodeKind::Light | NodeKind::Camera | NodeKind::Fog)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An object that takes part in traversal and has a bounding volume
pub trait SgNode: SgObject {
    /// Concrete kind of this node
    fn kind(&self) -> NodeKind;

    /// Call the visitor method matching this node's kind
    fn accept(&self, visitor: &mut dyn SceneVisitor);

    /// Bounding box in the coordinate frame of this node's owners
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::empty()
    }

    /// Clone this node through `map`
    fn clone_node(self: Rc<Self>, map: &mut SgCloneMap) -> SceneResult<SgNodePtr>;

    /// This node as a plain object reference
    fn as_object(&self) -> &dyn SgObject;

    /// This node as a plain object pointer
    fn into_object(self: Rc<Self>) -> SgObjectPtr;

    /// Group part of this node, for groups and transforms
    fn as_group(&self) -> Option<&SgGroup> {
        None
    }

    /// Whether this node holds children
    fn is_group(&self) -> bool {
        self.as_group().is_some()
    }
}

impl fmt::Debug for dyn SgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {:?})", self.kind(), self.id(), &*self.name())
    }
}
