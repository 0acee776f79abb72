//! Transform nodes
//!
//! A transform is a group whose children live in a local frame. Its bounding
//! box is the children's aggregate mapped through the node's matrix; both
//! boxes are cached together and dropped together.

use std::any::Any;
use std::cell::Cell;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;
use crate::foundation::math::{affine_from_isometry, affine_from_scale, Affine3, Isometry3, Quat, Translation3, Vector3};

use super::bounding_box::BoundingBox;
use super::clone_map::{CloneObject, SgCloneMap};
use super::group::{BoundsCache, GroupKind, SgGroup};
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{ObjectCore, SgObject, SgObjectPtr};
use super::update::SgUpdate;
use super::visitor::SceneVisitor;

/// Bounding box of `group` under `transform`, filling the cache if needed
fn cached_transformed_bounds(group: &SgGroup, transform: &Affine3) -> BoundsCache {
    if let Some(cached) = group.cached_bounds() {
        return cached;
    }
    let untransformed = group.children_bounding_box();
    let bounds = BoundsCache {
        untransformed,
        transformed: untransformed.transformed(transform),
    };
    group.set_cached_bounds(Some(bounds));
    bounds
}

/// Group with a rigid transform (rotation and translation)
pub struct SgPosTransform {
    group: SgGroup,
    isometry: Cell<Isometry3>,
}

impl SgPosTransform {
    /// Create an identity transform
    pub fn new() -> Rc<Self> {
        Self::from_isometry(Isometry3::identity())
    }

    /// Create a transform from a rigid transform
    pub fn from_isometry(isometry: Isometry3) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgPosTransform>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgPosTransform {
                group: SgGroup::from_parts(ObjectCore::new(this), GroupKind::Plain),
                isometry: Cell::new(isometry),
            }
        })
    }

    /// Create a pure translation
    pub fn from_translation(translation: Vector3) -> Rc<Self> {
        Self::from_isometry(Isometry3::from_parts(Translation3::from(translation), Quat::identity()))
    }

    /// Group part of this transform
    pub fn group(&self) -> &SgGroup {
        &self.group
    }

    /// Current rigid transform
    pub fn isometry(&self) -> Isometry3 {
        self.isometry.get()
    }

    /// Current transform as an affine matrix
    pub fn transform(&self) -> Affine3 {
        affine_from_isometry(&self.isometry.get())
    }

    /// Translation part
    pub fn translation(&self) -> Vector3 {
        self.isometry.get().translation.vector
    }

    /// Rotation part
    pub fn rotation(&self) -> Quat {
        self.isometry.get().rotation
    }

    /// Replace the whole transform
    ///
    /// Ancestors are not notified; call
    /// [`notify_update`](SgObject::notify_update) after editing.
    pub fn set_isometry(&self, isometry: Isometry3) {
        self.isometry.set(isometry);
        self.group.invalidate_bounding_box();
    }

    /// Replace the translation part
    pub fn set_translation(&self, translation: Vector3) {
        let mut isometry = self.isometry.get();
        isometry.translation = Translation3::from(translation);
        self.set_isometry(isometry);
    }

    /// Replace the rotation part
    pub fn set_rotation(&self, rotation: Quat) {
        let mut isometry = self.isometry.get();
        isometry.rotation = rotation;
        self.set_isometry(isometry);
    }

    /// Aggregate of the children in the local frame
    pub fn untransformed_bounding_box(&self) -> BoundingBox {
        cached_transformed_bounds(&self.group, &self.transform()).untransformed
    }
}

impl Deref for SgPosTransform {
    type Target = SgGroup;

    fn deref(&self) -> &SgGroup {
        &self.group
    }
}

impl SgObject for SgPosTransform {
    fn core(&self) -> &ObjectCore {
        self.group.core()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        self.group.elements()
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.group.transfer_update(update);
    }
}

impl SgNode for SgPosTransform {
    fn kind(&self) -> NodeKind {
        NodeKind::PosTransform
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_pos_transform(self);
    }

    fn bounding_box(&self) -> BoundingBox {
        cached_transformed_bounds(&self.group, &self.transform()).transformed
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

    fn as_group(&self) -> Option<&SgGroup> {
        Some(&self.group)
    }
}

impl CloneObject for SgPosTransform {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Rc::new_cyclic(|weak: &Weak<SgPosTransform>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgPosTransform {
                group: SgGroup::from_parts(ObjectCore::cloned_from(this, self.core()), GroupKind::Plain),
                isometry: Cell::new(self.isometry.get()),
            }
        });
        self.group.clone_children_into(&clone.group, map)?;
        clone.group.set_cached_bounds(self.group.cached_bounds());
        Ok(clone)
    }
}

/// Group with a per-axis scale
pub struct SgScaleTransform {
    group: SgGroup,
    scale: Cell<Vector3>,
}

impl SgScaleTransform {
    /// Create a unit scale
    pub fn new() -> Rc<Self> {
        Self::from_scale(Vector3::new(1.0, 1.0, 1.0))
    }

    /// Create a transform with the given scale factors
    pub fn from_scale(scale: Vector3) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgScaleTransform>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgScaleTransform {
                group: SgGroup::from_parts(ObjectCore::new(this), GroupKind::Plain),
                scale: Cell::new(scale),
            }
        })
    }

    /// Group part of this transform
    pub fn group(&self) -> &SgGroup {
        &self.group
    }

    /// Current scale factors
    pub fn scale(&self) -> Vector3 {
        self.scale.get()
    }

    /// Replace the scale factors
    ///
    /// Ancestors are not notified; call
    /// [`notify_update`](SgObject::notify_update) after editing.
    pub fn set_scale(&self, scale: Vector3) {
        self.scale.set(scale);
        self.group.invalidate_bounding_box();
    }

    /// Current transform as an affine matrix
    pub fn transform(&self) -> Affine3 {
        affine_from_scale(&self.scale.get())
    }

    /// Aggregate of the children in the local frame
    pub fn untransformed_bounding_box(&self) -> BoundingBox {
        cached_transformed_bounds(&self.group, &self.transform()).untransformed
    }
}

impl Deref for SgScaleTransform {
    type Target = SgGroup;

    fn deref(&self) -> &SgGroup {
        &self.group
    }
}

impl SgObject for SgScaleTransform {
    fn core(&self) -> &ObjectCore {
        self.group.core()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        self.group.elements()
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.group.transfer_update(update);
    }
}

impl SgNode for SgScaleTransform {
    fn kind(&self) -> NodeKind {
        NodeKind::ScaleTransform
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_scale_transform(self);
    }

    fn bounding_box(&self) -> BoundingBox {
        cached_transformed_bounds(&self.group, &self.transform()).transformed
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

    fn as_group(&self) -> Option<&SgGroup> {
        Some(&self.group)
    }
}

impl CloneObject for SgScaleTransform {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Rc::new_cyclic(|weak: &Weak<SgScaleTransform>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgScaleTransform {
                group: SgGroup::from_parts(ObjectCore::cloned_from(this, self.core()), GroupKind::Plain),
                scale: Cell::new(self.scale.get()),
            }
        });
        self.group.clone_children_into(&clone.group, map)?;
        clone.group.set_cached_bounds(self.group.cached_bounds());
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants;
    use crate::geometry::MeshGenerator;
    use crate::scene::shape::SgShape;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-6;

    fn unit_box() -> Rc<SgShape> {
        let shape = SgShape::new();
        shape.set_mesh(MeshGenerator::new().generate_box(Vector3::new(2.0, 2.0, 2.0)));
        shape
    }

    #[test]
    fn test_translation_moves_bounding_box() {
        let transform = SgPosTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        transform.add_child(unit_box(), false);

        let bbox = transform.bounding_box();
        assert_relative_eq!(bbox.min, Vector3::new(0.0, -1.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(bbox.max, Vector3::new(2.0, 1.0, 1.0), epsilon = EPSILON);

        let local = transform.untransformed_bounding_box();
        assert_relative_eq!(local.min, Vector3::new(-1.0, -1.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_setter_invalidates_own_cache() {
        let transform = SgPosTransform::new();
        transform.add_child(unit_box(), false);
        transform.bounding_box();
        assert!(transform.is_bounding_box_cached());

        transform.set_translation(Vector3::new(0.0, 3.0, 0.0));
        assert!(!transform.is_bounding_box_cached());
        assert_relative_eq!(transform.translation(), Vector3::new(0.0, 3.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(transform.bounding_box().max.y, 4.0, epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_encloses_rotated_box() {
        let transform = SgPosTransform::new();
        let shape = SgShape::new();
        shape.set_mesh(MeshGenerator::new().generate_box(Vector3::new(4.0, 2.0, 2.0)));
        transform.add_child(shape, false);
        transform.set_rotation(Quat::from_axis_angle(&Vector3::z_axis(), constants::HALF_PI));

        let bbox = transform.bounding_box();
        assert_relative_eq!(bbox.max, Vector3::new(1.0, 2.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_scale_transform_bounding_box() {
        let transform = SgScaleTransform::from_scale(Vector3::new(2.0, 3.0, 0.5));
        transform.add_child(unit_box(), false);

        let bbox = transform.bounding_box();
        assert_relative_eq!(bbox.max, Vector3::new(2.0, 3.0, 0.5), epsilon = EPSILON);
        assert_relative_eq!(transform.untransformed_bounding_box().max, Vector3::new(1.0, 1.0, 1.0), epsilon = EPSILON);

        transform.set_scale(Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(transform.bounding_box().max, Vector3::new(1.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_reflects_last_setter() {
        let transform = SgPosTransform::new();
        let iso = Isometry3::translation(1.0, 2.0, 3.0);
        transform.set_isometry(iso);
        assert_eq!(transform.isometry(), iso);
        assert_eq!(transform.kind(), NodeKind::PosTransform);
    }
}
