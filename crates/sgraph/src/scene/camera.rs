//! Camera nodes and view helpers

use std::any::Any;
use std::cell::Cell;
use std::rc::{Rc, Weak};

use nalgebra::Rotation3;

use crate::error::SceneResult;
use crate::foundation::math::{constants, Isometry3, Matrix3, Quat, Translation3, Vector3};

use super::clone_map::{CloneObject, SgCloneMap};
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{ObjectCore, SgObject, SgObjectPtr};
use super::visitor::SceneVisitor;

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Field of view of the larger viewport dimension, in radians
        field_of_view: f64,
    },
    /// Parallel projection
    Orthographic {
        /// Height of the view volume
        height: f64,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective { field_of_view: constants::QUARTER_PI }
    }
}

/// Camera node
///
/// A camera looks down its local negative z axis with y up; place it with
/// an enclosing position transform.
pub struct SgCamera {
    core: ObjectCore,
    projection: Cell<Projection>,
    near_clip_distance: Cell<f64>,
    far_clip_distance: Cell<f64>,
}

impl SgCamera {
    /// Create a camera with the given projection
    pub fn new(projection: Projection) -> Rc<Self> {
        Self::with_core(projection, ObjectCore::new)
    }

    /// Create a perspective camera
    pub fn new_perspective() -> Rc<Self> {
        Self::new(Projection::default())
    }

    /// Create an orthographic camera
    pub fn new_orthographic() -> Rc<Self> {
        Self::new(Projection::Orthographic { height: 2.0 })
    }

    fn with_core(projection: Projection, make_core: impl FnOnce(Weak<dyn SgObject>) -> ObjectCore) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgCamera>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgCamera {
                core: make_core(this),
                projection: Cell::new(projection),
                near_clip_distance: Cell::new(0.01),
                far_clip_distance: Cell::new(100.0),
            }
        })
    }

    /// Projection model
    pub fn projection(&self) -> Projection {
        self.projection.get()
    }

    /// Replace the projection model
    pub fn set_projection(&self, projection: Projection) {
        self.projection.set(projection);
    }

    /// Near clipping distance
    pub fn near_clip_distance(&self) -> f64 {
        self.near_clip_distance.get()
    }

    /// Set the near clipping distance
    pub fn set_near_clip_distance(&self, distance: f64) {
        self.near_clip_distance.set(distance);
    }

    /// Far clipping distance
    pub fn far_clip_distance(&self) -> f64 {
        self.far_clip_distance.get()
    }

    /// Set the far clipping distance
    pub fn set_far_clip_distance(&self, distance: f64) {
        self.far_clip_distance.set(distance);
    }

    /// Camera placement at `eye` looking along `direction`
    ///
    /// Returns `None` when `direction` is zero or parallel to `up`.
    pub fn position_looking_for(eye: &Vector3, direction: &Vector3, up: &Vector3) -> Option<Isometry3> {
        let d = direction.try_normalize(f64::EPSILON)?;
        let c = d.cross(up).try_normalize(f64::EPSILON)?;
        let u = c.cross(&d);
        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[c, u, -d]));
        Some(Isometry3::from_parts(
            Translation3::from(*eye),
            Quat::from_rotation_matrix(&rotation),
        ))
    }

    /// Camera placement at `eye` looking towards `center`
    pub fn position_looking_at(eye: &Vector3, center: &Vector3, up: &Vector3) -> Option<Isometry3> {
        Self::position_looking_for(eye, &(center - eye), up)
    }

    /// Vertical field of view for a viewport aspect ratio (width / height)
    ///
    /// The field of view applies to the larger viewport dimension.
    pub fn fovy(aspect_ratio: f64, field_of_view: f64) -> f64 {
        if aspect_ratio >= 1.0 {
            field_of_view
        } else {
            2.0 * ((field_of_view / 2.0).tan() / aspect_ratio).atan()
        }
    }
}

impl SgObject for SgCamera {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SgNode for SgCamera {
    fn kind(&self) -> NodeKind {
        NodeKind::Camera
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_camera(self);
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

impl CloneObject for SgCamera {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Self::with_core(self.projection(), |this| ObjectCore::cloned_from(this, &self.core));
        clone.set_near_clip_distance(self.near_clip_distance());
        clone.set_far_clip_distance(self.far_clip_distance());
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let camera = SgCamera::new_perspective();
        assert_eq!(camera.projection(), Projection::Perspective { field_of_view: constants::QUARTER_PI });
        assert_relative_eq!(camera.near_clip_distance(), 0.01);
        assert_relative_eq!(camera.far_clip_distance(), 100.0);
        assert_eq!(
            SgCamera::new_orthographic().projection(),
            Projection::Orthographic { height: 2.0 }
        );
    }

    #[test]
    fn test_looking_at_maps_view_axis() {
        let eye = Vector3::new(0.0, 0.0, 5.0);
        let position = SgCamera::position_looking_at(&eye, &Vector3::zeros(), &Vector3::y()).unwrap();

        assert_relative_eq!(position.translation.vector, eye);
        // Local -z points at the target and local y stays up
        assert_relative_eq!(position.rotation * -Vector3::z(), -Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(position.rotation * Vector3::y(), Vector3::y(), epsilon = 1e-12);

        let side = SgCamera::position_looking_for(&Vector3::zeros(), &Vector3::x(), &Vector3::z()).unwrap();
        assert_relative_eq!(side.rotation * -Vector3::z(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(side.rotation * Vector3::y(), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_direction() {
        assert!(SgCamera::position_looking_for(&Vector3::zeros(), &Vector3::y(), &Vector3::y()).is_none());
        assert!(SgCamera::position_looking_at(&Vector3::x(), &Vector3::x(), &Vector3::y()).is_none());
    }

    #[test]
    fn test_fovy() {
        assert_relative_eq!(SgCamera::fovy(1.5, 0.8), 0.8);
        let narrow = SgCamera::fovy(0.5, constants::HALF_PI);
        assert_relative_eq!(narrow, 2.0 * 2.0_f64.atan(), epsilon = 1e-12);
    }
}
