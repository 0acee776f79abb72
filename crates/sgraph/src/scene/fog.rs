//! Fog settings node

use std::any::Any;
use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;
use crate::foundation::math::Vector3f;

use super::clone_map::{CloneObject, SgCloneMap};
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{ObjectCore, SgObject, SgObjectPtr};
use super::visitor::SceneVisitor;

/// Distance fog, consumed by the renderer before the main pass
///
/// A visibility range of zero disables the fog.
pub struct SgFog {
    core: ObjectCore,
    color: Cell<Vector3f>,
    visibility_range: Cell<f32>,
}

impl SgFog {
    /// Create white fog with no visibility limit
    pub fn new() -> Rc<Self> {
        Self::with_core(ObjectCore::new)
    }

    fn with_core(make_core: impl FnOnce(Weak<dyn SgObject>) -> ObjectCore) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgFog>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgFog {
                core: make_core(this),
                color: Cell::new(Vector3f::new(1.0, 1.0, 1.0)),
                visibility_range: Cell::new(0.0),
            }
        })
    }

    /// Fog color (RGB)
    pub fn color(&self) -> Vector3f {
        self.color.get()
    }

    /// Set the fog color
    pub fn set_color(&self, color: Vector3f) {
        self.color.set(color);
    }

    /// Distance at which objects are fully fogged
    pub fn visibility_range(&self) -> f32 {
        self.visibility_range.get()
    }

    /// Set the visibility range; negative values are clamped to zero
    pub fn set_visibility_range(&self, range: f32) {
        self.visibility_range.set(range.max(0.0));
    }

    /// Whether the fog has any effect
    pub fn is_enabled(&self) -> bool {
        self.visibility_range.get() > 0.0
    }
}

impl SgObject for SgFog {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SgNode for SgFog {
    fn kind(&self) -> NodeKind {
        NodeKind::Fog
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_fog(self);
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

impl CloneObject for SgFog {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Self::with_core(|this| ObjectCore::cloned_from(this, &self.core));
        clone.set_color(self.color());
        clone.set_visibility_range(self.visibility_range());
        Ok(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::group::SgGroup;

    #[test]
    fn test_defaults() {
        let fog = SgFog::new();
        assert_eq!(fog.color(), Vector3f::new(1.0, 1.0, 1.0));
        assert!(!fog.is_enabled());
        assert!(fog.kind().is_preprocessed());
        assert!(fog.bounding_box().is_empty());
    }

    #[test]
    fn test_negative_range_is_clamped() {
        let fog = SgFog::new();
        fog.set_visibility_range(-5.0);
        assert_eq!(fog.visibility_range(), 0.0);
        fog.set_visibility_range(30.0);
        assert!(fog.is_enabled());
    }

    #[test]
    fn test_clone_through_group() {
        let root = SgGroup::new();
        let fog = SgFog::new();
        fog.set_name("haze");
        fog.set_visibility_range(12.0);
        root.add_child(fog.clone(), false);

        let copy = SgCloneMap::new().find_or_create_clone(&root).unwrap();
        let cloned = copy.child(0).unwrap();
        let cloned = cloned.as_object().as_any().downcast_ref::<SgFog>().unwrap();
        assert_ne!(cloned.id(), fog.id());
        assert_eq!(cloned.name().as_str(), "haze");
        assert_eq!(cloned.visibility_range(), 12.0);
    }
}
