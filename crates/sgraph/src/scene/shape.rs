//! Shape nodes: a mesh with appearance

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;

use super::bounding_box::BoundingBox;
use super::clone_map::{CloneObject, SgCloneMap};
use super::material::SgMaterial;
use super::mesh::SgMesh;
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{ObjectCore, OwnedSlot, SgObject, SgObjectPtr};
use super::texture::SgTexture;
use super::visitor::SceneVisitor;

/// Leaf node drawing a mesh with a material and an optional texture
pub struct SgShape {
    core: ObjectCore,
    mesh: OwnedSlot<SgMesh>,
    material: OwnedSlot<SgMaterial>,
    texture: OwnedSlot<SgTexture>,
}

impl SgShape {
    /// Create a shape without payload
    pub fn new() -> Rc<Self> {
        Self::with_core(ObjectCore::new)
    }

    fn with_core(make_core: impl FnOnce(Weak<dyn SgObject>) -> ObjectCore) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgShape>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgShape {
                core: make_core(this),
                mesh: OwnedSlot::new(),
                material: OwnedSlot::new(),
                texture: OwnedSlot::new(),
            }
        })
    }

    /// Referenced mesh
    pub fn mesh(&self) -> Option<Rc<SgMesh>> {
        self.mesh.get()
    }

    /// Replace the referenced mesh
    pub fn set_mesh(&self, mesh: Option<Rc<SgMesh>>) {
        self.mesh.set(self, mesh);
    }

    /// Referenced mesh, creating an empty one if needed
    pub fn get_or_create_mesh(&self) -> Rc<SgMesh> {
        self.mesh.get_or_create(self, SgMesh::new)
    }

    /// Referenced material
    pub fn material(&self) -> Option<Rc<SgMaterial>> {
        self.material.get()
    }

    /// Replace the referenced material
    pub fn set_material(&self, material: Option<Rc<SgMaterial>>) {
        self.material.set(self, material);
    }

    /// Referenced material, creating a default one if needed
    pub fn get_or_create_material(&self) -> Rc<SgMaterial> {
        self.material.get_or_create(self, SgMaterial::new)
    }

    /// Referenced texture
    pub fn texture(&self) -> Option<Rc<SgTexture>> {
        self.texture.get()
    }

    /// Replace the referenced texture
    pub fn set_texture(&self, texture: Option<Rc<SgTexture>>) {
        self.texture.set(self, texture);
    }

    /// Referenced texture, creating one if needed
    pub fn get_or_create_texture(&self) -> Rc<SgTexture> {
        self.texture.get_or_create(self, SgTexture::new)
    }
}

impl SgObject for SgShape {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        let mut elements = Vec::new();
        self.mesh.push_element(&mut elements);
        self.material.push_element(&mut elements);
        self.texture.push_element(&mut elements);
        elements
    }
}

impl SgNode for SgShape {
    fn kind(&self) -> NodeKind {
        NodeKind::Shape
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_shape(self);
    }

    fn bounding_box(&self) -> BoundingBox {
        self.mesh.get().map_or_else(BoundingBox::empty, |mesh| mesh.bounding_box())
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

impl CloneObject for SgShape {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let mesh = map.clone_optional(self.mesh.get())?;
        let material = map.clone_optional(self.material.get())?;
        let texture = map.clone_optional(self.texture.get())?;

        let clone = Self::with_core(|this| ObjectCore::cloned_from(this, &self.core));
        clone.set_mesh(mesh);
        clone.set_material(material);
        clone.set_texture(texture);
        Ok(clone)
    }
}

impl Drop for SgShape {
    fn drop(&mut self) {
        self.mesh.release(&*self);
        self.material.release(&*self);
        self.texture.release(&*self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vector3;
    use crate::geometry::MeshGenerator;

    #[test]
    fn test_bounding_box_follows_mesh() {
        let shape = SgShape::new();
        assert!(shape.bounding_box().is_empty());

        shape.set_mesh(MeshGenerator::new().generate_box(Vector3::new(2.0, 4.0, 6.0)));
        let bbox = shape.bounding_box();
        assert_eq!(bbox.min, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_payload_ownership() {
        let shape = SgShape::new();
        let mesh = shape.get_or_create_mesh();
        let material = shape.get_or_create_material();
        assert!(mesh.has_owner(&*shape));
        assert!(material.has_owner(&*shape));
        assert_eq!(shape.elements().len(), 2);

        shape.set_mesh(None);
        assert_eq!(mesh.owner_count(), 0);

        drop(shape);
        assert_eq!(material.owner_count(), 0);
    }

    #[test]
    fn test_mesh_edit_propagates_to_shape_owner() {
        use crate::scene::group::SgGroup;
        use crate::scene::update::UpdateAction;

        let group = SgGroup::new();
        let shape = SgShape::new();
        shape.set_mesh(MeshGenerator::new().generate_box(Vector3::new(1.0, 1.0, 1.0)));
        group.add_child(shape.clone(), false);
        group.bounding_box();

        let mesh = shape.mesh().unwrap();
        mesh.get_or_create_vertices().push(crate::foundation::math::Vector3f::new(3.0, 0.0, 0.0));
        mesh.notify_update(UpdateAction::MODIFIED);

        assert!(!group.is_bounding_box_cached());
        assert_eq!(group.bounding_box().max.x, 3.0);
    }
}
