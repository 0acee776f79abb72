//! Deep cloning scenarios

use std::rc::Rc;

use crate::config::CloneConfig;
use crate::error::SceneError;
use crate::foundation::math::{Vector3, Vector3f};
use crate::scene::{
    SgCloneMap, SgGroup, SgMaterial, SgMesh, SgNode, SgObject, SgPosTransform, SgShape, SgVertexArray,
};

/// Two groups whose shapes use different meshes over one vertex array
fn shared_vertex_scene() -> (Rc<SgGroup>, Rc<SgVertexArray>) {
    let vertices = SgVertexArray::from_vec(vec![
        Vector3f::new(0.0, 0.0, 0.0),
        Vector3f::new(1.0, 0.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
    ]);
    let root = SgGroup::new();
    for name in ["first", "second"] {
        let mesh = SgMesh::new();
        mesh.set_vertices(Some(Rc::clone(&vertices)));
        mesh.add_triangle(0, 1, 2);
        let shape = SgShape::new();
        shape.set_mesh(Some(mesh));
        let group = SgGroup::new();
        group.set_name(name);
        group.add_child(shape, false);
        root.add_child(group, false);
    }
    (root, vertices)
}

fn mesh_of(root: &SgGroup, index: usize) -> Rc<SgMesh> {
    let group = root.child(index).and_then(|c| c.as_group().and_then(|g| g.child(0))).unwrap();
    let shape = group.as_object().as_any().downcast_ref::<SgShape>().unwrap();
    shape.mesh().unwrap()
}

fn mesh_of_child(group: &SgGroup) -> Rc<SgMesh> {
    let child = group.child(0).unwrap();
    let shape = child.as_object().as_any().downcast_ref::<SgShape>().unwrap();
    shape.mesh().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_vertex_array_stays_shared() {
        let (root, vertices) = shared_vertex_scene();

        let mut map = SgCloneMap::new();
        let copy = map.find_or_create_clone(&root).unwrap();

        let first = mesh_of(&copy, 0).vertices().unwrap();
        let second = mesh_of(&copy, 1).vertices().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert!(!Rc::ptr_eq(&first, &vertices));
        assert_eq!(first.owner_count(), 2);
        assert_eq!(vertices.owner_count(), 2);
        assert!(Rc::ptr_eq(&map.find_clone(&*vertices).unwrap(), &first));
        assert_eq!(copy.child(1).unwrap().name().as_str(), "second");
    }

    #[test]
    fn test_separate_roots_share_cloned_vertex_array() {
        let vertices = SgVertexArray::from_vec(vec![
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ]);
        let a = SgGroup::new();
        let b = SgGroup::new();
        for group in [&a, &b] {
            let mesh = SgMesh::new();
            mesh.set_vertices(Some(Rc::clone(&vertices)));
            mesh.add_triangle(0, 1, 2);
            let shape = SgShape::new();
            shape.set_mesh(Some(mesh));
            group.add_child(shape, false);
        }
        assert!(!Rc::ptr_eq(&mesh_of_child(&a), &mesh_of_child(&b)));

        let mut map = SgCloneMap::new();
        let a_copy = map.find_or_create_clone(&a).unwrap();
        let b_copy = map.find_or_create_clone(&b).unwrap();

        let a_vertices = mesh_of_child(&a_copy).vertices().unwrap();
        let b_vertices = mesh_of_child(&b_copy).vertices().unwrap();
        assert!(Rc::ptr_eq(&a_vertices, &b_vertices));
        assert!(!Rc::ptr_eq(&a_vertices, &vertices));
        assert_eq!(a_vertices.owner_count(), 2);
        assert!(!Rc::ptr_eq(&mesh_of_child(&a_copy), &mesh_of_child(&b_copy)));
    }

    #[test]
    fn test_payload_sharing_without_non_node_cloning() {
        let (root, vertices) = shared_vertex_scene();

        let mut map = SgCloneMap::from_config(&CloneConfig { non_node_cloning: false });
        let copy = map.find_or_create_clone(&root).unwrap();

        // Meshes are payload too, so the clones reference the original meshes
        assert!(Rc::ptr_eq(&mesh_of(&copy, 0), &mesh_of(&root, 0)));
        assert_eq!(vertices.owner_count(), 2);
        assert_eq!(mesh_of(&root, 0).owner_count(), 2);
        assert!(map.find_clone(&*vertices).is_none());
    }

    #[test]
    fn test_shared_node_is_cloned_once() {
        let root = SgGroup::new();
        let left = SgPosTransform::from_translation(Vector3::new(-1.0, 0.0, 0.0));
        let right = SgPosTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let shape = SgShape::new();
        left.add_child(shape.clone(), false);
        right.add_child(shape.clone(), false);
        root.add_child(left, false);
        root.add_child(right, false);

        let copy = SgCloneMap::new().find_or_create_clone(&root).unwrap();
        let cloned_left = copy.child(0).unwrap();
        let cloned_right = copy.child(1).unwrap();
        let a = cloned_left.as_group().unwrap().child(0).unwrap();
        let b = cloned_right.as_group().unwrap().child(0).unwrap();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), shape.id());
        assert_eq!(a.owner_count(), 2);
        assert_eq!(shape.owner_count(), 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let root = SgGroup::new();
        let transform = SgPosTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let shape = SgShape::new();
        let material = SgMaterial::new();
        shape.set_material(Some(material.clone()));
        shape.set_mesh(crate::geometry::MeshGenerator::new().generate_box(Vector3::new(2.0, 2.0, 2.0)));
        transform.add_child(shape.clone(), false);
        root.add_child(transform.clone(), false);
        let original_bbox = root.bounding_box();

        let copy = SgCloneMap::new().find_or_create_clone(&root).unwrap();
        // The cached bounds come along with the copy
        assert!(copy.is_bounding_box_cached());
        assert_eq!(copy.bounding_box(), original_bbox);

        let cloned_transform = copy.child(0).unwrap();
        let cloned_transform = cloned_transform.as_object().as_any().downcast_ref::<SgPosTransform>().unwrap();
        cloned_transform.set_translation(Vector3::new(10.0, 0.0, 0.0));
        cloned_transform.notify_update(crate::scene::UpdateAction::MODIFIED);

        let cloned_shape = cloned_transform.child(0).unwrap();
        let cloned_shape = cloned_shape.as_object().as_any().downcast_ref::<SgShape>().unwrap();
        cloned_shape.material().unwrap().set_transparency(0.5);
        let cloned_vertices = cloned_shape.mesh().unwrap().vertices().unwrap();
        assert!(cloned_vertices.is_storage_shared());
        cloned_vertices.set(0, Vector3f::new(9.0, 9.0, 9.0));

        assert_eq!(transform.translation(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(root.bounding_box(), original_bbox);
        assert_eq!(material.transparency(), 0.0);
        assert_eq!(shape.mesh().unwrap().vertices().unwrap().get(0), Some(Vector3f::new(1.0, 1.0, 1.0)));
        assert!(!cloned_vertices.is_storage_shared());
        assert_eq!(copy.bounding_box().min.x, 9.0);
    }

    #[test]
    fn test_cycle_is_reported() {
        let a = SgGroup::new();
        let b = SgGroup::new();
        a.add_child(b.clone(), false);
        b.add_child(a.clone(), false);

        let mut map = SgCloneMap::new();
        let result = map.find_or_create_clone(&a);
        assert_eq!(result.err(), Some(SceneError::CyclicGraph(a.id())));
        assert!(map.is_empty());

        // Break the cycle so both groups can be freed
        b.clear_children(false);
        assert_eq!(a.owner_count(), 0);
    }

    #[test]
    fn test_map_reused_across_roots() {
        let shape = SgShape::new();
        let first = SgGroup::new();
        let second = SgGroup::new();
        first.add_child(shape.clone(), false);
        second.add_child(shape.clone(), false);

        let mut map = SgCloneMap::new();
        let first_copy = map.find_or_create_clone(&first).unwrap();
        let second_copy = map.find_or_create_clone(&second).unwrap();
        assert_eq!(first_copy.child(0).unwrap().id(), second_copy.child(0).unwrap().id());
        assert_eq!(map.len(), 3);

        map.clear();
        let third_copy = map.find_or_create_clone(&first).unwrap();
        assert_ne!(third_copy.child(0).unwrap().id(), first_copy.child(0).unwrap().id());
    }
}
