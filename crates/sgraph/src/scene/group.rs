//! Group nodes and their specializations

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::{SceneError, SceneResult};

use super::bounding_box::BoundingBox;
use super::clone_map::{CloneObject, SgCloneMap};
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{propagate_update, ObjectCore, SgObject, SgObjectPtr};
use super::update::{SgUpdate, UpdateAction};
use super::visitor::SceneVisitor;

/// Specialization of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Plain group
    Plain,
    /// Renderer hint that the subtree does not change
    Invariant,
    /// Subtree is skipped by hit testing
    Unpickable,
    /// Subtree is rendered in a separate pass and has no bounding volume
    Overlay,
}

impl GroupKind {
    fn node_kind(self) -> NodeKind {
        match self {
            GroupKind::Plain => NodeKind::Group,
            GroupKind::Invariant => NodeKind::InvariantGroup,
            GroupKind::Unpickable => NodeKind::UnpickableGroup,
            GroupKind::Overlay => NodeKind::Overlay,
        }
    }
}

/// Cached bounding boxes of a group
///
/// For plain groups both boxes are equal. Transforms store the aggregate of
/// their children and the same box mapped through their matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundsCache {
    pub untransformed: BoundingBox,
    pub transformed: BoundingBox,
}

/// Node with an ordered list of children
///
/// A child may appear in several groups, or several times in one group.
/// Every occurrence is matched by one owner entry on the child.
pub struct SgGroup {
    core: ObjectCore,
    kind: GroupKind,
    children: RefCell<Vec<SgNodePtr>>,
    bounds: Cell<Option<BoundsCache>>,
}

impl SgGroup {
    /// Create an empty plain group
    pub fn new() -> Rc<Self> {
        Self::with_kind(GroupKind::Plain)
    }

    /// Create an empty invariant group
    pub fn new_invariant() -> Rc<Self> {
        Self::with_kind(GroupKind::Invariant)
    }

    /// Create an empty unpickable group
    pub fn new_unpickable() -> Rc<Self> {
        Self::with_kind(GroupKind::Unpickable)
    }

    /// Create an empty overlay group
    pub fn new_overlay() -> Rc<Self> {
        Self::with_kind(GroupKind::Overlay)
    }

    /// Create an empty group of the given kind
    pub fn with_kind(kind: GroupKind) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgGroup>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgGroup::from_parts(ObjectCore::new(this), kind)
        })
    }

    /// Group state embedded in another node type
    pub(crate) fn from_parts(core: ObjectCore, kind: GroupKind) -> Self {
        Self {
            core,
            kind,
            children: RefCell::new(Vec::new()),
            bounds: Cell::new(None),
        }
    }

    /// Specialization of this group
    pub fn group_kind(&self) -> GroupKind {
        self.kind
    }

    /// Number of children, counting duplicates
    pub fn num_children(&self) -> usize {
        self.children.borrow().len()
    }

    /// Whether the group has no children
    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Child at `index`
    pub fn child(&self, index: usize) -> Option<SgNodePtr> {
        self.children.borrow().get(index).cloned()
    }

    /// Snapshot of the child list
    pub fn children(&self) -> Vec<SgNodePtr> {
        self.children.borrow().clone()
    }

    /// Whether `node` is a child of this group
    pub fn contains(&self, node: &dyn SgNode) -> bool {
        let id = node.id();
        self.children.borrow().iter().any(|c| c.id() == id)
    }

    /// Append `node` to the children
    ///
    /// With `notify`, an `ADDED` update propagates from `node` through this
    /// group to its ancestors.
    pub fn add_child(&self, node: SgNodePtr, notify: bool) {
        log::debug!("Adding {} to group {}", node.id(), self.id());
        self.children.borrow_mut().push(Rc::clone(&node));
        self.invalidate_bounding_box();
        if notify {
            node.add_owner_with_update(self, &mut SgUpdate::new(UpdateAction::ADDED));
        } else {
            node.add_owner(self);
        }
    }

    /// Remove every occurrence of `node`, returning whether any was found
    ///
    /// With `notify`, `node` issues a `REMOVED` update for each occurrence
    /// before the owner link is dropped, so every owner of `node` hears it.
    pub fn remove_child(&self, node: &dyn SgNode, notify: bool) -> bool {
        let id = node.id();
        let mut removed = false;
        loop {
            let index = self.children.borrow().iter().position(|c| c.id() == id);
            match index {
                Some(index) => {
                    self.remove_index(index, notify);
                    removed = true;
                }
                None => break,
            }
        }
        removed
    }

    /// Remove the child at `index` and return it
    pub fn remove_child_at(&self, index: usize, notify: bool) -> SceneResult<SgNodePtr> {
        let len = self.num_children();
        if index >= len {
            return Err(SceneError::ChildIndexOutOfRange { index, len });
        }
        Ok(self.remove_index(index, notify))
    }

    /// Remove all children
    ///
    /// With `notify`, every child issues a `REMOVED` update before the owner
    /// links are dropped.
    pub fn clear_children(&self, notify: bool) {
        if self.is_empty() {
            return;
        }
        if notify {
            for child in self.children() {
                child.notify_update(UpdateAction::REMOVED);
            }
        }
        let children = self.children.take();
        log::debug!("Clearing {} children of group {}", children.len(), self.id());
        for child in &children {
            child.remove_owner(self);
        }
        self.invalidate_bounding_box();
    }

    fn remove_index(&self, index: usize, notify: bool) -> SgNodePtr {
        let node = Rc::clone(&self.children.borrow()[index]);
        let id = node.id();
        log::debug!("Removing {} from group {}", id, self.id());
        if notify {
            node.notify_update(UpdateAction::REMOVED);
        }
        // Observers of the update may have edited the list
        let removed = {
            let mut children = self.children.borrow_mut();
            let index = if children.get(index).map(|c| c.id()) == Some(id) {
                Some(index)
            } else {
                children.iter().position(|c| c.id() == id)
            };
            index.map(|index| children.remove(index)).is_some()
        };
        if removed {
            node.remove_owner(self);
        }
        self.invalidate_bounding_box();
        node
    }

    /// Drop the cached bounding box
    pub fn invalidate_bounding_box(&self) {
        self.bounds.set(None);
    }

    /// Whether the bounding box is currently cached
    pub fn is_bounding_box_cached(&self) -> bool {
        self.bounds.get().is_some()
    }

    /// Union of the children's bounding boxes, ignoring the cache
    pub fn children_bounding_box(&self) -> BoundingBox {
        self.children()
            .iter()
            .fold(BoundingBox::empty(), |acc, child| acc.union(&child.bounding_box()))
    }

    pub(crate) fn cached_bounds(&self) -> Option<BoundsCache> {
        self.bounds.get()
    }

    pub(crate) fn set_cached_bounds(&self, bounds: Option<BoundsCache>) {
        self.bounds.set(bounds);
    }

    /// Clone every child through `map` and append the clones to `target`
    pub(crate) fn clone_children_into(&self, target: &SgGroup, map: &mut SgCloneMap) -> SceneResult<()> {
        for child in self.children() {
            let clone = map.find_or_create_node_clone(&child)?;
            target.add_child(clone, false);
        }
        Ok(())
    }
}

impl SgObject for SgGroup {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        self.children().into_iter().map(|c| c.into_object()).collect()
    }

    fn transfer_update(&self, update: &mut SgUpdate) {
        self.invalidate_bounding_box();
        propagate_update(&self.core, update);
    }
}

impl SgNode for SgGroup {
    fn kind(&self) -> NodeKind {
        self.kind.node_kind()
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        match self.kind {
            GroupKind::Plain => visitor.visit_group(self),
            GroupKind::Invariant => visitor.visit_invariant_group(self),
            GroupKind::Unpickable => visitor.visit_unpickable_group(self),
            GroupKind::Overlay => visitor.visit_overlay(self),
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        if self.kind == GroupKind::Overlay {
            return BoundingBox::empty();
        }
        if let Some(cached) = self.bounds.get() {
            return cached.transformed;
        }
        let bbox = self.children_bounding_box();
        self.bounds.set(Some(BoundsCache {
            untransformed: bbox,
            transformed: bbox,
        }));
        bbox
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
        Some(self)
    }
}

impl CloneObject for SgGroup {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Rc::new_cyclic(|weak: &Weak<SgGroup>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgGroup::from_parts(ObjectCore::cloned_from(this, &self.core), self.kind)
        });
        self.clone_children_into(&clone, map)?;
        clone.bounds.set(self.bounds.get());
        Ok(clone)
    }
}

impl Drop for SgGroup {
    fn drop(&mut self) {
        let children = self.children.take();
        for child in &children {
            child.remove_owner(&*self);
        }
    }
}

impl std::fmt::Debug for SgGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SgGroup")
            .field("core", &self.core)
            .field("kind", &self.kind)
            .field("children", &self.num_children())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vector3;
    use crate::geometry::MeshGenerator;
    use crate::scene::shape::SgShape;
    use std::cell::Cell;

    fn box_shape(size: f64) -> Rc<SgShape> {
        let shape = SgShape::new();
        let mesh = MeshGenerator::new().generate_box(Vector3::new(size, size, size));
        shape.set_mesh(mesh);
        shape
    }

    #[test]
    fn test_add_child_links_both_directions() {
        let group = SgGroup::new();
        let shape = box_shape(1.0);

        group.add_child(shape.clone(), false);

        assert!(group.contains(&*shape));
        assert!(shape.has_owner(&*group));
        assert_eq!(group.num_children(), 1);
    }

    #[test]
    fn test_duplicate_children_are_counted() {
        let group = SgGroup::new();
        let shape = box_shape(1.0);

        group.add_child(shape.clone(), false);
        group.add_child(shape.clone(), false);
        assert_eq!(shape.owner_multiplicity(&*group), 2);

        assert!(group.remove_child(&*shape, false));
        assert_eq!(group.num_children(), 0);
        assert_eq!(shape.owner_count(), 0);
        assert!(!group.remove_child(&*shape, false));
    }

    #[test]
    fn test_remove_child_at_out_of_range() {
        let group = SgGroup::new();
        group.add_child(box_shape(1.0), false);

        let err = group.remove_child_at(3, false).err();
        assert_eq!(err, Some(SceneError::ChildIndexOutOfRange { index: 3, len: 1 }));
        assert!(group.remove_child_at(0, false).is_ok());
    }

    #[test]
    fn test_remove_notifies_before_unlinking() {
        let group = SgGroup::new();
        let shape = box_shape(1.0);
        group.add_child(shape.clone(), false);

        let linked_during_notify = Rc::new(Cell::new(false));
        let flag = Rc::clone(&linked_during_notify);
        let weak_shape = Rc::downgrade(&shape);
        let group_id = group.id();
        group.connect_updated(Box::new(move |update| {
            if update.action().contains(UpdateAction::REMOVED) {
                if let Some(shape) = weak_shape.upgrade() {
                    flag.set(shape.owners().iter().any(|o| o.id() == group_id));
                }
            }
        }));

        group.remove_child(&*shape, true);

        assert!(linked_during_notify.get());
        assert!(!shape.has_owner(&*group));
    }

    #[test]
    fn test_removed_update_starts_at_the_child() {
        let a = SgGroup::new();
        let b = SgGroup::new();
        let shape = box_shape(1.0);
        a.add_child(shape.clone(), false);
        b.add_child(shape.clone(), false);

        let child_actions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&child_actions);
        shape.connect_updated(Box::new(move |update: &SgUpdate| sink.borrow_mut().push(update.action())));
        let sibling_paths = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sibling_paths);
        b.connect_updated(Box::new(move |update: &SgUpdate| sink.borrow_mut().push(update.path().to_vec())));

        let g = SgGroup::new();
        g.add_child(shape.clone(), true);
        assert!(a.remove_child(&*shape, true));

        assert_eq!(*child_actions.borrow(), vec![UpdateAction::ADDED, UpdateAction::REMOVED]);
        // The other owner hears both structural changes through the child
        assert_eq!(*sibling_paths.borrow(), vec![vec![shape.id(), b.id()], vec![shape.id(), b.id()]]);
    }

    #[test]
    fn test_clear_children_notifies_each_child() {
        let group = SgGroup::new();
        let a = box_shape(1.0);
        let b = box_shape(2.0);
        group.add_child(a.clone(), false);
        group.add_child(b.clone(), false);

        let paths = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&paths);
        group.connect_updated(Box::new(move |update: &SgUpdate| {
            assert_eq!(update.action(), UpdateAction::REMOVED);
            sink.borrow_mut().push(update.path().to_vec());
        }));

        group.clear_children(true);

        assert_eq!(*paths.borrow(), vec![vec![a.id(), group.id()], vec![b.id(), group.id()]]);
        assert!(group.is_empty());
    }

    #[test]
    fn test_clear_children_releases_owner_links() {
        let group = SgGroup::new();
        let a = box_shape(1.0);
        let b = box_shape(2.0);
        group.add_child(a.clone(), false);
        group.add_child(b.clone(), false);

        group.clear_children(true);

        assert!(group.is_empty());
        assert_eq!(a.owner_count(), 0);
        assert_eq!(b.owner_count(), 0);
    }

    #[test]
    fn test_drop_releases_owner_links() {
        let shape = box_shape(1.0);
        {
            let group = SgGroup::new();
            group.add_child(shape.clone(), false);
            assert_eq!(shape.owner_count(), 1);
        }
        assert_eq!(shape.owner_count(), 0);
    }

    #[test]
    fn test_bounding_box_cache_lifecycle() {
        let group = SgGroup::new();
        group.add_child(box_shape(2.0), false);
        assert!(!group.is_bounding_box_cached());

        let bbox = group.bounding_box();
        assert!(group.is_bounding_box_cached());
        assert_eq!(bbox.max, Vector3::new(1.0, 1.0, 1.0));

        group.add_child(box_shape(4.0), false);
        assert!(!group.is_bounding_box_cached());
        assert_eq!(group.bounding_box().max, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_overlay_has_empty_bounding_box() {
        let overlay = SgGroup::new_overlay();
        overlay.add_child(box_shape(2.0), false);
        assert!(overlay.bounding_box().is_empty());

        let root = SgGroup::new();
        root.add_child(overlay, false);
        root.add_child(box_shape(1.0), false);
        assert_eq!(root.bounding_box().max, Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(SgGroup::new().kind(), NodeKind::Group);
        assert_eq!(SgGroup::new_invariant().kind(), NodeKind::InvariantGroup);
        assert_eq!(SgGroup::new_unpickable().kind(), NodeKind::UnpickableGroup);
        assert_eq!(SgGroup::new_overlay().kind(), NodeKind::Overlay);
    }
}
