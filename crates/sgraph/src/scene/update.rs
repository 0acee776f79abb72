//! Update descriptors carried by upward change notification

use bitflags::bitflags;

use super::object::ObjectId;

bitflags! {
    /// Kinds of change reported by an update
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UpdateAction: u32 {
        /// A child or payload object was attached
        const ADDED = 1 << 0;
        /// A child or payload object was detached
        const REMOVED = 1 << 1;
        /// Values of an object changed in place
        const MODIFIED = 1 << 2;
        /// A bounding box changed without a structural edit
        const BBOX_UPDATED = 1 << 3;
    }
}

/// Update descriptor passed from an object to all of its ancestors
///
/// While an update propagates, `path` holds the ids of the objects it has
/// passed through on the current branch, starting with the object where the
/// change originated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SgUpdate {
    action: UpdateAction,
    path: Vec<ObjectId>,
}

impl SgUpdate {
    /// Create an update with an empty path
    pub fn new(action: UpdateAction) -> Self {
        Self { action, path: Vec::new() }
    }

    /// Reported change kinds
    pub fn action(&self) -> UpdateAction {
        self.action
    }

    /// Replace the reported change kinds
    pub fn set_action(&mut self, action: UpdateAction) {
        self.action = action;
    }

    /// Ids of the objects visited on the current branch, origin first
    pub fn path(&self) -> &[ObjectId] {
        &self.path
    }

    /// Id of the object the update started from
    pub fn origin(&self) -> Option<ObjectId> {
        self.path.first().copied()
    }

    /// Id of the object currently handling the update
    pub fn current(&self) -> Option<ObjectId> {
        self.path.last().copied()
    }

    pub(crate) fn push(&mut self, id: ObjectId) {
        self.path.push(id);
    }

    pub(crate) fn pop(&mut self) {
        self.path.pop();
    }

    pub(crate) fn clear_path(&mut self) {
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_flags_combine() {
        let action = UpdateAction::ADDED | UpdateAction::BBOX_UPDATED;
        assert!(action.contains(UpdateAction::ADDED));
        assert!(!action.contains(UpdateAction::REMOVED));
        assert_eq!(UpdateAction::default(), UpdateAction::empty());
    }

    #[test]
    fn test_path_origin_and_current() {
        let a = ObjectId::from_raw(10);
        let b = ObjectId::from_raw(11);
        let mut update = SgUpdate::new(UpdateAction::MODIFIED);
        assert_eq!(update.origin(), None);

        update.push(a);
        update.push(b);
        assert_eq!(update.origin(), Some(a));
        assert_eq!(update.current(), Some(b));

        update.pop();
        assert_eq!(update.path(), &[a]);
        update.clear_path();
        assert!(update.path().is_empty());
    }
}
