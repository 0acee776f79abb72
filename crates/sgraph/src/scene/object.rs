//! Scene objects: identity, owner back-references and notifications
//!
//! Every object in the graph lives in an [`Rc`]. Owners hold strong
//! references to what they own, and each owned object keeps a multiset of
//! weak back-references to its owners. Updates travel upward along those
//! back-references; nothing downstream extends an owner's lifetime.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::signal::{Connection, Signal};

use super::update::{SgUpdate, UpdateAction};

/// Process-unique identity of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of the id
    pub fn raw(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared pointer to any scene object
pub type SgObjectPtr = Rc<dyn SgObject>;

/// State common to every scene object
pub struct ObjectCore {
    id: ObjectId,
    name: RefCell<String>,
    this: Weak<dyn SgObject>,
    owners: RefCell<Vec<(ObjectId, Weak<dyn SgObject>)>>,
    sig_updated: Signal<SgUpdate>,
    sig_graph_connection: Signal<bool>,
}

impl ObjectCore {
    /// Create the core for the object that `this` will point to
    ///
    /// Call this inside [`Rc::new_cyclic`] so that `this` refers to the
    /// allocation being constructed.
    pub fn new(this: Weak<dyn SgObject>) -> Self {
        Self::with_name(this, String::new())
    }

    /// Create a core with an initial name
    pub fn with_name(this: Weak<dyn SgObject>, name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            name: RefCell::new(name.into()),
            this,
            owners: RefCell::new(Vec::new()),
            sig_updated: Signal::new(),
            sig_graph_connection: Signal::new(),
        }
    }

    /// Create a core for a clone of `original`
    ///
    /// The clone gets a fresh id and a copy of the name. Owners and signal
    /// connections are not copied.
    pub fn cloned_from(this: Weak<dyn SgObject>, original: &ObjectCore) -> Self {
        Self::with_name(this, original.name.borrow().clone())
    }

    fn live_owners(&self) -> Vec<SgObjectPtr> {
        self.owners.borrow().iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    }
}

impl fmt::Debug for ObjectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCore")
            .field("id", &self.id)
            .field("name", &*self.name.borrow())
            .field("owners", &self.owners.borrow().len())
            .finish()
    }
}

/// Pass `update` from the object owning `core` up through all of its owners
///
/// Emits the object's "updated" signal, then recurses depth-first into every
/// live owner. An object reachable along several paths is visited once per
/// path.
pub fn propagate_update(core: &ObjectCore, update: &mut SgUpdate) {
    update.push(core.id);
    log::trace!("Update {:?} reached {}", update.action(), core.id);
    core.sig_updated.emit(update);
    for owner in core.live_owners() {
        owner.transfer_update(update);
    }
    update.pop();
}

/// Base behavior of everything that can live in a scene graph
pub trait SgObject: Any {
    /// Shared object state
    fn core(&self) -> &ObjectCore;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Objects directly referenced by this one
    fn elements(&self) -> Vec<SgObjectPtr> {
        Vec::new()
    }

    /// Receive an update from this object or one of its elements
    ///
    /// Types that cache derived data override this to invalidate the cache
    /// before calling [`propagate_update`].
    fn transfer_update(&self, update: &mut SgUpdate) {
        propagate_update(self.core(), update);
    }

    /// Identity of this object
    fn id(&self) -> ObjectId {
        self.core().id
    }

    /// Object name
    fn name(&self) -> Ref<'_, String> {
        self.core().name.borrow()
    }

    /// Rename the object
    fn set_name(&self, name: &str) {
        *self.core().name.borrow_mut() = name.to_string();
    }

    /// Strong pointer to this object, if it is still alive
    fn self_ptr(&self) -> Option<SgObjectPtr> {
        self.core().this.upgrade()
    }

    /// Start an update of the given kind at this object
    fn notify_update(&self, action: UpdateAction) {
        let mut update = SgUpdate::new(action);
        self.transfer_update(&mut update);
    }

    /// Start a caller-provided update at this object
    ///
    /// Any path left over from a previous use of `update` is discarded.
    fn notify_update_with(&self, update: &mut SgUpdate) {
        update.clear_path();
        self.transfer_update(update);
    }

    /// Register `owner` as an owner of this object
    ///
    /// The connectivity signal fires with `true` when this is the first owner.
    fn add_owner(&self, owner: &dyn SgObject) {
        let core = self.core();
        let first = {
            let mut owners = core.owners.borrow_mut();
            owners.push((owner.id(), owner.core().this.clone()));
            owners.len() == 1
        };
        if first {
            core.sig_graph_connection.emit(&true);
        }
    }

    /// Register `owner`, then propagate `update` from this object
    ///
    /// The connectivity signal fires after the update has propagated.
    fn add_owner_with_update(&self, owner: &dyn SgObject, update: &mut SgUpdate) {
        let core = self.core();
        let first = {
            let mut owners = core.owners.borrow_mut();
            owners.push((owner.id(), owner.core().this.clone()));
            owners.len() == 1
        };
        update.clear_path();
        self.transfer_update(update);
        if first {
            core.sig_graph_connection.emit(&true);
        }
    }

    /// Remove one occurrence of `owner` from this object's owners
    ///
    /// The connectivity signal fires with `false` when no owner remains.
    fn remove_owner(&self, owner: &dyn SgObject) {
        let core = self.core();
        let owner_id = owner.id();
        let now_empty = {
            let mut owners = core.owners.borrow_mut();
            match owners.iter().position(|(id, _)| *id == owner_id) {
                Some(index) => {
                    owners.remove(index);
                    Some(owners.is_empty())
                }
                None => None,
            }
        };
        match now_empty {
            Some(true) => core.sig_graph_connection.emit(&false),
            Some(false) => {}
            None => {
                log::error!("Object {} is not an owner of {}", owner_id, core.id);
                debug_assert!(false, "removed an owner that was never added");
            }
        }
    }

    /// Live owners of this object, one entry per ownership edge
    fn owners(&self) -> Vec<SgObjectPtr> {
        self.core().live_owners()
    }

    /// Number of ownership edges pointing at this object
    fn owner_count(&self) -> usize {
        self.core().owners.borrow().len()
    }

    /// Whether `owner` holds at least one edge to this object
    fn has_owner(&self, owner: &dyn SgObject) -> bool {
        let owner_id = owner.id();
        self.core().owners.borrow().iter().any(|(id, _)| *id == owner_id)
    }

    /// Number of edges from `owner` to this object
    fn owner_multiplicity(&self, owner: &dyn SgObject) -> usize {
        let owner_id = owner.id();
        self.core().owners.borrow().iter().filter(|(id, _)| *id == owner_id).count()
    }

    /// Whether this object currently has any owner
    fn is_connected_to_graph(&self) -> bool {
        self.owner_count() > 0
    }

    /// Observe updates passing through this object
    fn connect_updated(&self, handler: Box<dyn FnMut(&SgUpdate)>) -> Connection {
        self.core().sig_updated.connect(handler)
    }

    /// Stop observing updates
    fn disconnect_updated(&self, connection: Connection) -> bool {
        self.core().sig_updated.disconnect(connection)
    }

    /// Observe transitions between having no owner and having some owner
    fn connect_graph_connection(&self, handler: Box<dyn FnMut(&bool)>) -> Connection {
        self.core().sig_graph_connection.connect(handler)
    }

    /// Stop observing connectivity changes
    fn disconnect_graph_connection(&self, connection: Connection) -> bool {
        self.core().sig_graph_connection.disconnect(connection)
    }
}

impl fmt::Debug for dyn SgObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core().fmt(f)
    }
}

/// Optional owned reference from one object to another
///
/// Setting the slot keeps the owner registration of the referenced object in
/// step with the reference itself.
pub struct OwnedSlot<T: SgObject> {
    value: RefCell<Option<Rc<T>>>,
}

impl<T: SgObject> OwnedSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self { value: RefCell::new(None) }
    }

    /// Current value
    pub fn get(&self) -> Option<Rc<T>> {
        self.value.borrow().clone()
    }

    /// Whether the slot holds a value
    pub fn is_set(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Replace the value, moving the owner registration of `owner`
    pub fn set(&self, owner: &dyn SgObject, value: Option<Rc<T>>) {
        let unchanged = match (&*self.value.borrow(), &value) {
            (Some(old), Some(new)) => Rc::ptr_eq(old, new),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        if let Some(new) = &value {
            new.add_owner(owner);
        }
        let old = self.value.replace(value);
        if let Some(old) = old {
            old.remove_owner(owner);
        }
    }

    /// Current value, creating it with `create` if the slot is empty
    pub fn get_or_create(&self, owner: &dyn SgObject, create: impl FnOnce() -> Rc<T>) -> Rc<T> {
        if let Some(value) = self.get() {
            return value;
        }
        let value = create();
        self.set(owner, Some(Rc::clone(&value)));
        value
    }

    /// Drop the value and the owner registration of `owner`
    pub fn release(&self, owner: &dyn SgObject) {
        if let Some(old) = self.value.borrow_mut().take() {
            old.remove_owner(owner);
        }
    }

    /// Append the value to an element list
    pub(crate) fn push_element(&self, elements: &mut Vec<SgObjectPtr>) {
        if let Some(value) = self.get() {
            elements.push(value);
        }
    }
}

impl<T: SgObject> Default for OwnedSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SgObject> fmt::Debug for OwnedSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.value.borrow() {
            Some(value) => write!(f, "OwnedSlot({})", value.id()),
            None => f.write_str("OwnedSlot(None)"),
        }
    }
}
