//! Structure-preserving deep cloning
//!
//! A [`SgCloneMap`] lives for one cloning operation. Every object reached
//! through the same map is cloned exactly once, so an object shared by two
//! owners in the original graph is shared by the two cloned owners too.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::config::CloneConfig;
use crate::error::{SceneError, SceneResult};

use super::node::SgNodePtr;
use super::object::{ObjectId, SgObject};

/// Objects that can be cloned through a [`SgCloneMap`]
pub trait CloneObject: SgObject + Sized {
    /// Build a clone of this object
    ///
    /// Referenced objects are obtained through `map` so that sharing is
    /// preserved. Do not call this directly; use
    /// [`SgCloneMap::find_or_create_clone`].
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>>;
}

/// Original-to-clone dictionary for a single cloning operation
#[derive(Clone)]
pub struct SgCloneMap {
    clones: HashMap<ObjectId, Rc<dyn Any>>,
    in_progress: HashSet<ObjectId>,
    non_node_cloning: bool,
}

impl SgCloneMap {
    /// Create an empty map with payload cloning enabled
    pub fn new() -> Self {
        Self {
            clones: HashMap::new(),
            in_progress: HashSet::new(),
            non_node_cloning: true,
        }
    }

    /// Create an empty map configured from `config`
    pub fn from_config(config: &CloneConfig) -> Self {
        let mut map = Self::new();
        map.set_non_node_cloning(config.non_node_cloning);
        map
    }

    /// Choose whether payload objects are cloned or shared with the original
    ///
    /// Nodes are always cloned.
    pub fn set_non_node_cloning(&mut self, enabled: bool) {
        self.non_node_cloning = enabled;
    }

    /// Whether payload objects are cloned
    pub fn is_non_node_cloning_enabled(&self) -> bool {
        self.non_node_cloning
    }

    /// Forget every recorded clone
    pub fn clear(&mut self) {
        self.clones.clear();
        self.in_progress.clear();
    }

    /// Number of recorded clones
    pub fn len(&self) -> usize {
        self.clones.len()
    }

    /// Whether no clone has been recorded
    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    /// Whether a clone of `original` has been recorded
    pub fn contains(&self, original: &dyn SgObject) -> bool {
        self.clones.contains_key(&original.id())
    }

    /// Recorded clone of `original`, if any
    pub fn find_clone<T: SgObject>(&self, original: &T) -> Option<Rc<T>> {
        let found = self.clones.get(&original.id())?;
        match Rc::clone(found).downcast::<T>() {
            Ok(clone) => Some(clone),
            Err(_) => {
                log::error!("Clone of {} has an unexpected type", original.id());
                None
            }
        }
    }

    /// Recorded clone of `original`, cloning it first if necessary
    ///
    /// Returns [`SceneError::CyclicGraph`] when `original` is reached again
    /// while its own clone is still being built.
    pub fn find_or_create_clone<T: CloneObject>(&mut self, original: &Rc<T>) -> SceneResult<Rc<T>> {
        if let Some(clone) = self.find_clone(&**original) {
            return Ok(clone);
        }
        let id = original.id();
        if !self.in_progress.insert(id) {
            log::error!("Cycle through object {} while cloning", id);
            return Err(SceneError::CyclicGraph(id));
        }
        let result = original.clone_object(self);
        self.in_progress.remove(&id);
        let clone = result?;
        log::debug!("Cloned object {} as {}", id, clone.id());
        self.clones.insert(id, Rc::clone(&clone) as Rc<dyn Any>);
        Ok(clone)
    }

    /// Clone a node of any kind through this map
    pub fn find_or_create_node_clone(&mut self, original: &SgNodePtr) -> SceneResult<SgNodePtr> {
        Rc::clone(original).clone_node(self)
    }

    /// Clone or share a payload reference depending on the cloning mode
    pub(crate) fn clone_payload<T: CloneObject>(&mut self, original: &Rc<T>) -> SceneResult<Rc<T>> {
        if self.non_node_cloning {
            self.find_or_create_clone(original)
        } else {
            Ok(Rc::clone(original))
        }
    }

    /// [`clone_payload`](Self::clone_payload) for an optional reference
    pub(crate) fn clone_optional<T: CloneObject>(&mut self, original: Option<Rc<T>>) -> SceneResult<Option<Rc<T>>> {
        original.map(|o| self.clone_payload(&o)).transpose()
    }
}

impl Default for SgCloneMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SgCloneMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SgCloneMap")
            .field("clones", &self.clones.len())
            .field("non_node_cloning", &self.non_node_cloning)
            .finish()
    }
}
