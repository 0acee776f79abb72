//! Copy-on-write vector arrays referenced by meshes and plots
//!
//! Clones of an array share its storage. The first in-place edit through a
//! handle whose storage has other holders makes a private copy first.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;
use crate::foundation::math::{Vector2f, Vector3f};

use super::clone_map::{CloneObject, SgCloneMap};
use super::object::{ObjectCore, SgObject};

/// Shared, owner-counted array of values
pub struct SgVectorArray<T: Clone + 'static> {
    core: ObjectCore,
    data: RefCell<Rc<Vec<T>>>,
}

/// Vertex positions
pub type SgVertexArray = SgVectorArray<Vector3f>;

/// Vertex normals
pub type SgNormalArray = SgVectorArray<Vector3f>;

/// Vertex colors
pub type SgColorArray = SgVectorArray<Vector3f>;

/// Texture coordinates
pub type SgTexCoordArray = SgVectorArray<Vector2f>;

impl<T: Clone + 'static> SgVectorArray<T> {
    /// Create an empty array
    pub fn new() -> Rc<Self> {
        Self::from_vec(Vec::new())
    }

    /// Create an array holding `values`
    pub fn from_vec(values: Vec<T>) -> Rc<Self> {
        Self::from_storage(Rc::new(values), None)
    }

    fn from_storage(data: Rc<Vec<T>>, original: Option<&ObjectCore>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgVectorArray<T>>| {
            let this: Weak<dyn SgObject> = weak.clone();
            let core = match original {
                Some(original) => ObjectCore::cloned_from(this, original),
                None => ObjectCore::new(this),
            };
            SgVectorArray {
                core,
                data: RefCell::new(data),
            }
        })
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the array holds no value
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Value at `index`
    pub fn get(&self, index: usize) -> Option<T> {
        self.data.borrow().get(index).cloned()
    }

    /// Copy of all values
    pub fn to_vec(&self) -> Vec<T> {
        Vec::clone(&self.data.borrow())
    }

    /// Handle to the current storage
    ///
    /// Holding the handle makes the storage shared, so the next edit copies.
    pub fn storage(&self) -> Rc<Vec<T>> {
        Rc::clone(&self.data.borrow())
    }

    /// Read the values without copying
    pub fn with_data<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.data.borrow())
    }

    /// Edit the values in place, copying shared storage first
    ///
    /// Owners are not notified; call
    /// [`notify_update`](SgObject::notify_update) after editing.
    pub fn modify<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut data = self.data.borrow_mut();
        if Rc::strong_count(&data) > 1 {
            log::trace!("Copying shared storage of array {}", self.id());
        }
        f(Rc::make_mut(&mut data))
    }

    /// Append a value
    pub fn push(&self, value: T) {
        self.modify(|data| data.push(value));
    }

    /// Replace the value at `index`; returns false if out of range
    pub fn set(&self, index: usize, value: T) -> bool {
        if index >= self.len() {
            return false;
        }
        self.modify(|data| data[index] = value);
        true
    }

    /// Replace all values
    pub fn assign(&self, values: Vec<T>) {
        *self.data.borrow_mut() = Rc::new(values);
    }

    /// Remove all values
    pub fn clear(&self) {
        self.assign(Vec::new());
    }

    /// Whether the storage is currently shared with another array or handle
    pub fn is_storage_shared(&self) -> bool {
        Rc::strong_count(&self.data.borrow()) > 1
    }
}

impl<T: Clone + 'static> SgObject for SgVectorArray<T> {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Clone + 'static> CloneObject for SgVectorArray<T> {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        Ok(Self::from_storage(self.storage(), Some(&self.core)))
    }
}

impl<T: Clone + 'static> fmt::Debug for SgVectorArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SgVectorArray")
            .field("core", &self.core)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertices() -> Rc<SgVertexArray> {
        SgVertexArray::from_vec(vec![Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 2.0, 3.0)])
    }

    #[test]
    fn test_basic_access() {
        let array = vertices();
        assert_eq!(array.len(), 2);
        assert_eq!(array.get(1), Some(Vector3f::new(1.0, 2.0, 3.0)));
        assert_eq!(array.get(2), None);
        assert!(!array.set(5, Vector3f::zeros()));
    }

    #[test]
    fn test_clone_shares_until_written() {
        let original = vertices();
        let clone = SgCloneMap::new().find_or_create_clone(&original).unwrap();

        assert_ne!(original.id(), clone.id());
        assert!(original.is_storage_shared());
        assert!(clone.is_storage_shared());

        clone.set(0, Vector3f::new(9.0, 9.0, 9.0));

        assert!(!original.is_storage_shared());
        assert!(!clone.is_storage_shared());
        assert_eq!(original.get(0), Some(Vector3f::zeros()));
        assert_eq!(clone.get(0), Some(Vector3f::new(9.0, 9.0, 9.0)));
    }

    #[test]
    fn test_write_without_sharing_keeps_storage() {
        let array = vertices();
        let before = Rc::as_ptr(&array.storage());
        array.push(Vector3f::new(4.0, 5.0, 6.0));
        let after = Rc::as_ptr(&array.storage());
        assert_eq!(before, after);
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn test_tex_coords() {
        let coords = SgTexCoordArray::from_vec(vec![Vector2f::new(0.5, 1.0)]);
        assert_eq!(coords.to_vec(), vec![Vector2f::new(0.5, 1.0)]);
        coords.clear();
        assert!(coords.is_empty());
    }
}
