//! Images, texture transforms and textures

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use image::{DynamicImage, GenericImageView};

use crate::error::{SceneError, SceneResult};
use crate::foundation::math::Vector2;

use super::clone_map::{CloneObject, SgCloneMap};
use super::object::{ObjectCore, OwnedSlot, SgObject, SgObjectPtr};

/// Pixel data referenced by textures
///
/// The pixel store is shared between an image and its clones; the first edit
/// through an image whose store has other holders copies it.
pub struct SgImage {
    core: ObjectCore,
    image: RefCell<Rc<DynamicImage>>,
}

impl SgImage {
    /// Create an empty image
    pub fn new() -> Rc<Self> {
        Self::from_image(DynamicImage::new_rgb8(0, 0))
    }

    /// Create an image holding `image`
    pub fn from_image(image: DynamicImage) -> Rc<Self> {
        Self::from_store(Rc::new(image), None)
    }

    fn from_store(store: Rc<DynamicImage>, original: Option<&ObjectCore>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgImage>| {
            let this: Weak<dyn SgObject> = weak.clone();
            let core = match original {
                Some(original) => ObjectCore::cloned_from(this, original),
                None => ObjectCore::new(this),
            };
            SgImage {
                core,
                image: RefCell::new(store),
            }
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.borrow().dimensions().0
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.borrow().dimensions().1
    }

    /// Number of channels per pixel
    pub fn num_components(&self) -> u32 {
        u32::from(self.image.borrow().color().channel_count())
    }

    /// Whether the image holds no pixel
    pub fn is_empty(&self) -> bool {
        let (width, height) = self.image.borrow().dimensions();
        width == 0 || height == 0
    }

    /// Replace the pixels with a zeroed 8-bit image
    ///
    /// `components` selects luma (1), luma + alpha (2), RGB (3) or RGBA (4).
    pub fn set_size(&self, width: u32, height: u32, components: u32) -> SceneResult<()> {
        let image = match components {
            1 => DynamicImage::new_luma8(width, height),
            2 => DynamicImage::new_luma_a8(width, height),
            3 => DynamicImage::new_rgb8(width, height),
            4 => DynamicImage::new_rgba8(width, height),
            _ => return Err(SceneError::InvalidImageComponents(components)),
        };
        *self.image.borrow_mut() = Rc::new(image);
        Ok(())
    }

    /// Handle to the current pixel store
    pub fn image(&self) -> Rc<DynamicImage> {
        Rc::clone(&self.image.borrow())
    }

    /// Raw pixel bytes
    pub fn with_pixels<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(self.image.borrow().as_bytes())
    }

    /// Edit the image in place, copying a shared store first
    pub fn with_image_mut<R>(&self, f: impl FnOnce(&mut DynamicImage) -> R) -> R {
        let mut image = self.image.borrow_mut();
        f(Rc::make_mut(&mut image))
    }

    /// Edit raw 8-bit pixel bytes in place, copying a shared store first
    ///
    /// Returns `None` for images that are not stored as 8-bit channels.
    pub fn with_pixels_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        self.with_image_mut(|image| match image {
            DynamicImage::ImageLuma8(buffer) => Some(f(&mut **buffer)),
            DynamicImage::ImageLumaA8(buffer) => Some(f(&mut **buffer)),
            DynamicImage::ImageRgb8(buffer) => Some(f(&mut **buffer)),
            DynamicImage::ImageRgba8(buffer) => Some(f(&mut **buffer)),
            _ => None,
        })
    }

    /// Whether the pixel store is shared with another image or handle
    pub fn is_storage_shared(&self) -> bool {
        Rc::strong_count(&self.image.borrow()) > 1
    }
}

impl SgObject for SgImage {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl CloneObject for SgImage {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        Ok(Self::from_store(self.image(), Some(&self.core)))
    }
}

/// 2D transform applied to texture coordinates
pub struct SgTextureTransform {
    core: ObjectCore,
    center: Cell<Vector2>,
    rotation: Cell<f64>,
    scale: Cell<Vector2>,
    translation: Cell<Vector2>,
}

impl SgTextureTransform {
    /// Create an identity texture transform
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgTextureTransform>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgTextureTransform {
                core: ObjectCore::new(this),
                center: Cell::new(Vector2::zeros()),
                rotation: Cell::new(0.0),
                scale: Cell::new(Vector2::new(1.0, 1.0)),
                translation: Cell::new(Vector2::zeros()),
            }
        })
    }

    /// Center of rotation and scaling
    pub fn center(&self) -> Vector2 {
        self.center.get()
    }

    /// Set the center of rotation and scaling
    pub fn set_center(&self, center: Vector2) {
        self.center.set(center);
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f64 {
        self.rotation.get()
    }

    /// Set the rotation in radians
    pub fn set_rotation(&self, rotation: f64) {
        self.rotation.set(rotation);
    }

    /// Scale factors
    pub fn scale(&self) -> Vector2 {
        self.scale.get()
    }

    /// Set the scale factors
    pub fn set_scale(&self, scale: Vector2) {
        self.scale.set(scale);
    }

    /// Translation
    pub fn translation(&self) -> Vector2 {
        self.translation.get()
    }

    /// Set the translation
    pub fn set_translation(&self, translation: Vector2) {
        self.translation.set(translation);
    }
}

impl SgObject for SgTextureTransform {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl CloneObject for SgTextureTransform {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        Ok(Rc::new_cyclic(|weak: &Weak<SgTextureTransform>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgTextureTransform {
                core: ObjectCore::cloned_from(this, &self.core),
                center: self.center.clone(),
                rotation: self.rotation.clone(),
                scale: self.scale.clone(),
                translation: self.translation.clone(),
            }
        }))
    }
}

/// Image plus sampling parameters
pub struct SgTexture {
    core: ObjectCore,
    image: OwnedSlot<SgImage>,
    texture_transform: OwnedSlot<SgTextureTransform>,
    repeat_s: Cell<bool>,
    repeat_t: Cell<bool>,
}

impl SgTexture {
    /// Create a texture without image, repeating in both directions
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgTexture>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgTexture {
                core: ObjectCore::new(this),
                image: OwnedSlot::new(),
                texture_transform: OwnedSlot::new(),
                repeat_s: Cell::new(true),
                repeat_t: Cell::new(true),
            }
        })
    }

    /// Referenced image
    pub fn image(&self) -> Option<Rc<SgImage>> {
        self.image.get()
    }

    /// Replace the referenced image
    pub fn set_image(&self, image: Option<Rc<SgImage>>) {
        self.image.set(self, image);
    }

    /// Referenced image, creating an empty one if needed
    pub fn get_or_create_image(&self) -> Rc<SgImage> {
        self.image.get_or_create(self, SgImage::new)
    }

    /// Referenced texture transform
    pub fn texture_transform(&self) -> Option<Rc<SgTextureTransform>> {
        self.texture_transform.get()
    }

    /// Replace the referenced texture transform
    pub fn set_texture_transform(&self, transform: Option<Rc<SgTextureTransform>>) {
        self.texture_transform.set(self, transform);
    }

    /// Whether the texture repeats along S
    pub fn repeat_s(&self) -> bool {
        self.repeat_s.get()
    }

    /// Whether the texture repeats along T
    pub fn repeat_t(&self) -> bool {
        self.repeat_t.get()
    }

    /// Set the repeat flags
    pub fn set_repeat(&self, repeat_s: bool, repeat_t: bool) {
        self.repeat_s.set(repeat_s);
        self.repeat_t.set(repeat_t);
    }
}

impl SgObject for SgTexture {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn elements(&self) -> Vec<SgObjectPtr> {
        let mut elements = Vec::new();
        self.image.push_element(&mut elements);
        self.texture_transform.push_element(&mut elements);
        elements
    }
}

impl CloneObject for SgTexture {
    fn clone_object(&self, map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let image = map.clone_optional(self.image.get())?;
        let texture_transform = map.clone_optional(self.texture_transform.get())?;
        let clone = Rc::new_cyclic(|weak: &Weak<SgTexture>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgTexture {
                core: ObjectCore::cloned_from(this, &self.core),
                image: OwnedSlot::new(),
                texture_transform: OwnedSlot::new(),
                repeat_s: self.repeat_s.clone(),
                repeat_t: self.repeat_t.clone(),
            }
        });
        clone.set_image(image);
        clone.set_texture_transform(texture_transform);
        Ok(clone)
    }
}

impl Drop for SgTexture {
    fn drop(&mut self) {
        self.image.release(&*self);
        self.texture_transform.release(&*self);
    }
}
