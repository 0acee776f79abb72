//! Surface material referenced by shapes and plots

use std::any::Any;
use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;
use crate::foundation::math::Vector3f;

use super::clone_map::{CloneObject, SgCloneMap};
use super::object::{ObjectCore, SgObject};

/// Material properties for shading
///
/// Scalar factors are clamped to `[0, 1]` by their setters.
pub struct SgMaterial {
    core: ObjectCore,
    ambient_intensity: Cell<f32>,
    diffuse_color: Cell<Vector3f>,
    emissive_color: Cell<Vector3f>,
    specular_color: Cell<Vector3f>,
    shininess: Cell<f32>,
    transparency: Cell<f32>,
}

impl SgMaterial {
    /// Create a material with default properties
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgMaterial>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgMaterial {
                core: ObjectCore::new(this),
                ambient_intensity: Cell::new(0.02),
                diffuse_color: Cell::new(Vector3f::new(0.8, 0.8, 0.8)),
                emissive_color: Cell::new(Vector3f::zeros()),
                specular_color: Cell::new(Vector3f::zeros()),
                shininess: Cell::new(0.2),
                transparency: Cell::new(0.0),
            }
        })
    }

    /// Ambient reflection factor
    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity.get()
    }

    /// Set the ambient reflection factor
    pub fn set_ambient_intensity(&self, intensity: f32) {
        self.ambient_intensity.set(intensity.clamp(0.0, 1.0));
    }

    /// Diffuse color (RGB)
    pub fn diffuse_color(&self) -> Vector3f {
        self.diffuse_color.get()
    }

    /// Set the diffuse color
    pub fn set_diffuse_color(&self, color: Vector3f) {
        self.diffuse_color.set(color);
    }

    /// Emissive color (RGB)
    pub fn emissive_color(&self) -> Vector3f {
        self.emissive_color.get()
    }

    /// Set the emissive color
    pub fn set_emissive_color(&self, color: Vector3f) {
        self.emissive_color.set(color);
    }

    /// Specular color (RGB)
    pub fn specular_color(&self) -> Vector3f {
        self.specular_color.get()
    }

    /// Set the specular color
    pub fn set_specular_color(&self, color: Vector3f) {
        self.specular_color.set(color);
    }

    /// Shininess (0.0 = dull, 1.0 = sharp highlight)
    pub fn shininess(&self) -> f32 {
        self.shininess.get()
    }

    /// Set the shininess
    pub fn set_shininess(&self, shininess: f32) {
        self.shininess.set(shininess.clamp(0.0, 1.0));
    }

    /// Transparency (0.0 = opaque, 1.0 = invisible)
    pub fn transparency(&self) -> f32 {
        self.transparency.get()
    }

    /// Set the transparency
    pub fn set_transparency(&self, transparency: f32) {
        self.transparency.set(transparency.clamp(0.0, 1.0));
    }
}

impl SgObject for SgMaterial {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl CloneObject for SgMaterial {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        Ok(Rc::new_cyclic(|weak: &Weak<SgMaterial>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgMaterial {
                core: ObjectCore::cloned_from(this, &self.core),
                ambient_intensity: self.ambient_intensity.clone(),
                diffuse_color: self.diffuse_color.clone(),
                emissive_color: self.emissive_color.clone(),
                specular_color: self.specular_color.clone(),
                shininess: self.shininess.clone(),
                transparency: self.transparency.clone(),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let material = SgMaterial::new();
        assert_relative_eq!(material.ambient_intensity(), 0.02);
        assert_relative_eq!(material.diffuse_color(), Vector3f::new(0.8, 0.8, 0.8));
        assert_relative_eq!(material.emissive_color(), Vector3f::zeros());
        assert_relative_eq!(material.specular_color(), Vector3f::zeros());
        assert_relative_eq!(material.shininess(), 0.2);
        assert_relative_eq!(material.transparency(), 0.0);
    }

    #[test]
    fn test_setters_clamp() {
        let material = SgMaterial::new();
        material.set_transparency(1.5);
        material.set_shininess(-0.5);
        assert_relative_eq!(material.transparency(), 1.0);
        assert_relative_eq!(material.shininess(), 0.0);
    }

    #[test]
    fn test_clone_copies_values() {
        let material = SgMaterial::new();
        material.set_name("steel");
        material.set_diffuse_color(Vector3f::new(0.1, 0.2, 0.3));

        let clone = SgCloneMap::new().find_or_create_clone(&material).unwrap();
        material.set_diffuse_color(Vector3f::new(1.0, 1.0, 1.0));

        assert_eq!(clone.name().as_str(), "steel");
        assert_relative_eq!(clone.diffuse_color(), Vector3f::new(0.1, 0.2, 0.3));
    }
}
