//! Light source nodes

use std::any::Any;
use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::error::SceneResult;
use crate::foundation::math::{constants, Vector3, Vector3f};

use super::clone_map::{CloneObject, SgCloneMap};
use super::node::{NodeKind, SgNode, SgNodePtr};
use super::object::{ObjectCore, SgObject, SgObjectPtr};
use super::visitor::SceneVisitor;

/// Distance attenuation `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f64,
    /// Linear term
    pub linear: f64,
    /// Quadratic term
    pub quadratic: f64,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self { constant: 1.0, linear: 0.0, quadratic: 0.0 }
    }
}

/// Emission model of a light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightType {
    /// Parallel rays along `direction`
    Directional {
        /// Direction the light travels in local coordinates
        direction: Vector3,
    },
    /// Omnidirectional light at the local origin
    Point {
        /// Falloff with distance
        attenuation: Attenuation,
    },
    /// Cone of light from the local origin
    Spot {
        /// Falloff with distance
        attenuation: Attenuation,
        /// Cone axis
        direction: Vector3,
        /// Angle of full intensity in radians
        beam_width: f64,
        /// Angle beyond which nothing is lit, in radians
        cut_off_angle: f64,
    },
}

impl LightType {
    /// Directional light pointing down the negative z axis
    pub fn directional() -> Self {
        LightType::Directional { direction: -Vector3::z() }
    }

    /// Point light with no falloff
    pub fn point() -> Self {
        LightType::Point { attenuation: Attenuation::default() }
    }

    /// Spot light pointing down the negative z axis
    pub fn spot() -> Self {
        LightType::Spot {
            attenuation: Attenuation::default(),
            direction: -Vector3::z(),
            beam_width: constants::HALF_PI,
            cut_off_angle: constants::QUARTER_PI,
        }
    }
}

/// Light source node
pub struct SgLight {
    core: ObjectCore,
    light_type: Cell<LightType>,
    on: Cell<bool>,
    color: Cell<Vector3f>,
    intensity: Cell<f32>,
    ambient_intensity: Cell<f32>,
}

impl SgLight {
    /// Create a light of the given type with white color
    pub fn new(light_type: LightType) -> Rc<Self> {
        Self::with_core(light_type, ObjectCore::new)
    }

    /// Create a directional light
    pub fn new_directional() -> Rc<Self> {
        Self::new(LightType::directional())
    }

    /// Create a point light
    pub fn new_point() -> Rc<Self> {
        Self::new(LightType::point())
    }

    /// Create a spot light
    pub fn new_spot() -> Rc<Self> {
        Self::new(LightType::spot())
    }

    fn with_core(light_type: LightType, make_core: impl FnOnce(Weak<dyn SgObject>) -> ObjectCore) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<SgLight>| {
            let this: Weak<dyn SgObject> = weak.clone();
            SgLight {
                core: make_core(this),
                light_type: Cell::new(light_type),
                on: Cell::new(true),
                color: Cell::new(Vector3f::new(1.0, 1.0, 1.0)),
                intensity: Cell::new(1.0),
                ambient_intensity: Cell::new(0.0),
            }
        })
    }

    /// Emission model and its parameters
    pub fn light_type(&self) -> LightType {
        self.light_type.get()
    }

    /// Replace the emission model
    pub fn set_light_type(&self, light_type: LightType) {
        self.light_type.set(light_type);
    }

    /// Light direction for directional and spot lights
    pub fn direction(&self) -> Option<Vector3> {
        match self.light_type.get() {
            LightType::Directional { direction } | LightType::Spot { direction, .. } => Some(direction),
            LightType::Point { .. } => None,
        }
    }

    /// Set the direction; ignored for point lights
    pub fn set_direction(&self, new_direction: Vector3) {
        let light_type = match self.light_type.get() {
            LightType::Directional { .. } => LightType::Directional { direction: new_direction },
            LightType::Spot { attenuation, beam_width, cut_off_angle, .. } => LightType::Spot {
                attenuation,
                direction: new_direction,
                beam_width,
                cut_off_angle,
            },
            point @ LightType::Point { .. } => point,
        };
        self.light_type.set(light_type);
    }

    /// Whether the light is switched on
    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    /// Switch the light on or off
    pub fn set_on(&self, on: bool) {
        self.on.set(on);
    }

    /// Light color (RGB)
    pub fn color(&self) -> Vector3f {
        self.color.get()
    }

    /// Set the light color
    pub fn set_color(&self, color: Vector3f) {
        self.color.set(color);
    }

    /// Direct intensity
    pub fn intensity(&self) -> f32 {
        self.intensity.get()
    }

    /// Set the direct intensity
    pub fn set_intensity(&self, intensity: f32) {
        self.intensity.set(intensity);
    }

    /// Ambient contribution
    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity.get()
    }

    /// Set the ambient contribution
    pub fn set_ambient_intensity(&self, intensity: f32) {
        self.ambient_intensity.set(intensity);
    }
}

impl SgObject for SgLight {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SgNode for SgLight {
    fn kind(&self) -> NodeKind {
        NodeKind::Light
    }

    fn accept(&self, visitor: &mut dyn SceneVisitor) {
        visitor.visit_light(self);
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

impl CloneObject for SgLight {
    fn clone_object(&self, _map: &mut SgCloneMap) -> SceneResult<Rc<Self>> {
        let clone = Self::with_core(self.light_type(), |this| ObjectCore::cloned_from(this, &self.core));
        clone.set_on(self.is_on());
        clone.set_color(self.color());
        clone.set_intensity(self.intensity());
        clone.set_ambient_intensity(self.ambient_intensity());
        Ok(clone)
    }
}
