//! Math utilities and types
//!
//! Transforms and bounding volumes use `f64`; bulk vertex payload uses `f32`.

use nalgebra::Matrix4;

pub use nalgebra::{Matrix3, Point3, Translation3, UnitQuaternion};

/// 3D vector type (double precision)
pub type Vector3 = nalgebra::Vector3<f64>;

/// 2D vector type (double precision)
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type for vertex payload
pub type Vector3f = nalgebra::Vector3<f32>;

/// 2D vector type for texture coordinates
pub type Vector2f = nalgebra::Vector2<f32>;

/// Rotation quaternion type
pub type Quat = UnitQuaternion<f64>;

/// Rigid transform (rotation followed by translation)
pub type Isometry3 = nalgebra::Isometry3<f64>;

/// General affine transform
pub type Affine3 = nalgebra::Affine3<f64>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f64 = std::f64::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f64 = PI * 0.5;

    /// Pi / 4
    pub const QUARTER_PI: f64 = PI * 0.25;
}

/// Build an affine transform from a rigid transform
pub fn affine_from_isometry(isometry: &Isometry3) -> Affine3 {
    Affine3::from_matrix_unchecked(isometry.to_homogeneous())
}

/// Build an affine transform from per-axis scale factors
pub fn affine_from_scale(scale: &Vector3) -> Affine3 {
    Affine3::from_matrix_unchecked(Matrix4::new_nonuniform_scaling(scale))
}
