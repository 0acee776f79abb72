//! Geometry utilities
//!
//! Builders that fill [`SgMesh`](crate::scene::SgMesh) payload: primitive
//! tessellation and normal generation.

mod mesh_generator;
mod normal_generator;

pub use mesh_generator::MeshGenerator;
pub use normal_generator::NormalGenerator;
