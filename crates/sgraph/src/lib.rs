//! # sgraph
//!
//! A scene graph object model for 3D simulation and editing tools.
//!
//! ## Features
//!
//! - **Shared ownership**: nodes and payload may have several owners; the
//!   graph is a DAG, not a tree
//! - **Upward notification**: edits propagate from the changed object to
//!   every ancestor along every path
//! - **Lazy bounds**: bounding boxes are cached and invalidated on change
//! - **Copy-on-write payload**: vertex arrays and images share storage
//!   until written
//! - **Structure-preserving cloning**: shared objects stay shared in the copy
//! - **Visitors**: renderers and tools consume the graph by double dispatch
//!
//! ## Quick Start
//!
//! ```rust
//! use sgraph::prelude::*;
//!
//! let root = SgGroup::new();
//! let transform = SgPosTransform::from_translation(Vector3::new(1.0, 0.0, 0.0));
//! let shape = SgShape::new();
//! shape.set_mesh(MeshGenerator::new().generate_box(Vector3::new(2.0, 2.0, 2.0)));
//! transform.add_child(shape, true);
//! root.add_child(transform, true);
//!
//! let bbox = root.bounding_box();
//! assert_eq!(bbox.min, Vector3::new(0.0, -1.0, -1.0));
//! assert_eq!(bbox.max, Vector3::new(2.0, 1.0, 1.0));
//!
//! let mut map = SgCloneMap::new();
//! let copy = map.find_or_create_clone(&root).unwrap();
//! println!("{}", SceneDumper::dump(&*copy));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod foundation;
pub mod geometry;
pub mod scene;

pub use error::{SceneError, SceneResult};

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        error::{SceneError, SceneResult},
        foundation::math::{Isometry3, Quat, Vector3, Vector3f},
        geometry::{MeshGenerator, NormalGenerator},
        scene::{
            BoundingBox, NodeKind, SceneDumper, SceneVisitor, SgCamera, SgCloneMap, SgFog, SgGroup, SgLight,
            SgLineSet, SgMaterial, SgMesh, SgNode, SgNodePtr, SgObject, SgPointSet, SgPolygonMesh, SgPosTransform,
            SgScaleTransform, SgShape, SgTexture, SgUpdate, SgVertexArray, UpdateAction,
        },
    };
}
