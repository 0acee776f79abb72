//! Scene graph object model
//!
//! A scene is a directed acyclic graph of reference counted objects.
//! Groups and transforms hold their children through `Rc`; every object
//! keeps weak back-references to the objects that hold it, which is how
//! updates travel upwards:
//!
//! ```text
//! Root group ◄──────────────┐ owner
//!   ├─► PosTransform ◄──┐   │
//!   │     └─► Shape ────┼───┘ (shared by two parents)
//!   └─► ScaleTransform ─┘
//!             └─► Shape ─► Mesh ─► vertex array
//! ```
//!
//! Bounding boxes are computed lazily and cached; any update passing
//! through a group or mesh drops its cache. Payload objects (arrays,
//! materials, textures, images) are shared the same way as nodes, and
//! arrays and images copy their storage on first write when shared.
//! Polygon meshes from loaders are fanned into triangle meshes with
//! [`SgPolygonMesh::triangulate`].
//! [`SgCloneMap`] deep-copies a graph while keeping shared objects shared.

mod array;
mod bounding_box;
mod camera;
mod clone_map;
mod fog;
mod group;
mod light;
mod material;
mod mesh;
mod node;
mod object;
mod plot;
mod polygon_mesh;
mod shape;
mod texture;
mod transform;
mod update;
mod visitor;

#[cfg(test)]
mod tests;

pub use array::{SgColorArray, SgNormalArray, SgTexCoordArray, SgVectorArray, SgVertexArray};
pub use bounding_box::BoundingBox;
pub use camera::{Projection, SgCamera};
pub use clone_map::{CloneObject, SgCloneMap};
pub use fog::SgFog;
pub use group::{GroupKind, SgGroup};
pub use light::{Attenuation, LightType, SgLight};
pub use material::SgMaterial;
pub use mesh::{MeshPrimitive, SgMesh};
pub use node::{NodeKind, SgNode, SgNodePtr};
pub use object::{propagate_update, ObjectCore, ObjectId, OwnedSlot, SgObject, SgObjectPtr};
pub use plot::{SgLineSet, SgPlot, SgPointSet};
pub use polygon_mesh::{SgPolygonMesh, POLYGON_SEPARATOR};
pub use shape::SgShape;
pub use texture::{SgImage, SgTexture, SgTextureTransform};
pub use transform::{SgPosTransform, SgScaleTransform};
pub use update::{SgUpdate, UpdateAction};
pub use visitor::{visit_children, AsSceneVisitor, SceneDumper, SceneVisitor};
