/// Folio Core Library - skinned page meshes for a bendable 3D book
///
/// This library builds the shared page geometry with per-vertex bone
/// weights, the per-page bone chains, linear blend skinning, the per-frame
/// bend update and the book composition that places pages side by side.

pub mod animation;
pub mod book;
pub mod config;
pub mod error;
pub mod geometry;
pub mod manifest;
pub mod material;
pub mod page;
pub mod projection;
pub mod skeleton;
pub mod skinning;
pub mod transform;

// Re-export commonly used types
pub use animation::{BendAnimator, BendCurve, ConstantBend};
pub use book::{Book, PageInstance, PageRecord, SkippedPage};
pub use config::{BookConfig, PageDimensions, MAX_SEGMENTS};
pub use error::{FolioError, FolioResult};
pub use geometry::{BoxGeometry, Mesh, Triangle, Vertex};
pub use material::{Color, Material, PageMaterials};
pub use page::{build_page_geometry, PageGeometry};
pub use projection::{Camera, ProjectionMode};
pub use skeleton::{build_bone_chain, Bone, Skeleton};
pub use skinning::{bind_skin, SkinnedMesh};
pub use transform::{RotationState, Transform};
