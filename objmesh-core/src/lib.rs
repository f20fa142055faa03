//! objmesh Core Library - OBJ loading and rigid mesh transforms
//!
//! This library parses Wavefront OBJ geometry into an indexed triangle mesh,
//! derives flat normals where the file has none, tracks the bounding box,
//! and re-derives the vertex buffer when the mesh is moved or rotated.

pub mod error;
pub mod geometry;
pub mod mesh;
pub mod obj;
pub mod resource;
pub mod transform;

// Re-export commonly used types
pub use error::{MeshError, MeshResult};
pub use geometry::{BoundingBox, Triangle, Vertex};
pub use mesh::Mesh;
pub use resource::{GpuMesh, VertexUploader};
pub use transform::{Pose, RotationState, Transform};
