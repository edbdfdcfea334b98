//! Mesh data model (component C3's inputs): vertices and triangles are
//! opaque payloads to the builder beyond vertex positions and the indices
//! that name them.

pub mod triangle;
pub mod vertex;

pub use self::triangle::{validate_triangles, Triangle};
pub use self::vertex::Vertex;
