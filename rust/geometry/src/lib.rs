//! Umbra2D Geometry
//!
//! 2D geometry for soft shadow construction: intersection primitives,
//! convex clipping, earcutr triangulation, the hull occluder model and the
//! mesh buffers the shadow builders emit.

pub mod bool2d;
pub mod bounds;
pub mod error;
pub mod hull;
pub mod mesh;
pub mod primitives;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use bounds::Aabb2;
pub use error::{Error, Result};
pub use hull::{ApexNormals, Hull, HullSnapshot, HullTransform};
pub use mesh::ShadowMesh;
pub use triangulation::triangulate_polygon;
