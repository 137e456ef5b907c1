//! Umbra2D Shadows
//!
//! Soft shadow geometry for 2D disk lights. For every light the crate
//! classifies the vertices of the hulls in range and builds four triangle
//! meshes: penumbra fins, the umbra behind each silhouette, the antumbra past
//! converging umbra boundaries, and the hulls' own solid fill.
//!
//! ```no_run
//! use umbra2d_shadows::{Hull, Light, Point2, ShadowScene};
//!
//! let mut scene = ShadowScene::default();
//! let light = scene.add_light(Light::new(Point2::new(-100.0, 0.0), 20.0, 300.0)?);
//! scene.add_hull(Hull::rectangle(50.0, 50.0)?);
//!
//! scene.update();
//! let shadows = scene.shadows(light).unwrap();
//! assert!(shadows.has_umbra());
//! # Ok::<(), umbra2d_shadows::Error>(())
//! ```

pub mod buffers;
pub mod builders;
pub mod classify;
pub mod config;
pub mod error;
pub mod light;
pub mod pipeline;
pub mod scene;

// Re-export geometry types for convenience
pub use umbra2d_geometry::{Hull, HullTransform, Point2, ShadowMesh, Vector2};

pub use buffers::{DoubleBuffered, LightShadows, ShadowRegion};
pub use builders::{
    AntumbraBuilder, BuildState, PenumbraBuilder, ShadowBuilder, SolidBuilder, UmbraBuilder,
    UmbraIntersectionContext, UmbraSegment,
};
pub use classify::{classify_hull, HullContext, HullPointContext, Side};
pub use config::ShadowConfig;
pub use error::{Error, Result};
pub use light::{Light, LightKind, LightSnapshot, ShadowType, TangentPoints};
pub use pipeline::ShadowPipeline;
pub use scene::{HullKey, LightKey, ShadowScene};
