//! # Scene Management Module
//!
//! The diorama's scene graph and everything needed to derive it from
//! parameters.
//!
//! ## Key Components
//!
//! - [`SceneBuilder`] - Builds the graph from a parameter set and texture catalog
//! - [`SceneGraph`] - Flat node list with fog, clear color and well-known handles
//! - [`SceneNode`] - Mesh, light or helper with a transform and visibility flag
//! - [`Mesh`] - GPU buffers for one procedural shape
//! - [`Vertex3D`] - Vertex format with position, normal, and texture coordinates
//!
//! ## Usage
//!
//! ```no_run
//! use haunted_house::assets::AssetCatalog;
//! use haunted_house::gfx::scene::SceneBuilder;
//! use haunted_house::params::ParameterSet;
//!
//! let params = ParameterSet::default();
//! let assets = AssetCatalog::haunted_house("assets/haunted-house");
//! let graph = SceneBuilder::new(&params, &assets).build_seeded(Some(42));
//! assert_eq!(graph.handles().unwrap().graves.len(), 50);
//! ```

pub mod builder;
pub mod node;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use builder::{GraveSite, SceneBuilder};
pub use node::{
    LightDescriptor, LightKind, MaterialDesc, MaterialMaps, NodeId, NodeKind, SceneNode, Shape,
    Transform,
};
pub use object::{DrawMesh, Mesh};
pub use scene::{Fog, SceneGraph, SceneHandles, SceneStatistics};
pub use vertex::Vertex3D;
