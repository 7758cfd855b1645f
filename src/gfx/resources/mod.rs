//! GPU resource management
//!
//! Textures, uniform buffers and the bind groups built from them.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{pack_globals, GlobalBindings, GlobalUBO, GlobalUBOContent};
pub use material::{MaterialTextures, ObjectUBO, ObjectUniform};
pub use texture_resource::TextureResource;
