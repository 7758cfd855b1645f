//! # Graphics Module
//!
//! Everything between the scene description and the pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Damped orbit camera around the house
//! - **Geometry** ([`geometry`]) - Procedural boxes, planes, cones and spheres
//! - **Scene Management** ([`scene`]) - Scene graph built from the parameter set
//! - **Resource Management** ([`resources`]) - Uniforms, textures and bind groups
//! - **Rendering Pipeline** ([`rendering`]) - Moon shadow pass, lit scene pass
//!   and the UI overlay
//!
//! ## Usage
//!
//! ```no_run
//! use haunted_house::gfx::RenderEngine;
//!
//! // The render engine is created by HauntedHouseApp once the window exists
//! // let render_engine = RenderEngine::new(window, width, height, true).await?;
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
pub use scene::{SceneBuilder, SceneGraph};
