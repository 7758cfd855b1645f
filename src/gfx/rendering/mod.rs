//! Core rendering functionality
//!
//! Render pipelines, the per-frame passes and the WGSL shaders they run.

pub mod pipeline_manager;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{RenderEngine, RenderStats};
