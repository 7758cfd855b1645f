//! Error types for the haunted house crate
//!
//! Each concern gets its own `thiserror` enum. The application edge wraps them
//! in `anyhow` so setup failures reach `main` with context attached.

use std::path::PathBuf;

/// Errors raised by path-based access to the [`ParameterSet`](crate::params::ParameterSet)
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter path `{0}`")]
    UnknownPath(String),

    #[error("parameter `{path}` expects a {expected} value, got {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised while resolving [`AppConfig`](crate::config::AppConfig) from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value `{value}`: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors raised while loading a texture from disk
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load texture {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors raised by the GPU renderer
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface texture unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("pipeline `{0}` is not available")]
    MissingPipeline(String),
}
