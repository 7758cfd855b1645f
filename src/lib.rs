// src/lib.rs
//! Haunted House
//!
//! A small night-time diorama rendered with wgpu and winit: a textured house
//! on a grass floor, fifty scattered graves, a moon, a door lamp and three
//! ghost lights circling the grounds. Appending `#debug` to the launch
//! arguments opens a panel for tuning the lights live.

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod motion;
pub mod params;
pub mod performance;
pub mod render_loop;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::HauntedHouseApp;
pub use config::AppConfig;
pub use params::ParameterSet;
