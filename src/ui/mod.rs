//! # User Interface Module
//!
//! Dear ImGui overlay: the light-tuning debug panel and the frame statistics
//! corner.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`DebugPanel`] - Controls bound to light parameters, hidden unless the
//!   location fragment contains `debug`
//!
//! While the UI wants the mouse or keyboard, camera input is suppressed.

pub mod debug_panel;
pub mod manager;

pub use debug_panel::{apply_edit, debug_controls, ControlEdit, DebugPanel};
pub use manager::UiManager;
