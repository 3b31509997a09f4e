//! # stlvr - Part Tree Viewer with a VR Render Coordinator
//!
//! Loads STL parts into a tree that a GUI tree view can address by `(row, column, parent)`,
//! and mirrors them into a VR view driven by a dedicated render thread.
//!
//! ## Architecture
//!
//! The control thread owns everything mutable: the part tree and the coordinator handle.
//! The render thread owns its private actor snapshot and the rendering backend. The two
//! share only the command state (per-axis rotation rates and a stop flag) and the actors'
//! display property bags.
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - Tick interval and actor placement settings
//! - [`geometry`] - Meshes and the STL loader
//! - [`scene`] - Part tree arena and tree-view model
//! - [`render`] - Actors, command protocol, backends and the render coordinator
//! - [`input`] - Control command parsing
//! - [`app`] - Control-thread orchestration

// Core modules
pub mod config;
pub mod error;
pub mod geometry;

// Subsystems
pub mod render;
pub mod scene;

// Control thread
pub mod app;
pub mod input;

// Re-export commonly used types for convenience
pub use error::{Result, ViewerError};

// Public API surface for external usage
pub use app::Application;
pub use config::ViewerConfig;
pub use render::{Command, CoordinatorState, RenderCoordinator};
pub use scene::{SceneTree, TreeModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
