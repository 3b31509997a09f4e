//! VR rendering subsystem.
//!
//! - [`actor`] - renderables with shared display properties
//! - [`protocol`] - last-write-wins command state shared with the render thread
//! - [`backend`] - the rendering library seam and a headless implementation
//! - [`service`] - the event/animation loop body
//! - [`coordinator`] - thread lifecycle and the Idle/Starting/Running/Stopping machine

pub mod actor;
pub mod backend;
pub mod coordinator;
pub mod protocol;
pub mod service;

pub use actor::{Actor, DisplayProperties, Rgb, SharedProperties};
pub use backend::{
    BackendFactory, BackendStats, EventOutcome, HeadlessBackend, HeadlessFactory, HeadlessProbe,
    RenderBackend, SceneSetup,
};
pub use coordinator::{CoordinatorEvent, CoordinatorState, RenderCoordinator, RenderableRef};
pub use protocol::{Axis, Command, CommandState, RotationRates};
pub use service::{LoopStatus, RenderLoop};
