//! Command protocol between the control thread and the render coordinator.
//!
//! Commands do not form a queue. Each rotation command overwrites the rate for its axis
//! and `Stop` raises a flag, so issuing commands never allocates and the coordinator
//! always applies the most recent value.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Commands accepted by [`RenderCoordinator::issue_command`](crate::render::RenderCoordinator::issue_command).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Leave the render loop at the next iteration boundary
    Stop,
    /// Degrees about X applied to every actor per animation tick
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
}

impl Command {
    pub fn rotate(axis: Axis, degrees: f64) -> Self {
        match axis {
            Axis::X => Command::RotateX(degrees),
            Axis::Y => Command::RotateY(degrees),
            Axis::Z => Command::RotateZ(degrees),
        }
    }
}

/// Per-tick rotation rates in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationRates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationRates {
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

/// The only state shared between the two threads.
///
/// Rates are stored as `f64` bit patterns so reads and writes are never torn.
#[derive(Debug, Default)]
pub struct CommandState {
    rotate_x: AtomicU64,
    rotate_y: AtomicU64,
    rotate_z: AtomicU64,
    stop: AtomicBool,
}

impl CommandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, command: Command) {
        match command {
            Command::Stop => self.stop.store(true, Ordering::SeqCst),
            Command::RotateX(v) => self.rotate_x.store(v.to_bits(), Ordering::SeqCst),
            Command::RotateY(v) => self.rotate_y.store(v.to_bits(), Ordering::SeqCst),
            Command::RotateZ(v) => self.rotate_z.store(v.to_bits(), Ordering::SeqCst),
        }
    }

    pub fn rates(&self) -> RotationRates {
        RotationRates {
            x: f64::from_bits(self.rotate_x.load(Ordering::SeqCst)),
            y: f64::from_bits(self.rotate_y.load(Ordering::SeqCst)),
            z: f64::from_bits(self.rotate_z.load(Ordering::SeqCst)),
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Clear all pending state before a new run.
    pub fn reset(&self) {
        for rate in [&self.rotate_x, &self.rotate_y, &self.rotate_z] {
            rate.store(0f64.to_bits(), Ordering::SeqCst);
        }
        self.stop.store(false, Ordering::SeqCst);
    }
}
