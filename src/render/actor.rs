//! Renderable actors and their shared display properties.
//!
//! An [`Actor`] pairs immutable geometry with a transform private to whichever thread owns
//! the actor, plus a property bag (`colour`, `visible`) guarded by a lock. Actors created
//! with [`Actor::sharing`] point at the same bag, so the GUI actor and the VR actor of a
//! part stay in sync without either thread touching the other's transform.

use crate::config::Placement;
use crate::geometry::Mesh;
use crate::render::protocol::Axis;
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const NEUTRAL_GREY: Rgb = Rgb::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::NEUTRAL_GREY
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayProperties {
    pub colour: Rgb,
    pub visible: bool,
}

impl Default for DisplayProperties {
    fn default() -> Self {
        Self {
            colour: Rgb::NEUTRAL_GREY,
            visible: true,
        }
    }
}

/// Property bag shared between every actor of one part.
pub type SharedProperties = Arc<RwLock<DisplayProperties>>;

#[derive(Debug, Clone)]
pub struct Actor {
    mesh: Arc<Mesh>,
    properties: SharedProperties,
    origin: Point3<f64>,
    position: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
}

impl Actor {
    /// Create an actor with its own property bag, rotating about the mesh centre.
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self::with_properties(mesh, Arc::new(RwLock::new(DisplayProperties::default())))
    }

    pub fn with_properties(mesh: Arc<Mesh>, properties: SharedProperties) -> Self {
        let origin = mesh.center().cast::<f64>();
        Self {
            mesh,
            properties,
            origin,
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// New actor over the same geometry and property bag, with an untouched transform.
    pub fn sharing(&self) -> Self {
        Self::with_properties(Arc::clone(&self.mesh), Arc::clone(&self.properties))
    }

    pub fn shares_properties_with(&self, other: &Actor) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn properties(&self) -> &SharedProperties {
        &self.properties
    }

    /// Snapshot of the current display properties
    pub fn display(&self) -> DisplayProperties {
        *self.properties.read()
    }

    pub fn set_colour(&self, colour: Rgb) {
        self.properties.write().colour = colour;
    }

    pub fn set_visible(&self, visible: bool) {
        self.properties.write().visible = visible;
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    /// Rotate about one of the actor's own axes, in degrees.
    pub fn rotate(&mut self, axis: Axis, degrees: f64) {
        let axis: Unit<Vector3<f64>> = match axis {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        };
        self.orientation *= UnitQuaternion::from_axis_angle(&axis, degrees.to_radians());
    }

    pub fn rotate_x(&mut self, degrees: f64) {
        self.rotate(Axis::X, degrees);
    }

    pub fn rotate_y(&mut self, degrees: f64) {
        self.rotate(Axis::Y, degrees);
    }

    pub fn rotate_z(&mut self, degrees: f64) {
        self.rotate(Axis::Z, degrees);
    }

    pub fn add_position(&mut self, delta: Vector3<f64>) {
        self.position += delta;
    }

    /// Initial placement: rotate about X, then move the origin to `offset`.
    pub fn apply_placement(&mut self, placement: &Placement) {
        self.rotate_x(placement.rotate_x);
        let offset = Vector3::from(placement.offset);
        self.add_position(offset - self.origin.coords);
    }

    /// Model matrix: rotation about `origin`, then translation by `position`.
    pub fn matrix(&self) -> Matrix4<f64> {
        let to_origin = Matrix4::new_translation(&(-self.origin.coords));
        let from_origin = Matrix4::new_translation(&(self.position + self.origin.coords));
        from_origin * self.orientation.to_homogeneous() * to_origin
    }
}
