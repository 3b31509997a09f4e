//! Geometry loading.
//!
//! Parts are triangle meshes read from STL files (binary or ASCII). The loader is the
//! only place that touches the filesystem for model data; everything above it works
//! with [`Mesh`].

pub mod mesh;
pub mod stl;

pub use mesh::{Bounds, Mesh, Triangle};
pub use stl::{load_stl, parse_stl};
