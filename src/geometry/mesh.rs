//! Triangle mesh storage.

use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(normal: Vector3<f32>, vertices: [Point3<f32>; 3]) -> Self {
        Self { normal, vertices }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of all vertices, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = *points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        Some(Bounds { min, max })
    }

    /// Geometric centre used as the actor's rotation origin
    pub fn center(&self) -> Point3<f32> {
        self.bounds()
            .map(|b| b.center())
            .unwrap_or_else(Point3::origin)
    }
}
