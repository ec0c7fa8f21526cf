//! Read-only conversions of a solid into render-ready data.

mod tessellate_face;
mod tessellate_solid;
mod wireframe;

pub use tessellate_face::TessellateFace;
pub use tessellate_solid::{solid_to_mesh, TessellateSolid};
pub use wireframe::{solid_to_wireframe, WireSegment, Wireframe};

use crate::math::{Point2, Point3, Vector3};
use crate::topology::FaceId;

/// Parameters controlling tessellation.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Triangles with a smaller area are dropped.
    pub min_triangle_area: f64,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            min_triangle_area: 1e-14,
        }
    }
}

impl TessellationParams {
    #[must_use]
    pub fn with_min_triangle_area(mut self, area: f64) -> Self {
        self.min_triangle_area = area;
        self
    }
}

/// A triangle mesh approximation of a boundary.
///
/// Vertices are not shared between faces, so every vertex carries the normal
/// of the face it belongs to.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Coordinates in the plane of the owning face.
    pub uvs: Vec<Point2>,
    /// Triangle indices, counter-clockwise seen from outside.
    pub indices: Vec<[u32; 3]>,
    /// Source face of each triangle.
    pub faces: Vec<FaceId>,
}

impl TriangleMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Appends `other`, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        self.faces.extend_from_slice(&other.faces);
    }

    /// Corner positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Volume enclosed by the mesh, by the divergence theorem.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        (0..self.triangle_count())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        (0..self.triangle_count())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .sum()
    }
}
