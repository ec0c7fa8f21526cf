use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::topology::{FaceId, Solid};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self { min: *p, max: *p },
                Some(b) => Self {
                    min: b.min.inf(p),
                    max: b.max.sup(p),
                },
            })
        })
    }

    /// Returns `true` if the boxes overlap or come within `tolerance` of each other.
    #[must_use]
    pub fn overlaps(&self, other: &Self, tolerance: f64) -> bool {
        (0..3).all(|k| {
            self.min[k] <= other.max[k] + tolerance && other.min[k] <= self.max[k] + tolerance
        })
    }

    /// Returns `true` if `point` lies inside the box grown by `tolerance`.
    #[must_use]
    pub fn contains(&self, point: &Point3, tolerance: f64) -> bool {
        (0..3).all(|k| point[k] >= self.min[k] - tolerance && point[k] <= self.max[k] + tolerance)
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
}

/// Computes the axis-aligned bounding box of a solid.
pub struct BoundingBox<'a> {
    solid: &'a Solid,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid has no vertices.
    pub fn execute(&self) -> Result<Aabb> {
        Aabb::from_points(self.solid.vertices().map(|(_, v)| &v.point))
            .ok_or_else(|| OperationError::InvalidInput("solid has no vertices".into()).into())
    }
}

/// Bounding box of one face's outer loop.
///
/// # Errors
///
/// Returns an error if the face is missing or has no vertices.
pub fn face_aabb(solid: &Solid, face: FaceId) -> Result<Aabb> {
    let pts = solid.loop_points(solid.face(face)?.outer_loop)?;
    Aabb::from_points(&pts)
        .ok_or_else(|| OperationError::InvalidInput("face has no vertices".into()).into())
}
