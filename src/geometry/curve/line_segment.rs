use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A bounded straight segment between two points.
///
/// The parametric form is `P(t) = start + t * (end - start)` with `t` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct LineSegment {
    start: Point3,
    end: Point3,
}

impl LineSegment {
    /// Creates a new segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn new(start: Point3, end: Point3) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self { start, end })
    }

    /// Returns the start point.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// Returns the end point.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Returns the unnormalized vector from start to end.
    #[must_use]
    pub fn vector(&self) -> Vector3 {
        self.end - self.start
    }

    /// Returns the unit direction from start to end.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        self.vector().normalize()
    }

    /// Returns the length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Returns the segment with its endpoints swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    /// Parameter of the point on the segment closest to `point`, clamped to `[0, 1]`.
    #[must_use]
    pub fn closest_parameter(&self, point: &Point3) -> f64 {
        let d = self.vector();
        let len_sq = d.norm_squared();
        if len_sq < TOLERANCE * TOLERANCE {
            return 0.0;
        }
        ((point - self.start).dot(&d) / len_sq).clamp(0.0, 1.0)
    }

    /// Distance from `point` to the segment.
    #[must_use]
    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        let t = self.closest_parameter(point);
        (point - (self.start + self.vector() * t)).norm()
    }
}

impl Curve for LineSegment {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        if !self.domain().contains(t) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: t,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        Ok(self.start + self.vector() * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction())
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }
}
