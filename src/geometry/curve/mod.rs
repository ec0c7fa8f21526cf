mod line_segment;

pub use line_segment::LineSegment;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Returns `true` if `t` lies within the domain.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t_min && t <= self.t_max
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the tangent vector at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or the tangent is degenerate.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Samples `n` points evenly spaced in parameter space, endpoints included.
    ///
    /// # Errors
    ///
    /// Returns an error if `n < 2`, the domain is unbounded, or evaluation fails.
    fn points(&self, n: usize) -> Result<Vec<Point3>> {
        if n < 2 {
            return Err(GeometryError::Degenerate(format!(
                "curve sampling needs at least 2 points, got {n}"
            ))
            .into());
        }
        let domain = self.domain();
        if !domain.t_min.is_finite() || !domain.t_max.is_finite() {
            return Err(GeometryError::Degenerate("cannot sample an unbounded curve".into()).into());
        }
        #[allow(clippy::cast_precision_loss)]
        let step = (domain.t_max - domain.t_min) / (n - 1) as f64;
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = if i == n - 1 {
                    domain.t_max
                } else {
                    domain.t_min + step * i as f64
                };
                self.evaluate(t)
            })
            .collect()
    }
}
