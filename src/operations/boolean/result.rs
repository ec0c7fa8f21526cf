use crate::math::Point3;
use crate::topology::Solid;
use crate::validation::Violation;

use super::split::Operand;

/// Why a boolean operation produced no solid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BooleanError {
    #[error("operand {operand:?} is not a valid solid ({} violations)", violations.len())]
    InvalidInput {
        operand: Operand,
        violations: Vec<Violation>,
    },

    #[error("operands do not overlap")]
    NoOverlap,

    #[error("result is empty")]
    EmptyResult,

    #[error("result is not a closed manifold ({} violations)", violations.len())]
    NonManifoldResult { violations: Vec<Violation> },

    #[error("internal error: {0}")]
    Internal(String),
}

/// A chain of intersection segments between the two operands' surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionCurve {
    pub points: Vec<Point3>,
    /// `true` when the last point connects back to the first.
    pub closed: bool,
}

/// Outcome of a boolean operation.
///
/// `solid` is set only on success, and is then always a valid closed
/// manifold. Warnings never affect `success`.
#[derive(Debug, Clone, Default)]
pub struct BooleanResult {
    pub success: bool,
    pub solid: Option<Solid>,
    pub errors: Vec<BooleanError>,
    pub warnings: Vec<String>,
    pub intersection_curves: Vec<IntersectionCurve>,
    /// Face pairs that passed the bounding box test on the final attempt.
    pub face_pairs_tested: usize,
    /// Pipeline runs made, including relaxed-tolerance retries.
    pub attempts: usize,
}

impl BooleanResult {
    /// Consumes the result, returning the solid or the first error.
    ///
    /// # Errors
    ///
    /// Returns the first recorded [`BooleanError`] when no solid was produced.
    pub fn into_solid(self) -> Result<Solid, BooleanError> {
        match self.solid {
            Some(solid) if self.success => Ok(solid),
            _ => Err(self
                .errors
                .into_iter()
                .next()
                .unwrap_or(BooleanError::EmptyResult)),
        }
    }
}
