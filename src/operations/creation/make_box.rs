use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3};
use crate::topology::Solid;

use super::MakePrism;

/// Creates an axis-aligned box solid from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, creating the box.
    ///
    /// # Errors
    ///
    /// Returns an error if the box has zero or negative extent along any axis.
    pub fn execute(&self) -> Result<Solid> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        if (0..3).any(|k| hi[k] <= lo[k]) {
            return Err(OperationError::InvalidInput(format!(
                "box corners {lo:?} and {hi:?} do not span a volume"
            ))
            .into());
        }
        let profile = vec![
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
        ];
        MakePrism::new(profile, Vector3::new(0.0, 0.0, hi.z - lo.z)).execute()
    }
}
