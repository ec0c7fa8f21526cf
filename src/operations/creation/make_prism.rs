use crate::error::{OperationError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::{FaceKind, PolygonFace, Solid, SolidBuilder};

/// Creates a prism by sweeping a planar polygon along a direction.
///
/// The profile may wind either way; the result is oriented outward. Side
/// face `i` is swept from profile edge `profile[i] -> profile[i + 1]` and
/// takes the kind given by [`with_side_kinds`](Self::with_side_kinds).
pub struct MakePrism {
    profile: Vec<Point3>,
    direction: Vector3,
    side_kinds: Vec<FaceKind>,
    cap_kind: FaceKind,
}

impl MakePrism {
    /// Creates a new `MakePrism` operation.
    #[must_use]
    pub fn new(profile: Vec<Point3>, direction: Vector3) -> Self {
        Self {
            profile,
            direction,
            side_kinds: Vec::new(),
            cap_kind: FaceKind::Primary,
        }
    }

    /// Sets the kind of each side face; missing entries are [`FaceKind::Primary`].
    #[must_use]
    pub fn with_side_kinds(mut self, kinds: Vec<FaceKind>) -> Self {
        self.side_kinds = kinds;
        self
    }

    /// Sets the kind of both cap faces.
    #[must_use]
    pub fn with_cap_kind(mut self, kind: FaceKind) -> Self {
        self.cap_kind = kind;
        self
    }

    /// Executes the operation, creating the prism.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile has fewer than three points, encloses
    /// no area, or the direction lies in the profile's plane.
    pub fn execute(&self) -> Result<Solid> {
        let n = self.profile.len();
        if n < 3 {
            return Err(OperationError::InvalidInput(format!(
                "prism profile needs at least 3 points, got {n}"
            ))
            .into());
        }
        let normal = newell_normal(&self.profile);
        if normal.norm() < TOLERANCE {
            return Err(OperationError::InvalidInput("prism profile has zero area".into()).into());
        }
        let along = normal.normalize().dot(&self.direction);
        if along.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput(
                "prism direction lies in the profile plane".into(),
            )
            .into());
        }

        // Base winds counter-clockwise seen from the sweep direction.
        let (base, kinds): (Vec<Point3>, Vec<FaceKind>) = if along > 0.0 {
            (
                self.profile.clone(),
                (0..n).map(|i| self.side_kind(i)).collect(),
            )
        } else {
            (
                self.profile.iter().rev().copied().collect(),
                (0..n).map(|k| self.side_kind((2 * n - 2 - k) % n)).collect(),
            )
        };
        let top: Vec<Point3> = base.iter().map(|p| p + self.direction).collect();

        let mut builder = SolidBuilder::new();
        builder.add_face(
            PolygonFace::new(base.iter().rev().copied().collect()).with_kind(self.cap_kind),
        );
        builder.add_face(PolygonFace::new(top.clone()).with_kind(self.cap_kind));
        for i in 0..n {
            let j = (i + 1) % n;
            builder.add_face(
                PolygonFace::new(vec![base[i], base[j], top[j], top[i]]).with_kind(kinds[i]),
            );
        }
        builder.build()
    }

    fn side_kind(&self, i: usize) -> FaceKind {
        self.side_kinds.get(i).copied().unwrap_or_default()
    }
}
