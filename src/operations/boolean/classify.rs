use crate::operations::query::{PointContainment, SolidProbe};

use super::split::FaceFragment;

/// Where a fragment lies relative to the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentClass {
    Inside,
    Outside,
    /// On a face of the other operand whose outward normal agrees.
    OnSame,
    /// On a face of the other operand whose outward normal is reversed.
    OnOpposite,
}

/// Classifies a fragment by its interior sample point.
///
/// Returns `None` for a fragment without area.
#[must_use]
pub fn classify_fragment(
    fragment: &FaceFragment,
    other: &SolidProbe,
    tolerance: f64,
) -> Option<FragmentClass> {
    let sample = fragment.sample?;
    Some(match other.classify(&sample, tolerance) {
        PointContainment::Inside => FragmentClass::Inside,
        PointContainment::Outside => FragmentClass::Outside,
        PointContainment::OnBoundary { normal, .. } => {
            if normal.dot(fragment.plane.plane_normal()) > 0.0 {
                FragmentClass::OnSame
            } else {
                FragmentClass::OnOpposite
            }
        }
    })
}
