use crate::geometry::surface::Plane;

use super::{Point3, Vector3};

/// Relationship between two planes.
#[derive(Debug)]
pub enum PlanePairRelation {
    /// Planes intersect along a line.
    IntersectionLine {
        origin: Point3,
        direction: Vector3,
    },
    /// Planes are parallel but not coincident.
    Parallel { distance: f64 },
    /// Planes are the same (coincident).
    Coincident { same_orientation: bool },
}

/// Computes the intersection of two planes.
///
/// Normals whose cross product is shorter than `angular_tolerance` are
/// parallel; parallel planes closer than `tolerance` are coincident.
/// Returns an [`IntersectionLine`](PlanePairRelation::IntersectionLine) with a
/// unit-length `direction` when the planes cross.
#[must_use]
pub fn plane_plane_intersect(
    a: &Plane,
    b: &Plane,
    tolerance: f64,
    angular_tolerance: f64,
) -> PlanePairRelation {
    let na = a.plane_normal();
    let nb = b.plane_normal();

    let dir = na.cross(nb);
    let dir_len = dir.norm();

    if dir_len < angular_tolerance {
        let dist = a.signed_distance(b.origin()).abs();
        if dist < tolerance {
            PlanePairRelation::Coincident {
                same_orientation: a.same_orientation(b),
            }
        } else {
            PlanePairRelation::Parallel { distance: dist }
        }
    } else {
        let direction = dir / dir_len;

        // p = oa + s * na + t * nb, with na.(p - oa) = 0 and nb.(p - ob) = 0.
        let d2 = nb.dot(&(b.origin() - a.origin()));
        let dot_nn = na.dot(nb);
        let denom = 1.0 - dot_nn * dot_nn;
        let s = -dot_nn * d2 / denom;
        let t = d2 / denom;
        let origin = a.origin() + na * s + nb * t;

        PlanePairRelation::IntersectionLine { origin, direction }
    }
}

/// Parameter range covered by projecting `points` onto a line.
///
/// Returns `(t_min, t_max)` along `origin + t * direction`, or `None` for no points.
#[must_use]
pub fn projected_extent(
    origin: &Point3,
    direction: &Vector3,
    points: impl IntoIterator<Item = Point3>,
) -> Option<(f64, f64)> {
    points.into_iter().fold(None, |acc, p| {
        let t = (p - origin).dot(direction);
        Some(match acc {
            None => (t, t),
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
        })
    })
}
