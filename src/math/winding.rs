use std::f64::consts::PI;

use super::{Point3, TOLERANCE};

/// Signed solid angle subtended by triangle `(a, b, c)` at `point`.
///
/// Van Oosterom–Strackee formula. Positive when `point` lies behind the
/// triangle's right-hand normal.
#[must_use]
pub fn triangle_solid_angle(point: &Point3, a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let ra = a - point;
    let rb = b - point;
    let rc = c - point;
    let la = ra.norm();
    let lb = rb.norm();
    let lc = rc.norm();
    if la < TOLERANCE || lb < TOLERANCE || lc < TOLERANCE {
        return 0.0;
    }
    let numerator = ra.dot(&rb.cross(&rc));
    let denominator = la * lb * lc + ra.dot(&rb) * lc + rb.dot(&rc) * la + rc.dot(&ra) * lb;
    2.0 * numerator.atan2(denominator)
}

/// Signed solid angle of a closed planar loop at `point`, by fan triangulation.
///
/// The fan is valid for non-convex loops since the signed contributions of
/// overlapping triangles cancel.
#[must_use]
pub fn loop_solid_angle(point: &Point3, polygon: &[Point3]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let first = &polygon[0];
    polygon
        .windows(2)
        .skip(1)
        .map(|w| triangle_solid_angle(point, first, &w[0], &w[1]))
        .sum()
}

/// Generalized winding number of `point` with respect to closed oriented loops.
///
/// Close to 1 inside a closed outward-oriented surface, 0 outside.
#[must_use]
pub fn winding_number<'a>(point: &Point3, loops: impl IntoIterator<Item = &'a [Point3]>) -> f64 {
    let total: f64 = loops.into_iter().map(|l| loop_solid_angle(point, l)).sum();
    total / (4.0 * PI)
}
