use crate::error::Result;
use crate::math::{Point3, TOLERANCE};
use crate::topology::{EdgeId, Solid};

use super::edge_frame::EdgeFrame;

/// Largest setback the edge can take.
///
/// Limited to half the shortest edge meeting either end of the edge, and to
/// the depth of each adjacent face measured from the edge.
///
/// # Errors
///
/// Returns an error if a neighbouring entity is missing.
pub fn available_setback(solid: &Solid, frame: &EdgeFrame) -> Result<f64> {
    let mut limit = f64::INFINITY;
    for id in solid.adjacent_edges(frame.edge)? {
        limit = limit.min(0.5 * solid.edge(id)?.curve.length());
    }
    for (face, t) in frame.faces.iter().zip([frame.t1, frame.t2]) {
        let outer = solid.face_polygon(*face)?.outer;
        let depth = outer
            .iter()
            .map(|v| (v - frame.start).dot(&t))
            .fold(0.0, f64::max);
        limit = limit.min(depth);
    }
    Ok(limit)
}

/// An accepted blend, kept for overlap checks against later edges.
#[derive(Debug, Clone)]
pub struct Placed {
    pub frame: EdgeFrame,
    pub setback: f64,
}

/// Finds an accepted blend that would overlap the blend of `frame`.
///
/// Blends of edges meeting at a vertex are merged by the booleans and do
/// not count. Blends of separate edges on a common face overlap when the
/// edges are closer than the sum of their setbacks.
#[must_use]
pub fn overlapping_blend(
    placed: &[Placed],
    frame: &EdgeFrame,
    setback: f64,
    tolerance: f64,
) -> Option<EdgeId> {
    let ends = [frame.start, frame.end];
    placed
        .iter()
        .filter(|other| other.frame.faces.iter().any(|f| frame.faces.contains(f)))
        .filter(|other| {
            let other_ends = [other.frame.start, other.frame.end];
            !ends
                .iter()
                .any(|a| other_ends.iter().any(|b| (a - b).norm() <= tolerance))
        })
        .find(|other| {
            segment_distance(&frame.start, &frame.end, &other.frame.start, &other.frame.end)
                < setback + other.setback - tolerance
        })
        .map(|other| other.frame.edge)
}

/// Shortest distance between two segments.
#[must_use]
pub fn segment_distance(p0: &Point3, p1: &Point3, q0: &Point3, q1: &Point3) -> f64 {
    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    let (s, t) = if a <= TOLERANCE && e <= TOLERANCE {
        (0.0, 0.0)
    } else if a <= TOLERANCE {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= TOLERANCE {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > TOLERANCE {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };
    ((p0 + d1 * s) - (q0 + d2 * t)).norm()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn segment_distances() {
        let d = segment_distance(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 1.0),
            &p(1.0, 1.0, 1.0),
        );
        assert_relative_eq!(d, 2f64.sqrt(), epsilon = 1e-12);
        let crossing = segment_distance(
            &p(-1.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, -1.0, 0.5),
            &p(0.0, 1.0, 0.5),
        );
        assert_relative_eq!(crossing, 0.5, epsilon = 1e-12);
        let end_to_end = segment_distance(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(3.0, 0.0, 0.0),
            &p(4.0, 0.0, 0.0),
        );
        assert_relative_eq!(end_to_end, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn box_edge_clearance() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(4.0, 4.0, 1.0)).execute().unwrap();
        let uses = solid.edge_uses();
        for (id, edge) in solid.edges() {
            let frame = EdgeFrame::compute(&solid, id, &uses[&id], 1e-9).unwrap();
            let limit = available_setback(&solid, &frame).unwrap();
            if edge.curve.length() < 2.0 {
                // Vertical edges meet 4-long edges at both ends.
                assert_relative_eq!(limit, 2.0, epsilon = 1e-12);
            } else {
                // Horizontal edges meet the 1-long vertical edges.
                assert_relative_eq!(limit, 0.5, epsilon = 1e-12);
            }
        }
    }
}
