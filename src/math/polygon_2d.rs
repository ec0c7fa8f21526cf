use std::f64::consts::TAU;

use super::{Point2, Vector2, TOLERANCE};

/// Where a point lies relative to a closed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
    /// Within tolerance of a boundary edge.
    Boundary,
}

/// 2D cross product `a.x * b.y - a.y * b.x`.
#[inline]
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Parameter of the projection of `p` onto the line through `a` and `b`.
///
/// `0` at `a`, `1` at `b`, unclamped.
#[must_use]
pub fn segment_parameter(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return 0.0;
    }
    (p - a).dot(&d) / len_sq
}

/// Distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let t = segment_parameter(p, a, b).clamp(0.0, 1.0);
    (p - (a + (b - a) * t)).norm()
}

/// Intersection parameters of two non-parallel segments.
///
/// Returns `(t, u)` with the crossing at `a0 + t * (a1 - a0)` and
/// `b0 + u * (b1 - b0)`, or `None` if the segments are parallel or the
/// crossing lies outside either segment by more than `tolerance` (a length).
#[must_use]
pub fn segment_crossing(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    tolerance: f64,
) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < TOLERANCE || len_b < TOLERANCE {
        return None;
    }
    let denom = cross(&da, &db);
    // Parallel or nearly so: sine of the angle below 1e-12.
    if denom.abs() < 1e-12 * len_a * len_b {
        return None;
    }
    let diff = b0 - a0;
    let t = cross(&diff, &db) / denom;
    let u = cross(&diff, &da) / denom;
    let ea = tolerance / len_a;
    let eb = tolerance / len_b;
    if t < -ea || t > 1.0 + ea || u < -eb || u > 1.0 + eb {
        return None;
    }
    Some((t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
}

/// Winding number of `p` with respect to a closed polygon.
///
/// Non-zero => inside, zero => outside.
#[must_use]
pub fn winding_number(p: &Point2, polygon: &[Point2]) -> i32 {
    let n = polygon.len();
    let mut winding = 0i32;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        let side = cross(&(b - a), &(p - a));
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Classifies `p` against a single closed loop, with a boundary band of `tolerance`.
#[must_use]
pub fn classify_point_in_loop(p: &Point2, polygon: &[Point2], tolerance: f64) -> Containment {
    let n = polygon.len();
    if n < 3 {
        return Containment::Outside;
    }
    for i in 0..n {
        if point_segment_distance(p, &polygon[i], &polygon[(i + 1) % n]) <= tolerance {
            return Containment::Boundary;
        }
    }
    if winding_number(p, polygon) == 0 {
        Containment::Outside
    } else {
        Containment::Inside
    }
}

/// Classifies `p` against a region bounded by `outer` with `holes` removed.
#[must_use]
pub fn classify_point_in_region(
    p: &Point2,
    outer: &[Point2],
    holes: &[Vec<Point2>],
    tolerance: f64,
) -> Containment {
    match classify_point_in_loop(p, outer, tolerance) {
        Containment::Inside => {}
        other => return other,
    }
    for hole in holes {
        match classify_point_in_loop(p, hole, tolerance) {
            Containment::Outside => {}
            Containment::Inside => return Containment::Outside,
            Containment::Boundary => return Containment::Boundary,
        }
    }
    Containment::Inside
}

/// Finds a point strictly inside a region, away from its boundary.
///
/// Scans horizontal slabs between consecutive vertex heights, and returns the
/// center of the widest inside span found (scored by the smaller of span
/// width and slab height). Returns `None` for a region with no area.
#[must_use]
pub fn interior_point(outer: &[Point2], holes: &[Vec<Point2>]) -> Option<Point2> {
    let loops: Vec<&[Point2]> = std::iter::once(outer)
        .chain(holes.iter().map(Vec::as_slice))
        .collect();

    let mut ys: Vec<f64> = loops.iter().flat_map(|l| l.iter().map(|p| p.y)).collect();
    ys.sort_by(f64::total_cmp);
    ys.dedup_by(|a, b| (*a - *b).abs() < TOLERANCE);

    let mut best: Option<(f64, Point2)> = None;
    for slab in ys.windows(2) {
        let height = slab[1] - slab[0];
        let y = (slab[0] + slab[1]) * 0.5;

        let mut xs = Vec::new();
        for l in &loops {
            let n = l.len();
            for i in 0..n {
                let a = &l[i];
                let b = &l[(i + 1) % n];
                if (a.y < y) != (b.y < y) {
                    xs.push(a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
        }
        xs.sort_by(f64::total_cmp);

        for span in xs.chunks_exact(2) {
            let width = span[1] - span[0];
            let score = width.min(height);
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, Point2::new((span[0] + span[1]) * 0.5, y)));
            }
        }
    }

    best.filter(|(score, _)| *score > TOLERANCE).map(|(_, p)| p)
}

/// Chooses the outgoing edge that turns most sharply left.
///
/// Standing at `at` having arrived from `back`, returns the index of the
/// candidate endpoint reached by the smallest clockwise rotation from the
/// direction pointing back. Walking this way keeps the traced face on the
/// left and yields minimal cycles. Turning straight back is chosen only when
/// nothing else is available.
#[must_use]
pub fn sharpest_left_turn(
    at: &Point2,
    back: &Point2,
    candidates: impl IntoIterator<Item = (usize, Point2)>,
) -> Option<usize> {
    let reference = (back.y - at.y).atan2(back.x - at.x);
    let mut best: Option<(f64, usize)> = None;
    for (index, target) in candidates {
        let angle = (target.y - at.y).atan2(target.x - at.x);
        let mut delta = (reference - angle).rem_euclid(TAU);
        if delta < 1e-12 {
            delta = TAU;
        }
        if best.is_none_or(|(d, _)| delta < d) {
            best = Some((delta, index));
        }
    }
    best.map(|(_, index)| index)
}
