use crate::geometry::surface::Plane;

use super::polygon_2d::{
    classify_point_in_region, segment_crossing, segment_parameter, Containment,
};
use super::{Point2, Point3, Vector3};

/// Area-weighted normal of a closed polygon (Newell's method).
///
/// The length equals twice the enclosed area; the direction follows the
/// winding. Zero for degenerate input.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    if n < 3 {
        return normal;
    }
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Average of the given points. The origin for an empty slice.
#[must_use]
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / points.len() as f64;
    Point3::from(sum * inv)
}

/// Compute the 3D point along a segment at parameter `t`.
#[must_use]
pub fn segment_point_at(start: &Point3, end: &Point3, t: f64) -> Point3 {
    let dir = end - start;
    start + dir * t
}

/// Compute the area of a 3D polygon (coplanar points).
///
/// Uses the cross-product summation method projected along the polygon normal.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut cross_sum = Vector3::new(0.0, 0.0, 0.0);
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    0.5 * cross_sum.dot(normal).abs()
}

/// Clips a segment to a planar region bounded by `outer` minus `holes`.
///
/// The segment must lie in `plane`; the loops are given in the plane's
/// `(u, v)` coordinates. Boundary counts as inside, so a segment running
/// along an edge of the region is kept. Returns the kept sub-segments as
/// `(t_start, t_end)` parameter pairs along the original segment.
#[must_use]
pub fn clip_segment_to_region(
    seg_start: &Point3,
    seg_end: &Point3,
    outer: &[Point2],
    holes: &[Vec<Point2>],
    plane: &Plane,
    tolerance: f64,
) -> Vec<(f64, f64)> {
    if outer.len() < 3 {
        return Vec::new();
    }

    let s = plane.project(seg_start);
    let e = plane.project(seg_end);
    let len = (e - s).norm();
    if len < tolerance {
        return Vec::new();
    }
    let eps = tolerance / len;

    let mut ts = vec![0.0, 1.0];
    let loops = std::iter::once(outer).chain(holes.iter().map(Vec::as_slice));
    for l in loops {
        let n = l.len();
        for i in 0..n {
            let a = &l[i];
            let b = &l[(i + 1) % n];
            if let Some((t, _)) = segment_crossing(&s, &e, a, b, tolerance) {
                ts.push(t);
            }
            // Loop vertices lying on the segment (covers collinear overlaps).
            for vertex in [a, b] {
                let t = segment_parameter(vertex, &s, &e);
                if t > 0.0 && t < 1.0 && (s + (e - s) * t - vertex).norm() <= tolerance {
                    ts.push(t);
                }
            }
        }
    }

    ts.sort_by(f64::total_cmp);
    ts.dedup_by(|a, b| (*a - *b).abs() < eps);

    let mut result: Vec<(f64, f64)> = Vec::new();
    for win in ts.windows(2) {
        let (t0, t1) = (win[0], win[1]);
        if t1 - t0 < eps {
            continue;
        }
        let mid = s + (e - s) * ((t0 + t1) * 0.5);
        if classify_point_in_region(&mid, outer, holes, tolerance) == Containment::Outside {
            continue;
        }
        // Merge with previous interval if contiguous
        if let Some(last) = result.last_mut() {
            if (t0 - last.1).abs() < eps {
                last.1 = t1;
                continue;
            }
        }
        result.push((t0, t1));
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn xy_plane() -> Plane {
        Plane::from_normal(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap()
    }

    fn project(plane: &Plane, pts: &[Point3]) -> Vec<Point2> {
        pts.iter().map(|q| plane.project(q)).collect()
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn newell_normal_of_square() {
        let n = newell_normal(&unit_square());
        assert!((n - v(0.0, 0.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn area_of_square() {
        let area = polygon_area_3d(&unit_square(), &v(0.0, 0.0, 1.0));
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clip_through_square() {
        let plane = xy_plane();
        let outer = project(&plane, &unit_square());
        let clips = clip_segment_to_region(
            &p(-1.0, 0.5, 0.0),
            &p(2.0, 0.5, 0.0),
            &outer,
            &[],
            &plane,
            1e-9,
        );
        assert_eq!(clips.len(), 1);
        assert!((clips[0].0 - 1.0 / 3.0).abs() < 1e-9);
        assert!((clips[0].1 - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn clip_skips_hole() {
        let plane = xy_plane();
        let outer = project(
            &plane,
            &[p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 4.0, 0.0), p(0.0, 4.0, 0.0)],
        );
        let hole = project(
            &plane,
            &[p(1.0, 1.0, 0.0), p(1.0, 3.0, 0.0), p(3.0, 3.0, 0.0), p(3.0, 1.0, 0.0)],
        );
        let clips = clip_segment_to_region(
            &p(0.0, 2.0, 0.0),
            &p(4.0, 2.0, 0.0),
            &outer,
            &[hole],
            &plane,
            1e-9,
        );
        assert_eq!(clips.len(), 2);
        assert!((clips[0].1 - 0.25).abs() < 1e-9);
        assert!((clips[1].0 - 0.75).abs() < 1e-9);
    }

    #[test]
    fn clip_keeps_boundary_segment() {
        let plane = xy_plane();
        let outer = project(&plane, &unit_square());
        let clips = clip_segment_to_region(
            &p(-1.0, 0.0, 0.0),
            &p(0.5, 0.0, 0.0),
            &outer,
            &[],
            &plane,
            1e-9,
        );
        assert_eq!(clips.len(), 1);
        assert!((clips[0].0 - 2.0 / 3.0).abs() < 1e-9);
        assert!((clips[0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn clip_outside_is_empty() {
        let plane = xy_plane();
        let outer = project(&plane, &unit_square());
        let clips = clip_segment_to_region(
            &p(-1.0, 2.0, 0.0),
            &p(2.0, 2.0, 0.0),
            &outer,
            &[],
            &plane,
            1e-9,
        );
        assert!(clips.is_empty());
    }
}
