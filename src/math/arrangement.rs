//! Planar subdivision of a face region by cut segments.
//!
//! The region boundary and the cuts are noded against each other, welded,
//! stripped of dangling pieces, and the resulting planar graph is walked
//! face by face. Counter-clockwise cycles become bounded regions and
//! clockwise cycles become holes of the smallest region around them.

use std::collections::{BTreeSet, HashSet};

use super::polygon_2d::{
    classify_point_in_region, interior_point, point_segment_distance, segment_crossing,
    segment_parameter, sharpest_left_turn, signed_area, winding_number, Containment,
};
use super::Point2;

/// A planar region: counter-clockwise outer loop with clockwise holes.
#[derive(Debug, Clone)]
pub struct Region {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Region {
    /// Net area of the region.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area(&self.outer) + self.holes.iter().map(|h| signed_area(h)).sum::<f64>()
    }
}

/// Welded point set with linear lookup.
struct Nodes {
    points: Vec<Point2>,
    tolerance: f64,
}

impl Nodes {
    fn index_of(&mut self, p: Point2) -> usize {
        if let Some(i) = self
            .points
            .iter()
            .position(|q| (q - p).norm() <= self.tolerance)
        {
            return i;
        }
        self.points.push(p);
        self.points.len() - 1
    }
}

fn undirected(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Splits the region `outer` minus `holes` along `cuts`.
///
/// Returns every sub-region whose interior lies inside the original region.
/// Cuts that only touch the boundary, or dangle without closing off an
/// area, leave the region whole.
#[must_use]
pub fn split_region(
    outer: &[Point2],
    holes: &[Vec<Point2>],
    cuts: &[(Point2, Point2)],
    tolerance: f64,
) -> Vec<Region> {
    let mut segments: Vec<(Point2, Point2)> = Vec::new();
    for l in std::iter::once(outer).chain(holes.iter().map(Vec::as_slice)) {
        let n = l.len();
        for i in 0..n {
            segments.push((l[i], l[(i + 1) % n]));
        }
    }
    segments.extend_from_slice(cuts);
    segments.retain(|(a, b)| (b - a).norm() > tolerance);

    let mut nodes = Nodes {
        points: Vec::new(),
        tolerance,
    };
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();

    for (i, (a, b)) in segments.iter().enumerate() {
        let eps = tolerance / (b - a).norm();
        let mut ts = vec![0.0, 1.0];
        for (j, (c, d)) in segments.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some((t, _)) = segment_crossing(a, b, c, d, tolerance) {
                ts.push(t);
            }
            for q in [c, d] {
                let t = segment_parameter(q, a, b);
                if t > 0.0 && t < 1.0 && point_segment_distance(q, a, b) <= tolerance {
                    ts.push(t);
                }
            }
        }
        ts.sort_by(f64::total_cmp);
        ts.dedup_by(|x, y| (*x - *y).abs() < eps);

        let ids: Vec<usize> = ts
            .iter()
            .map(|t| nodes.index_of(a + (b - a) * *t))
            .collect();
        for w in ids.windows(2) {
            if w[0] != w[1] {
                edges.insert(undirected(w[0], w[1]));
            }
        }
    }

    // Welding can drift a node onto the interior of an edge it was not split against.
    let points = nodes.points;
    let snapshot: Vec<(usize, usize)> = edges.iter().copied().collect();
    for (u, v) in snapshot {
        let (a, b) = (points[u], points[v]);
        let mut inner: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .filter(|(w, _)| *w != u && *w != v)
            .filter_map(|(w, q)| {
                let t = segment_parameter(q, &a, &b);
                (t > 0.0 && t < 1.0 && point_segment_distance(q, &a, &b) <= tolerance)
                    .then_some((t, w))
            })
            .collect();
        if inner.is_empty() {
            continue;
        }
        inner.sort_by(|x, y| x.0.total_cmp(&y.0));
        edges.remove(&(u, v));
        let chain: Vec<usize> = std::iter::once(u)
            .chain(inner.into_iter().map(|(_, w)| w))
            .chain(std::iter::once(v))
            .collect();
        for w in chain.windows(2) {
            if w[0] != w[1] {
                edges.insert(undirected(w[0], w[1]));
            }
        }
    }

    // Prune dangling edges.
    loop {
        let mut degree = vec![0usize; points.len()];
        for &(u, v) in &edges {
            degree[u] += 1;
            degree[v] += 1;
        }
        let before = edges.len();
        edges.retain(|&(u, v)| degree[u] > 1 && degree[v] > 1);
        if edges.len() == before {
            break;
        }
    }

    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for &(u, v) in &edges {
        neighbors[u].push(v);
        neighbors[v].push(u);
    }

    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut cycles: Vec<Vec<usize>> = Vec::new();
    for &(u, v) in &edges {
        for (s, t) in [(u, v), (v, u)] {
            if visited.contains(&(s, t)) {
                continue;
            }
            let mut cycle = Vec::new();
            let (mut from, mut to) = (s, t);
            let closed = loop {
                if !visited.insert((from, to)) {
                    break (from, to) == (s, t) && !cycle.is_empty();
                }
                cycle.push(from);
                let candidates = neighbors[to].iter().map(|&w| (w, points[w]));
                let Some(next) = sharpest_left_turn(&points[to], &points[from], candidates) else {
                    break false;
                };
                from = to;
                to = next;
            };
            if closed && cycle.len() >= 3 {
                cycles.push(cycle);
            }
        }
    }

    let mut parent: Vec<usize> = (0..points.len()).collect();
    for &(u, v) in &edges {
        let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
        if ru != rv {
            parent[ru] = rv;
        }
    }

    let area_eps = tolerance * tolerance;
    let to_points = |c: &[usize]| -> Vec<Point2> { c.iter().map(|&i| points[i]).collect() };

    let mut faces: Vec<(Vec<Point2>, f64, usize)> = Vec::new();
    let mut boundaries: Vec<(Vec<Point2>, usize)> = Vec::new();
    for cycle in &cycles {
        let pts = to_points(cycle);
        let area = signed_area(&pts);
        let component = find(&mut parent, cycle[0]);
        if area > area_eps {
            faces.push((pts, area, component));
        } else if area < -area_eps {
            boundaries.push((pts, component));
        }
    }

    let mut regions: Vec<Region> = faces
        .iter()
        .map(|(pts, _, _)| Region {
            outer: pts.clone(),
            holes: Vec::new(),
        })
        .collect();

    for (boundary, component) in boundaries {
        let probe = boundary[0];
        let host = faces
            .iter()
            .enumerate()
            .filter(|(_, (pts, _, c))| *c != component && winding_number(&probe, pts) != 0)
            .min_by(|(_, x), (_, y)| x.1.total_cmp(&y.1))
            .map(|(i, _)| i);
        if let Some(i) = host {
            regions[i].holes.push(boundary);
        }
    }

    regions.retain(|region| {
        interior_point(&region.outer, &region.holes).is_some_and(|p| {
            classify_point_in_region(&p, outer, holes, tolerance) == Containment::Inside
        })
    });
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![q(x0, y0), q(x1, y0), q(x1, y1), q(x0, y1)]
    }

    fn total_area(regions: &[Region]) -> f64 {
        regions.iter().map(Region::area).sum()
    }

    #[test]
    fn no_cuts_returns_whole_region() {
        let regions = split_region(&square(0.0, 0.0, 1.0, 1.0), &[], &[], 1e-9);
        assert_eq!(regions.len(), 1);
        assert!((total_area(&regions) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn chord_splits_in_two() {
        let cuts = [(q(0.5, -1.0), q(0.5, 2.0))];
        let regions = split_region(&square(0.0, 0.0, 1.0, 1.0), &[], &cuts, 1e-9);
        assert_eq!(regions.len(), 2);
        for r in &regions {
            assert!((r.area() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn crossing_chords_split_in_four() {
        let cuts = [(q(0.5, 0.0), q(0.5, 1.0)), (q(0.0, 0.5), q(1.0, 0.5))];
        let regions = split_region(&square(0.0, 0.0, 1.0, 1.0), &[], &cuts, 1e-9);
        assert_eq!(regions.len(), 4);
        assert!((total_area(&regions) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn closed_interior_cut_makes_island_and_hole() {
        let inner = square(1.0, 1.0, 2.0, 2.0);
        let cuts: Vec<(Point2, Point2)> = (0..4).map(|i| (inner[i], inner[(i + 1) % 4])).collect();
        let regions = split_region(&square(0.0, 0.0, 3.0, 3.0), &[], &cuts, 1e-9);
        assert_eq!(regions.len(), 2);
        let ring = regions.iter().find(|r| !r.holes.is_empty()).unwrap();
        assert!((ring.area() - 8.0).abs() < 1e-12);
        let island = regions.iter().find(|r| r.holes.is_empty()).unwrap();
        assert!((island.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dangling_cut_is_ignored() {
        let cuts = [(q(0.0, 0.5), q(0.5, 0.5))];
        let regions = split_region(&square(0.0, 0.0, 1.0, 1.0), &[], &cuts, 1e-9);
        assert_eq!(regions.len(), 1);
        assert!((regions[0].area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cut_along_boundary_keeps_region() {
        let cuts = [(q(-1.0, 0.0), q(2.0, 0.0))];
        let regions = split_region(&square(0.0, 0.0, 1.0, 1.0), &[], &cuts, 1e-9);
        assert_eq!(regions.len(), 1);
        assert!((regions[0].area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hole_is_preserved_and_excluded() {
        let mut hole = square(1.0, 1.0, 2.0, 2.0);
        hole.reverse();
        let cuts = [(q(0.5, -1.0), q(0.5, 4.0))];
        let regions = split_region(&square(0.0, 0.0, 3.0, 3.0), &[hole], &cuts, 1e-9);
        assert_eq!(regions.len(), 2);
        assert!((total_area(&regions) - 8.0).abs() < 1e-12);
        assert!(regions.iter().any(|r| r.holes.len() == 1));
    }

    #[test]
    fn cut_through_hole_splits_ring() {
        let mut hole = square(1.0, 1.0, 2.0, 2.0);
        hole.reverse();
        let cuts = [(q(1.5, -1.0), q(1.5, 4.0))];
        let regions = split_region(&square(0.0, 0.0, 3.0, 3.0), &[hole], &cuts, 1e-9);
        assert_eq!(regions.len(), 2);
        for r in &regions {
            assert!(r.holes.is_empty());
            assert!((r.area() - 4.0).abs() < 1e-12);
        }
    }
}
