//! Merging of coplanar, edge-adjacent faces.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::trace;

use crate::geometry::surface::Plane;
use crate::math::polygon_2d::{interior_point, sharpest_left_turn, signed_area, winding_number};
use crate::math::{Point2, Point3};

use super::face::FaceKind;

/// A face as welded point indices, outer loop first.
#[derive(Debug, Clone)]
pub(super) struct PlanarFace {
    pub loops: Vec<Vec<usize>>,
    pub plane: Plane,
    pub kind: FaceKind,
}

impl PlanarFace {
    fn directed_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.loops.iter().flat_map(|l| {
            let n = l.len();
            (0..n).map(move |i| (l[i], l[(i + 1) % n]))
        })
    }

    fn has_self_cancelling_edge(&self) -> bool {
        let edges: HashSet<(usize, usize)> = self.directed_edges().collect();
        edges.iter().any(|&(u, v)| edges.contains(&(v, u)))
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Groups faces of one kind that lie in the same oriented plane.
fn plane_groups(
    faces: &[PlanarFace],
    points: &[Point3],
    tolerance: f64,
    angular_tolerance: f64,
) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, face) in faces.iter().enumerate() {
        let found = groups.iter_mut().find(|g| {
            let rep = &faces[g[0]].plane;
            faces[g[0]].kind == face.kind
                && rep.same_orientation(&face.plane)
                && rep.plane_normal().cross(face.plane.plane_normal()).norm() < angular_tolerance
                && face
                    .loops
                    .iter()
                    .flatten()
                    .all(|&v| rep.signed_distance(&points[v]).abs() < tolerance)
        });
        match found {
            Some(g) => g.push(i),
            None => groups.push(vec![i]),
        }
    }
    groups
}

/// Merges coplanar faces that share an edge into single faces.
///
/// Shared edges cancel out; the remaining boundary is re-chained into outer
/// loops (counter-clockwise) and holes (clockwise). Faces that share only a
/// vertex stay separate.
pub(super) fn merge_coplanar_faces(
    faces: Vec<PlanarFace>,
    points: &[Point3],
    tolerance: f64,
    angular_tolerance: f64,
) -> Vec<PlanarFace> {
    let groups = plane_groups(&faces, points, tolerance, angular_tolerance);
    let mut merged_any = false;
    let mut out: Vec<PlanarFace> = Vec::with_capacity(faces.len());

    for group in groups {
        let mut owner: HashMap<(usize, usize), usize> = HashMap::new();
        for (k, &fi) in group.iter().enumerate() {
            for e in faces[fi].directed_edges() {
                owner.insert(e, k);
            }
        }
        let mut parent: Vec<usize> = (0..group.len()).collect();
        for (k, &fi) in group.iter().enumerate() {
            for (u, v) in faces[fi].directed_edges() {
                if let Some(&other) = owner.get(&(v, u)) {
                    let (a, b) = (find(&mut parent, k), find(&mut parent, other));
                    if a != b {
                        parent[a] = b;
                    }
                }
            }
        }
        let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for k in 0..group.len() {
            let root = find(&mut parent, k);
            components.entry(root).or_default().push(group[k]);
        }

        for members in components.into_values() {
            let single = members.len() == 1;
            if single && !faces[members[0]].has_self_cancelling_edge() {
                out.push(faces[members[0]].clone());
                continue;
            }
            merged_any |= !single;
            out.extend(rebuild(&faces, &members, points, tolerance));
        }
    }

    if merged_any {
        trace!(faces = out.len(), "merged coplanar faces");
    }
    out
}

/// Re-chains the boundary of a set of coplanar faces.
fn rebuild(
    faces: &[PlanarFace],
    members: &[usize],
    points: &[Point3],
    tolerance: f64,
) -> Vec<PlanarFace> {
    let plane = faces[members[0]].plane.clone();
    let kind = faces[members[0]].kind;

    let mut count: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for &fi in members {
        for e in faces[fi].directed_edges() {
            *count.entry(e).or_default() += 1;
        }
    }
    let keys: Vec<(usize, usize)> = count.keys().copied().collect();
    for (u, v) in keys {
        let forward = count.get(&(u, v)).copied().unwrap_or(0);
        let backward = count.get(&(v, u)).copied().unwrap_or(0);
        let cancel = forward.min(backward);
        if cancel > 0 {
            count.insert((u, v), forward - cancel);
            count.insert((v, u), backward - cancel);
        }
    }
    let remaining: Vec<(usize, usize)> = count
        .into_iter()
        .filter(|&(_, c)| c > 0)
        .map(|(e, _)| e)
        .collect();

    let uv = |i: usize| -> Point2 { plane.project(&points[i]) };
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(u, v) in &remaining {
        outgoing.entry(u).or_default().push(v);
    }
    let successor = |u: usize, v: usize| -> Option<usize> {
        let candidates = outgoing.get(&v)?;
        sharpest_left_turn(&uv(v), &uv(u), candidates.iter().map(|&w| (w, uv(w))))
    };

    let mut visited: HashSet<(usize, usize)> = HashSet::new();
    let mut cycles: Vec<Vec<usize>> = Vec::new();
    for &start in &remaining {
        if visited.contains(&start) {
            continue;
        }
        let mut cycle = Vec::new();
        let (mut from, mut to) = start;
        let closed = loop {
            if !visited.insert((from, to)) {
                break (from, to) == start && !cycle.is_empty();
            }
            cycle.push(from);
            let Some(next) = successor(from, to) else {
                break false;
            };
            from = to;
            to = next;
        };
        if closed && cycle.len() >= 3 {
            cycles.push(cycle);
        } else {
            trace!(len = cycle.len(), "dropping open chain while merging faces");
        }
    }

    let area_eps = tolerance * tolerance;
    let mut outers: Vec<(Vec<usize>, f64)> = Vec::new();
    let mut holes: Vec<Vec<usize>> = Vec::new();
    for cycle in cycles {
        let pts: Vec<Point2> = cycle.iter().map(|&i| uv(i)).collect();
        let area = signed_area(&pts);
        if area > area_eps {
            outers.push((cycle, area));
        } else if area < -area_eps {
            holes.push(cycle);
        }
    }

    let mut result: Vec<PlanarFace> = outers
        .iter()
        .map(|(cycle, _)| PlanarFace {
            loops: vec![cycle.clone()],
            plane: plane.clone(),
            kind,
        })
        .collect();

    for hole in holes {
        let mut ring: Vec<Point2> = hole.iter().map(|&i| uv(i)).collect();
        ring.reverse();
        let Some(probe) = interior_point(&ring, &[]) else {
            continue;
        };
        let host = outers
            .iter()
            .enumerate()
            .filter(|(_, (cycle, _))| {
                let pts: Vec<Point2> = cycle.iter().map(|&i| uv(i)).collect();
                winding_number(&probe, &pts) != 0
            })
            .min_by(|(_, a), (_, b)| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);
        if let Some(i) = host {
            result[i].loops.push(hole);
        }
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn xy() -> Plane {
        Plane::from_normal(p(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap()
    }

    fn face(loop_: Vec<usize>) -> PlanarFace {
        PlanarFace {
            loops: vec![loop_],
            plane: xy(),
            kind: FaceKind::Primary,
        }
    }

    // 3x2 grid of points:
    // 3 4 5
    // 0 1 2
    fn grid() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(2.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn adjacent_squares_merge() {
        let faces = vec![face(vec![0, 1, 4, 3]), face(vec![1, 2, 5, 4])];
        let merged = merge_coplanar_faces(faces, &grid(), 1e-7, 1e-9);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].loops.len(), 1);
        assert_eq!(merged[0].loops[0].len(), 6);
    }

    #[test]
    fn opposite_orientation_does_not_merge() {
        let flipped = PlanarFace {
            loops: vec![vec![1, 4, 5, 2]],
            plane: xy().flipped(),
            kind: FaceKind::Primary,
        };
        let faces = vec![face(vec![0, 1, 4, 3]), flipped];
        let merged = merge_coplanar_faces(faces, &grid(), 1e-7, 1e-9);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn ring_of_faces_merges_with_hole() {
        // 4x4 grid, ring of 8 unit squares around the center one.
        let mut pts = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                pts.push(p(f64::from(x), f64::from(y), 0.0));
            }
        }
        let idx = |x: usize, y: usize| y * 4 + x;
        let mut faces = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                if x == 1 && y == 1 {
                    continue;
                }
                faces.push(face(vec![
                    idx(x, y),
                    idx(x + 1, y),
                    idx(x + 1, y + 1),
                    idx(x, y + 1),
                ]));
            }
        }
        let merged = merge_coplanar_faces(faces, &pts, 1e-7, 1e-9);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].loops.len(), 2);
    }
}
