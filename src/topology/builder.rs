use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::error::{OperationError, Result};
use crate::geometry::curve::LineSegment;
use crate::geometry::surface::Plane;
use crate::math::{Point3, DEFAULT_ANGULAR_TOLERANCE, DEFAULT_LINEAR_TOLERANCE};
use crate::operations::query::containment::SolidProbe;
use crate::operations::query::volume::shell_signed_volume;
use crate::validation::orient_faces;

use super::merge::{merge_coplanar_faces, PlanarFace};
use super::weld::VertexWelder;
use super::{
    EdgeData, EdgeId, FaceData, FaceId, FaceKind, HalfEdgeData, LoopData, LoopId, ShellData,
    ShellId, ShellKind, Solid, VertexData, VertexId,
};

/// A planar face described by point loops.
///
/// The outer loop winds counter-clockwise around the intended outward
/// normal; holes wind clockwise.
#[derive(Debug, Clone)]
pub struct PolygonFace {
    pub outer: Vec<Point3>,
    pub holes: Vec<Vec<Point3>>,
    pub kind: FaceKind,
}

impl PolygonFace {
    #[must_use]
    pub fn new(outer: Vec<Point3>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
            kind: FaceKind::Primary,
        }
    }

    #[must_use]
    pub fn with_holes(mut self, holes: Vec<Vec<Point3>>) -> Self {
        self.holes = holes;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: FaceKind) -> Self {
        self.kind = kind;
        self
    }

    /// The same face with every loop reversed, so its normal points the other way.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.outer.reverse();
        for h in &mut self.holes {
            h.reverse();
        }
        self
    }
}

/// Builds a [`Solid`] from polygon faces.
///
/// Points closer than the tolerance are welded into one vertex, edges that
/// pass through another vertex are split there, and each undirected vertex
/// pair becomes one edge shared by the two half-edges that use it. Faces are
/// grouped into edge-connected shells, each shell is consistently oriented,
/// and shells are sorted into the outer shell, lumps, and voids by signed
/// volume and containment.
///
/// With coplanar merging enabled, edge-adjacent faces in the same oriented
/// plane are fused and vertices left between two collinear edges are dropped.
#[derive(Debug, Clone)]
pub struct SolidBuilder {
    faces: Vec<PolygonFace>,
    tolerance: f64,
    angular_tolerance: f64,
    merge_coplanar: bool,
}

impl Default for SolidBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolidBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            faces: Vec::new(),
            tolerance: DEFAULT_LINEAR_TOLERANCE,
            angular_tolerance: DEFAULT_ANGULAR_TOLERANCE,
            merge_coplanar: false,
        }
    }

    /// Sets the welding distance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the sine of the angle below which face normals count as parallel.
    #[must_use]
    pub fn with_angular_tolerance(mut self, angular_tolerance: f64) -> Self {
        self.angular_tolerance = angular_tolerance;
        self
    }

    /// Enables merging of coplanar edge-adjacent faces.
    #[must_use]
    pub fn with_coplanar_merge(mut self, merge: bool) -> Self {
        self.merge_coplanar = merge;
        self
    }

    pub fn add_face(&mut self, face: PolygonFace) -> &mut Self {
        self.faces.push(face);
        self
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Builds the solid.
    ///
    /// The result is not validated; run
    /// [`validate_solid`](crate::validation::validate_solid) to check it.
    ///
    /// # Errors
    ///
    /// Returns an error if no non-degenerate face remains after welding.
    pub fn build(self) -> Result<Solid> {
        let tol = self.tolerance;
        let mut welder = VertexWelder::new(tol);
        let mut indexed: Vec<(Vec<Vec<usize>>, FaceKind)> = Vec::with_capacity(self.faces.len());

        for face in &self.faces {
            let mut loops = Vec::new();
            for (i, l) in std::iter::once(&face.outer).chain(face.holes.iter()).enumerate() {
                let idx = clean_loop(l.iter().map(|p| welder.weld(p)).collect());
                if idx.len() < 3 {
                    if i == 0 {
                        break;
                    }
                    continue;
                }
                loops.push(idx);
            }
            if loops.is_empty() {
                trace!("dropping face that collapsed under welding");
                continue;
            }
            indexed.push((loops, face.kind));
        }

        let points = welder.into_points();

        let mut faces: Vec<PlanarFace> = Vec::with_capacity(indexed.len());
        for (mut loops, kind) in indexed {
            for l in &mut loops {
                *l = clean_loop(split_at_t_junctions(l, &points, tol));
            }
            loops.retain(|l| l.len() >= 3);
            if loops.is_empty() {
                continue;
            }
            let outer: Vec<Point3> = loops[0].iter().map(|&i| points[i]).collect();
            match Plane::from_polygon(&outer) {
                Ok(plane) => faces.push(PlanarFace { loops, plane, kind }),
                Err(_) => trace!("dropping zero-area face"),
            }
        }

        if self.merge_coplanar {
            faces = merge_coplanar_faces(faces, &points, tol, self.angular_tolerance);
            remove_collinear_vertices(&mut faces, &points, tol);
        }

        if faces.is_empty() {
            return Err(OperationError::Failed("no faces to build a solid from".into()).into());
        }

        let mut solid = assemble(&faces, &points)?;
        classify_shells(&mut solid)?;
        debug!(
            faces = solid.face_count(),
            edges = solid.edge_count(),
            vertices = solid.vertex_count(),
            lumps = solid.lumps().len(),
            voids = solid.void_shells().len(),
            "built solid"
        );
        Ok(solid)
    }
}

/// Removes repeated vertices and back-and-forth spikes from a closed index loop.
fn clean_loop(mut idx: Vec<usize>) -> Vec<usize> {
    loop {
        let before = idx.len();
        idx.dedup();
        while idx.len() > 1 && idx.first() == idx.last() {
            idx.pop();
        }
        let n = idx.len();
        if n >= 3 {
            if let Some(i) = (0..n).find(|&i| idx[(i + n - 1) % n] == idx[(i + 1) % n]) {
                let j = (i + 1) % n;
                let (hi, lo) = if i > j { (i, j) } else { (j, i) };
                idx.remove(hi);
                idx.remove(lo);
            }
        }
        if idx.len() == before || idx.len() < 3 {
            return idx;
        }
    }
}

/// Inserts every welded point lying on the interior of a loop edge.
fn split_at_t_junctions(l: &[usize], points: &[Point3], tolerance: f64) -> Vec<usize> {
    let n = l.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (u, v) = (l[i], l[(i + 1) % n]);
        out.push(u);
        let (a, b) = (points[u], points[v]);
        let lo = a.inf(&b);
        let hi = a.sup(&b);
        let d = b - a;
        let len_sq = d.norm_squared();
        if len_sq <= tolerance * tolerance {
            continue;
        }
        let mut inner: Vec<(f64, usize)> = points
            .iter()
            .enumerate()
            .filter(|&(w, q)| {
                w != u
                    && w != v
                    && (0..3).all(|k| q[k] >= lo[k] - tolerance && q[k] <= hi[k] + tolerance)
            })
            .filter_map(|(w, q)| {
                let t = (q - a).dot(&d) / len_sq;
                (t > 0.0 && t < 1.0 && (a + d * t - q).norm() < tolerance).then_some((t, w))
            })
            .collect();
        inner.sort_by(|x, y| x.0.total_cmp(&y.0));
        out.extend(inner.into_iter().map(|(_, w)| w));
    }
    out
}

/// Drops vertices that sit between exactly two collinear edges.
fn remove_collinear_vertices(faces: &mut [PlanarFace], points: &[Point3], tolerance: f64) {
    let mut neighbors: HashMap<usize, HashSet<usize>> = HashMap::new();
    for face in faces.iter() {
        for l in &face.loops {
            let n = l.len();
            for i in 0..n {
                let (u, v) = (l[i], l[(i + 1) % n]);
                neighbors.entry(u).or_default().insert(v);
                neighbors.entry(v).or_default().insert(u);
            }
        }
    }

    let removable: HashSet<usize> = neighbors
        .iter()
        .filter_map(|(&v, adj)| {
            if adj.len() != 2 {
                return None;
            }
            let mut it = adj.iter();
            let (a, b) = (*it.next()?, *it.next()?);
            let seg = LineSegment::new(points[a], points[b]).ok()?;
            let t = seg.closest_parameter(&points[v]);
            (t > 0.0 && t < 1.0 && seg.distance_to_point(&points[v]) < tolerance).then_some(v)
        })
        .collect();

    if removable.is_empty() {
        return;
    }
    trace!(count = removable.len(), "removing collinear vertices");
    for face in faces.iter_mut() {
        for l in &mut face.loops {
            let kept: Vec<usize> = l.iter().copied().filter(|v| !removable.contains(v)).collect();
            if kept.len() >= 3 {
                *l = kept;
            }
        }
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

/// Creates arenas, pairs twins, and splits faces into edge-connected shells.
fn assemble(faces: &[PlanarFace], points: &[Point3]) -> Result<Solid> {
    let mut solid = Solid::default();
    let mut vertex_ids: HashMap<usize, VertexId> = HashMap::new();
    let mut edge_ids: HashMap<(usize, usize), EdgeId> = HashMap::new();
    let mut face_ids: Vec<FaceId> = Vec::with_capacity(faces.len());

    for face in faces {
        let face_id = solid.add_face(FaceData {
            plane: face.plane.clone(),
            outer_loop: LoopId::default(),
            inner_loops: Vec::new(),
            shell: ShellId::default(),
            kind: face.kind,
        });
        let mut loop_ids = Vec::with_capacity(face.loops.len());
        for l in &face.loops {
            let loop_id = solid.add_loop(LoopData {
                face: face_id,
                half_edges: Vec::new(),
            });
            let n = l.len();
            let mut hes = Vec::with_capacity(n);
            for i in 0..n {
                let (u, v) = (l[i], l[(i + 1) % n]);
                let mut vertex = |k: usize, solid: &mut Solid| {
                    *vertex_ids
                        .entry(k)
                        .or_insert_with(|| solid.add_vertex(VertexData::new(points[k])))
                };
                let origin = vertex(u, &mut solid);
                let key = undirected(u, v);
                let edge = if let Some(&e) = edge_ids.get(&key) {
                    e
                } else {
                    let start = vertex(key.0, &mut solid);
                    let end = vertex(key.1, &mut solid);
                    let curve = LineSegment::new(points[key.0], points[key.1])?;
                    let e = solid.add_edge(EdgeData { start, end, curve });
                    edge_ids.insert(key, e);
                    e
                };
                hes.push(solid.add_half_edge(HalfEdgeData {
                    edge,
                    origin,
                    loop_id,
                    twin: None,
                }));
            }
            solid.face_loop_mut(loop_id)?.half_edges = hes;
            loop_ids.push(loop_id);
        }
        let data = solid.face_mut(face_id)?;
        data.outer_loop = loop_ids[0];
        data.inner_loops = loop_ids[1..].to_vec();
        face_ids.push(face_id);
    }

    let face_index: HashMap<FaceId, usize> =
        face_ids.iter().enumerate().map(|(i, &f)| (f, i)).collect();
    let mut parent: Vec<usize> = (0..face_ids.len()).collect();
    let mut uses: Vec<(EdgeId, Vec<_>)> = solid.edge_uses().into_iter().collect();
    uses.sort_by_key(|(e, _)| *e);
    for (edge, hes) in &uses {
        if hes.len() == 2 {
            solid.half_edge_mut(hes[0])?.twin = Some(hes[1]);
            solid.half_edge_mut(hes[1])?.twin = Some(hes[0]);
        } else {
            trace!(?edge, uses = hes.len(), "edge is not shared by exactly two faces");
        }
        let faces_of: Vec<usize> = hes
            .iter()
            .map(|&h| Ok(face_index[&solid.half_edge_face(h)?]))
            .collect::<Result<_>>()?;
        for w in faces_of.windows(2) {
            let (a, b) = (find(&mut parent, w[0]), find(&mut parent, w[1]));
            if a != b {
                parent[a] = b;
            }
        }
    }

    let mut components: BTreeMap<usize, Vec<FaceId>> = BTreeMap::new();
    for (i, &f) in face_ids.iter().enumerate() {
        components.entry(find(&mut parent, i)).or_default().push(f);
    }
    for shell_faces in components.into_values() {
        let shell = solid.add_shell(ShellData {
            faces: shell_faces.clone(),
            kind: ShellKind::Outer,
        });
        for f in shell_faces {
            solid.face_mut(f)?.shell = shell;
        }
    }

    Ok(solid)
}

/// Orients every shell and assigns outer, lump, and void roles.
fn classify_shells(solid: &mut Solid) -> Result<()> {
    let shells: Vec<ShellId> = solid.shells().map(|(id, _)| id).collect();
    for &shell in &shells {
        match orient_faces(solid, shell) {
            Ok(report) if !report.conflicts.is_empty() => {
                warn!(?shell, conflicts = report.conflicts.len(), "shell is not orientable");
            }
            Ok(_) => {}
            Err(err) => warn!(?shell, %err, "could not orient shell"),
        }
    }

    let mut outers: Vec<(ShellId, f64)> = Vec::new();
    let mut negatives: Vec<ShellId> = Vec::new();
    for &shell in &shells {
        let volume = shell_signed_volume(solid, shell)?;
        if volume >= 0.0 {
            outers.push((shell, volume));
        } else {
            negatives.push(shell);
        }
    }

    let mut voids = Vec::new();
    for shell in negatives {
        let sample = match solid.shell_vertices(shell)?.first() {
            Some(&v) => solid.vertex(v)?.point,
            None => continue,
        };
        let mut contained = false;
        for &(outer, _) in &outers {
            if SolidProbe::for_shells(solid, &[outer])?.winding_number(&sample) > 0.5 {
                contained = true;
                break;
            }
        }
        if contained {
            solid.shell_mut(shell)?.kind = ShellKind::Void;
            voids.push(shell);
        } else {
            warn!(?shell, "inverted shell outside all material, flipping");
            let faces = solid.shell_faces(shell)?.to_vec();
            for f in faces {
                solid.flip_face(f)?;
            }
            let volume = shell_signed_volume(solid, shell)?;
            outers.push((shell, volume));
        }
    }

    outers.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut iter = outers.into_iter().map(|(s, _)| s);
    let outer = iter
        .next()
        .ok_or_else(|| OperationError::Failed("solid has no outer shell".into()))?;
    let lumps: Vec<ShellId> = iter.collect();
    solid.set_shell_roles(outer, lumps, voids);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::volume::Volume;
    use crate::validation::validate_solid;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Six outward-facing quads of an axis-aligned box.
    fn box_faces(min: Point3, max: Point3) -> Vec<PolygonFace> {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        vec![
            PolygonFace::new(vec![p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)]),
            PolygonFace::new(vec![p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)]),
            PolygonFace::new(vec![p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)]),
            PolygonFace::new(vec![p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1), p(x1, y1, z0)]),
            PolygonFace::new(vec![p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)]),
            PolygonFace::new(vec![p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)]),
        ]
    }

    fn build(faces: Vec<PolygonFace>) -> Solid {
        let mut builder = SolidBuilder::new();
        for f in faces {
            builder.add_face(f);
        }
        builder.build().unwrap()
    }

    #[test]
    fn clean_loop_removes_duplicates_and_spikes() {
        assert_eq!(clean_loop(vec![0, 1, 1, 2, 3, 0]), vec![0, 1, 2, 3]);
        assert_eq!(clean_loop(vec![0, 1, 2, 5, 2, 3]), vec![0, 1, 2, 3]);
        assert!(clean_loop(vec![0, 1, 0]).len() < 3);
    }

    #[test]
    fn box_has_expected_counts() {
        let solid = build(box_faces(p(0.0, 0.0, 0.0), p(1.0, 2.0, 3.0)));
        assert_eq!(solid.face_count(), 6);
        assert_eq!(solid.edge_count(), 12);
        assert_eq!(solid.vertex_count(), 8);
        assert!(validate_solid(&solid).valid);
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - 6.0).abs() < 1e-9);
    }

    #[test]
    fn welding_absorbs_small_gaps() {
        let mut faces = box_faces(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        faces[1].outer[0].x += 1e-9;
        let solid = build(faces);
        assert_eq!(solid.vertex_count(), 8);
        assert!(validate_solid(&solid).valid);
    }

    #[test]
    fn one_flipped_face_is_reoriented() {
        let mut faces = box_faces(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let top = faces.remove(1).reversed();
        faces.push(top);
        let solid = build(faces);
        assert!(validate_solid(&solid).valid);
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fully_inverted_shell_is_flipped_outward() {
        let faces: Vec<PolygonFace> = box_faces(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .into_iter()
            .map(PolygonFace::reversed)
            .collect();
        let solid = build(faces);
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - 1.0).abs() < 1e-9);
    }

    #[test]
    fn nested_inverted_box_becomes_void() {
        let mut faces = box_faces(p(0.0, 0.0, 0.0), p(4.0, 4.0, 4.0));
        faces.extend(
            box_faces(p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0))
                .into_iter()
                .map(PolygonFace::reversed),
        );
        let solid = build(faces);
        assert_eq!(solid.void_shells().len(), 1);
        assert!(solid.lumps().is_empty());
        assert!(validate_solid(&solid).valid);
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - 56.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_boxes_become_lumps() {
        let mut faces = box_faces(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        faces.extend(box_faces(p(3.0, 0.0, 0.0), p(5.0, 1.0, 1.0)));
        let solid = build(faces);
        assert_eq!(solid.lumps().len(), 1);
        // Larger piece is the primary outer shell.
        assert_eq!(solid.shell(solid.outer_shell()).unwrap().faces.len(), 6);
        let volume = Volume::new(&solid).execute().unwrap();
        assert!((volume - 3.0).abs() < 1e-9);
    }

    #[test]
    fn t_junction_is_split() {
        // Top face split in two; the side faces keep their single top edge.
        let mut faces = box_faces(p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0));
        faces.remove(1);
        faces.push(PolygonFace::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ]));
        faces.push(PolygonFace::new(vec![
            p(1.0, 0.0, 1.0),
            p(2.0, 0.0, 1.0),
            p(2.0, 1.0, 1.0),
            p(1.0, 1.0, 1.0),
        ]));
        let solid = build(faces);
        assert!(validate_solid(&solid).valid);
        assert_eq!(solid.face_count(), 7);
    }

    #[test]
    fn coplanar_merge_restores_single_face() {
        let mut faces = box_faces(p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0));
        faces.remove(1);
        faces.push(PolygonFace::new(vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ]));
        faces.push(PolygonFace::new(vec![
            p(1.0, 0.0, 1.0),
            p(2.0, 0.0, 1.0),
            p(2.0, 1.0, 1.0),
            p(1.0, 1.0, 1.0),
        ]));
        let mut builder = SolidBuilder::new().with_coplanar_merge(true);
        for f in faces {
            builder.add_face(f);
        }
        let solid = builder.build().unwrap();
        assert!(validate_solid(&solid).valid);
        assert_eq!(solid.face_count(), 6);
        assert_eq!(solid.vertex_count(), 8);
    }
}
