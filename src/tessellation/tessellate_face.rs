use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::math::Point3;
use crate::topology::{FaceId, Solid};

use super::{TessellationParams, TriangleMesh};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Tessellates one planar face, holes included.
pub struct TessellateFace<'a> {
    solid: &'a Solid,
    face: FaceId,
    params: TessellationParams,
}

impl<'a> TessellateFace<'a> {
    #[must_use]
    pub fn new(solid: &'a Solid, face: FaceId, params: TessellationParams) -> Self {
        Self {
            solid,
            face,
            params,
        }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// Triangles are wound counter-clockwise around the face's outward
    /// normal and reuse the face's vertex positions exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid, the face is missing
    /// or its loops cannot be triangulated.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let min_area = self.params.min_triangle_area;
        if !min_area.is_finite() || min_area < 0.0 {
            return Err(TessellationError::InvalidParameters(format!(
                "minimum triangle area {min_area} must be finite and non-negative"
            ))
            .into());
        }
        let face = self.solid.face(self.face)?;
        let polygon = self.solid.face_polygon(self.face)?;
        let plane = &face.plane;
        let normal = *plane.plane_normal();

        let mut cdt = Cdt::new();
        let mut corners: HashMap<usize, Point3> = HashMap::new();
        for points in std::iter::once(&polygon.outer).chain(&polygon.holes) {
            insert_constraint_loop(&mut cdt, points, &mut corners, |p| {
                let uv = plane.project(p);
                SpadePoint2::new(uv.x, uv.y)
            })?;
        }

        let interior = classify_interior_faces(&cdt);
        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();

        for triangle in cdt.inner_faces() {
            if !interior.contains(&triangle.fix().index()) {
                continue;
            }
            let verts = triangle.vertices();
            let [a, b, c] = verts.map(|v| v.position());
            let doubled = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
            if doubled.abs() / 2.0 < min_area {
                continue;
            }

            let mut tri = [0u32; 3];
            for (slot, vh) in tri.iter_mut().zip(verts) {
                let idx = vh.fix().index();
                *slot = *vertex_map.entry(idx).or_insert_with(|| {
                    let pos = vh.position();
                    let uv = crate::math::Point2::new(pos.x, pos.y);
                    let point = corners
                        .get(&idx)
                        .copied()
                        .unwrap_or_else(|| plane.unproject(&uv));
                    mesh.vertices.push(point);
                    mesh.normals.push(normal);
                    mesh.uvs.push(uv);
                    (mesh.vertices.len() - 1) as u32
                });
            }
            mesh.indices.push(tri);
            mesh.faces.push(self.face);
        }

        Ok(mesh)
    }
}

/// Inserts a closed loop of points as constraint edges, recording which
/// 3D point each CDT vertex came from.
fn insert_constraint_loop(
    cdt: &mut Cdt,
    points: &[Point3],
    corners: &mut HashMap<usize, Point3>,
    project: impl Fn(&Point3) -> SpadePoint2<f64>,
) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for point in points {
        let h = cdt
            .insert(project(point))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        corners.entry(h.index()).or_insert(*point);
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the polygon.
///
/// Flood-fills from the faces next to the outer face at depth 0; crossing a
/// constraint edge increments the depth. Odd depth is interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, next);
            if next % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }

    interior
}
