//! Traversal helpers over a [`Solid`]'s half-edge structure.

use std::collections::{HashMap, HashSet};

use crate::error::TopologyError;
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{EdgeId, FaceId, HalfEdgeId, LoopId, ShellId, Solid, VertexId};

/// A face's boundary as point loops.
#[derive(Debug, Clone)]
pub struct FacePolygon {
    /// Counter-clockwise around the outward normal.
    pub outer: Vec<Point3>,
    /// Clockwise around the outward normal.
    pub holes: Vec<Vec<Point3>>,
}

impl Solid {
    /// Vertex where a half-edge ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its edge is missing, or the
    /// half-edge's origin is not an endpoint of its edge.
    pub fn half_edge_target(&self, id: HalfEdgeId) -> Result<VertexId, TopologyError> {
        let he = self.half_edge(id)?;
        self.edge(he.edge)?.other_end(he.origin).ok_or_else(|| {
            TopologyError::InvalidTopology("half-edge origin is not on its edge".into())
        })
    }

    /// Position of a half-edge within its loop.
    fn loop_position(&self, id: HalfEdgeId) -> Result<(LoopId, usize), TopologyError> {
        let loop_id = self.half_edge(id)?.loop_id;
        let index = self
            .face_loop(loop_id)?
            .half_edges
            .iter()
            .position(|&h| h == id)
            .ok_or_else(|| {
                TopologyError::InvalidTopology("half-edge missing from its loop".into())
            })?;
        Ok((loop_id, index))
    }

    /// The half-edge following `id` in its loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its loop is missing.
    pub fn next_half_edge(&self, id: HalfEdgeId) -> Result<HalfEdgeId, TopologyError> {
        let (loop_id, index) = self.loop_position(id)?;
        let hes = &self.face_loop(loop_id)?.half_edges;
        Ok(hes[(index + 1) % hes.len()])
    }

    /// The half-edge preceding `id` in its loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its loop is missing.
    pub fn prev_half_edge(&self, id: HalfEdgeId) -> Result<HalfEdgeId, TopologyError> {
        let (loop_id, index) = self.loop_position(id)?;
        let hes = &self.face_loop(loop_id)?.half_edges;
        Ok(hes[(index + hes.len() - 1) % hes.len()])
    }

    /// The face a half-edge bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its loop is missing.
    pub fn half_edge_face(&self, id: HalfEdgeId) -> Result<FaceId, TopologyError> {
        Ok(self.face_loop(self.half_edge(id)?.loop_id)?.face)
    }

    /// Origins of a loop's half-edges, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop or one of its half-edges is missing.
    pub fn loop_vertices(&self, id: LoopId) -> Result<Vec<VertexId>, TopologyError> {
        self.face_loop(id)?
            .half_edges
            .iter()
            .map(|&h| Ok(self.half_edge(h)?.origin))
            .collect()
    }

    /// Positions of a loop's vertices, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop or one of its entities is missing.
    pub fn loop_points(&self, id: LoopId) -> Result<Vec<Point3>, TopologyError> {
        self.loop_vertices(id)?
            .into_iter()
            .map(|v| Ok(self.vertex(v)?.point))
            .collect()
    }

    /// Outer and inner boundary of a face as point loops.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its entities is missing.
    pub fn face_polygon(&self, id: FaceId) -> Result<FacePolygon, TopologyError> {
        let face = self.face(id)?;
        let outer = self.loop_points(face.outer_loop)?;
        let holes = face
            .inner_loops
            .iter()
            .map(|&l| self.loop_points(l))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FacePolygon { outer, holes })
    }

    /// All half-edges of a face, outer loop first.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its loops is missing.
    pub fn face_half_edges(&self, id: FaceId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let mut out = Vec::new();
        for l in self.face(id)?.loops() {
            out.extend_from_slice(&self.face_loop(l)?.half_edges);
        }
        Ok(out)
    }

    /// Newell normal of a face's outer loop, normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or encloses no area.
    pub fn calculate_normal(&self, id: FaceId) -> Result<Vector3, TopologyError> {
        let pts = self.loop_points(self.face(id)?.outer_loop)?;
        let n = newell_normal(&pts);
        let len = n.norm();
        if len < TOLERANCE {
            return Err(TopologyError::InvalidTopology("face has zero area".into()));
        }
        Ok(n / len)
    }

    /// Faces of a shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell is missing.
    pub fn shell_faces(&self, id: ShellId) -> Result<&[FaceId], TopologyError> {
        Ok(&self.shell(id)?.faces)
    }

    /// All half-edges of a shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its entities is missing.
    pub fn shell_half_edges(&self, id: ShellId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let mut out = Vec::new();
        for &f in self.shell_faces(id)? {
            out.extend(self.face_half_edges(f)?);
        }
        Ok(out)
    }

    /// Distinct edges of a shell, in first-use order.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its entities is missing.
    pub fn shell_edges(&self, id: ShellId) -> Result<Vec<EdgeId>, TopologyError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for h in self.shell_half_edges(id)? {
            let e = self.half_edge(h)?.edge;
            if seen.insert(e) {
                out.push(e);
            }
        }
        Ok(out)
    }

    /// Distinct vertices of a shell, in first-use order.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its entities is missing.
    pub fn shell_vertices(&self, id: ShellId) -> Result<Vec<VertexId>, TopologyError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for h in self.shell_half_edges(id)? {
            let v = self.half_edge(h)?.origin;
            if seen.insert(v) {
                out.push(v);
            }
        }
        Ok(out)
    }

    /// Maps every edge to the half-edges that use it.
    #[must_use]
    pub fn edge_uses(&self) -> HashMap<EdgeId, Vec<HalfEdgeId>> {
        let mut uses: HashMap<EdgeId, Vec<HalfEdgeId>> = HashMap::new();
        for (id, he) in self.half_edges() {
            uses.entry(he.edge).or_default().push(id);
        }
        uses
    }

    /// Edges that share a vertex with `id`, excluding `id` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing.
    pub fn adjacent_edges(&self, id: EdgeId) -> Result<Vec<EdgeId>, TopologyError> {
        let edge = self.edge(id)?;
        let (a, b) = (edge.start, edge.end);
        Ok(self
            .edges()
            .filter(|(other, e)| {
                *other != id && (e.start == a || e.end == a || e.start == b || e.end == b)
            })
            .map(|(other, _)| other)
            .collect())
    }

    /// Reverses a face's orientation: loop order, half-edge origins, and plane.
    ///
    /// Twin links are unchanged since each half-edge keeps its edge.
    pub(crate) fn flip_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let loops: Vec<LoopId> = self.face(id)?.loops().collect();
        for l in loops {
            let hes = self.face_loop(l)?.half_edges.clone();
            let targets = hes
                .iter()
                .map(|&h| self.half_edge_target(h))
                .collect::<Result<Vec<_>, _>>()?;
            for (&h, t) in hes.iter().zip(targets) {
                self.half_edge_mut(h)?.origin = t;
            }
            self.face_loop_mut(l)?.half_edges.reverse();
        }
        let face = self.face_mut(id)?;
        face.plane = face.plane.flipped();
        Ok(())
    }
}
