use std::f64::consts::PI;

use crate::math::{Point3, Vector3, TOLERANCE};
use crate::topology::{EdgeId, FaceId, HalfEdgeId, Solid};

use super::BlendError;

/// Local geometry of a manifold edge between two planar faces.
///
/// `t1` and `t2` are unit vectors perpendicular to the edge pointing into
/// the first and second face; `alpha` is the angle between them.
#[derive(Debug, Clone)]
pub struct EdgeFrame {
    pub edge: EdgeId,
    /// Edge start as traversed by the first face's half-edge.
    pub start: Point3,
    pub end: Point3,
    pub faces: [FaceId; 2],
    pub normals: [Vector3; 2],
    pub t1: Vector3,
    pub t2: Vector3,
    pub alpha: f64,
    /// The faces meet with material inside the angle `alpha`.
    pub convex: bool,
}

impl EdgeFrame {
    /// Measures `edge` of `solid`.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::EdgeNotFound`] for an unknown edge,
    /// [`BlendError::NotManifoldEdge`] unless exactly two twinned half-edges
    /// use it, and [`BlendError::TangentFaces`] when the faces are coplanar
    /// or fold onto each other.
    pub fn compute(
        solid: &Solid,
        edge: EdgeId,
        uses: &[HalfEdgeId],
        angular_tolerance: f64,
    ) -> Result<Self, BlendError> {
        solid.edge(edge).map_err(|_| BlendError::EdgeNotFound)?;
        let &[h1, h2] = uses else {
            return Err(BlendError::NotManifoldEdge { uses: uses.len() });
        };
        let not_manifold = |_| BlendError::NotManifoldEdge { uses: uses.len() };
        let he1 = solid.half_edge(h1).map_err(not_manifold)?;
        if he1.twin != Some(h2) {
            return Err(BlendError::NotManifoldEdge { uses: uses.len() });
        }

        let start = solid.vertex(he1.origin).map_err(not_manifold)?.point;
        let end = solid
            .vertex(solid.half_edge_target(h1).map_err(not_manifold)?)
            .map_err(not_manifold)?
            .point;
        let f1 = solid.half_edge_face(h1).map_err(not_manifold)?;
        let f2 = solid.half_edge_face(h2).map_err(not_manifold)?;
        let n1 = *solid.face(f1).map_err(not_manifold)?.plane.plane_normal();
        let n2 = *solid.face(f2).map_err(not_manifold)?.plane.plane_normal();

        let along = end - start;
        if along.norm() < TOLERANCE {
            return Err(BlendError::InvalidParameter("edge has zero length".into()));
        }
        let d = along.normalize();
        let t1 = n1.cross(&d).normalize();
        let t2 = n2.cross(&(-d)).normalize();

        let cos_alpha = t1.dot(&t2).clamp(-1.0, 1.0);
        let alpha = cos_alpha.acos();
        if alpha.sin() < angular_tolerance || PI - alpha < angular_tolerance {
            return Err(BlendError::TangentFaces);
        }

        Ok(Self {
            edge,
            start,
            end,
            faces: [f1, f2],
            normals: [n1, n2],
            t1,
            t2,
            alpha,
            convex: t2.dot(&n1) < 0.0,
        })
    }

    #[must_use]
    pub fn direction(&self) -> Vector3 {
        (self.end - self.start).normalize()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Offset directions normal to each face, pointing away from the wedge.
    #[must_use]
    pub fn away_from_wedge(&self) -> [Vector3; 2] {
        let [n1, n2] = self.normals;
        [
            -self.t2.dot(&n1).signum() * n1,
            -self.t1.dot(&n2).signum() * n2,
        ]
    }
}
