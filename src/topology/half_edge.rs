use super::edge::EdgeId;
use super::face_loop::LoopId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge of a solid.
    pub struct HalfEdgeId;
}

/// One directed use of an edge by a face loop.
///
/// The successor and predecessor are implied by the owning loop's ordering.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// The underlying undirected edge.
    pub edge: EdgeId,
    /// Vertex this half-edge starts at.
    pub origin: VertexId,
    /// The loop this half-edge belongs to.
    pub loop_id: LoopId,
    /// The oppositely directed half-edge on the neighboring face.
    ///
    /// `None` only on a broken, non-manifold boundary.
    pub twin: Option<HalfEdgeId>,
}
