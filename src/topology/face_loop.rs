use super::face::FaceId;
use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a loop of a solid.
    pub struct LoopId;
}

/// A closed cycle of half-edges bounding a face.
///
/// Outer loops wind counter-clockwise around the face's outward normal;
/// inner loops wind clockwise.
#[derive(Debug, Clone)]
pub struct LoopData {
    /// The face this loop bounds.
    pub face: FaceId,
    /// Half-edges in traversal order; each one ends where the next begins.
    pub half_edges: Vec<HalfEdgeId>,
}
