use crate::geometry::curve::LineSegment;

use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge of a solid.
    pub struct EdgeId;
}

/// Data associated with a topological edge.
///
/// An edge connects two vertices and carries the straight segment between
/// them. It is shared by the two half-edges that traverse it in opposite
/// directions.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// The segment from the start vertex's point to the end vertex's point.
    pub curve: LineSegment,
}

impl EdgeData {
    /// Returns the endpoint opposite `vertex`, or `None` if `vertex` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.start {
            Some(self.end)
        } else if vertex == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}
