use slotmap::SecondaryMap;

use crate::math::Point3;
use crate::topology::{EdgeId, FaceKind, Solid, VertexId};

/// One edge of a wireframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSegment {
    pub edge: EdgeId,
    /// Indices into [`Wireframe::points`].
    pub indices: [u32; 2],
    /// Both faces along the edge are facets of the same rounded blend.
    pub smooth: bool,
}

/// Edges of a solid as indexed line segments.
#[derive(Debug, Clone, Default)]
pub struct Wireframe {
    pub points: Vec<Point3>,
    pub segments: Vec<WireSegment>,
}

impl Wireframe {
    /// Segments that separate distinct surfaces.
    pub fn feature_segments(&self) -> impl Iterator<Item = &WireSegment> {
        self.segments.iter().filter(|s| !s.smooth)
    }
}

/// Wireframe of every edge of a solid.
///
/// Edges whose vertices cannot be resolved are skipped.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn solid_to_wireframe(solid: &Solid) -> Wireframe {
    let mut wireframe = Wireframe::default();
    let mut index: SecondaryMap<VertexId, u32> = SecondaryMap::new();
    for (id, vertex) in solid.vertices() {
        index.insert(id, wireframe.points.len() as u32);
        wireframe.points.push(vertex.point);
    }

    let uses = solid.edge_uses();
    for (id, edge) in solid.edges() {
        let (Some(&start), Some(&end)) = (index.get(edge.start), index.get(edge.end)) else {
            continue;
        };
        let smooth = uses.get(&id).is_some_and(|hes| {
            hes.len() == 2
                && hes.iter().all(|&he| {
                    solid
                        .half_edge_face(he)
                        .and_then(|f| solid.face(f))
                        .is_ok_and(|f| f.kind == FaceKind::Fillet)
                })
        });
        wireframe.segments.push(WireSegment {
            edge: id,
            indices: [start, end],
            smooth,
        });
    }
    wireframe
}
