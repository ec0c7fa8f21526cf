use crate::geometry::surface::Plane;

use super::face_loop::LoopId;
use super::shell::ShellId;

slotmap::new_key_type! {
    /// Unique identifier for a face of a solid.
    pub struct FaceId;
}

/// Where a face came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceKind {
    /// An ordinary boundary face.
    #[default]
    Primary,
    /// A facet of a rounded edge blend.
    Fillet,
    /// A flat bevel replacing an edge.
    Chamfer,
}

/// Data associated with a topological face.
///
/// A face is a bounded planar region, defined by an outer loop and
/// optionally inner loops (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The plane the face lies in, oriented along the outward normal.
    pub plane: Plane,
    /// The outer boundary loop.
    pub outer_loop: LoopId,
    /// Inner boundary loops (holes).
    pub inner_loops: Vec<LoopId>,
    /// The shell this face belongs to.
    pub shell: ShellId,
    /// Origin of the face.
    pub kind: FaceKind,
}

impl FaceData {
    /// Returns the outer loop followed by the inner loops.
    pub fn loops(&self) -> impl Iterator<Item = LoopId> + '_ {
        std::iter::once(self.outer_loop).chain(self.inner_loops.iter().copied())
    }
}
