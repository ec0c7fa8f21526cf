use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::topology::{EdgeId, FaceId, ShellId, Solid};

/// Outcome of [`orient_faces`].
#[derive(Debug, Clone, Default)]
pub struct OrientReport {
    /// Faces whose orientation was reversed.
    pub flipped: Vec<FaceId>,
    /// Edges whose two faces still disagree after the pass.
    ///
    /// Non-empty only for a non-orientable shell.
    pub conflicts: Vec<EdgeId>,
}

/// Makes the face orientations of a shell consistent.
///
/// Starting from the shell's first face, a breadth-first walk across twin
/// half-edges flips every neighbor that traverses a shared edge in the same
/// direction as the face it was reached from. The walk keeps the first
/// face's orientation, so whether the shell ends up pointing outward is
/// decided separately (by signed volume). Running it twice flips nothing
/// the second time.
///
/// # Errors
///
/// Returns [`TopologyError::ShellNotConnected`] if some faces cannot be
/// reached across twin edges, or an error if an entity is missing.
pub fn orient_faces(solid: &mut Solid, shell: ShellId) -> Result<OrientReport> {
    let faces = solid.shell_faces(shell)?.to_vec();
    let mut report = OrientReport::default();
    let Some(&seed) = faces.first() else {
        return Ok(report);
    };

    let mut visited: HashSet<FaceId> = HashSet::from([seed]);
    let mut queue: VecDeque<FaceId> = VecDeque::from([seed]);
    let mut conflicts: HashSet<EdgeId> = HashSet::new();

    while let Some(face) = queue.pop_front() {
        for h in solid.face_half_edges(face)? {
            let he = solid.half_edge(h)?;
            let Some(t) = he.twin else {
                continue;
            };
            let (origin, edge) = (he.origin, he.edge);
            let neighbor = solid.half_edge_face(t)?;
            let agrees = solid.half_edge(t)?.origin != origin;
            if visited.insert(neighbor) {
                if !agrees {
                    solid.flip_face(neighbor)?;
                    report.flipped.push(neighbor);
                }
                queue.push_back(neighbor);
            } else if !agrees && conflicts.insert(edge) {
                report.conflicts.push(edge);
            }
        }
    }

    if visited.len() < faces.len() {
        return Err(TopologyError::ShellNotConnected {
            reached: visited.len(),
            total: faces.len(),
        }
        .into());
    }

    debug!(
        ?shell,
        flipped = report.flipped.len(),
        conflicts = report.conflicts.len(),
        "oriented shell"
    );
    Ok(report)
}
