use crate::error::Result;
use crate::topology::{PolygonFace, Solid, SolidBuilder};

use super::select::KeepDecision;
use super::split::FaceFragment;

/// Adds a kept fragment to the builder, flipped where requested.
///
/// Returns whether a face was added.
pub fn add_fragment(
    builder: &mut SolidBuilder,
    fragment: FaceFragment,
    decision: KeepDecision,
) -> bool {
    match decision {
        KeepDecision::Discard => false,
        KeepDecision::Keep => {
            builder.add_face(fragment.into_polygon());
            true
        }
        KeepDecision::KeepFlipped => {
            builder.add_face(fragment.into_polygon().reversed());
            true
        }
    }
}

/// Every face of `solid` as a builder polygon, keeping kinds and orientation.
///
/// # Errors
///
/// Returns an error if an entity of the solid is missing.
pub fn polygon_faces(solid: &Solid) -> Result<Vec<PolygonFace>> {
    let mut faces = Vec::with_capacity(solid.face_count());
    for shell in solid.all_shells() {
        for &id in solid.shell_faces(shell)? {
            let polygon = solid.face_polygon(id)?;
            faces.push(
                PolygonFace::new(polygon.outer)
                    .with_holes(polygon.holes)
                    .with_kind(solid.face(id)?.kind),
            );
        }
    }
    Ok(faces)
}

/// Combines two solids with no shared boundary into one compound solid.
///
/// The larger outer shell becomes the primary shell and the other becomes a
/// lump; void shells keep their role.
///
/// # Errors
///
/// Returns an error if either solid is missing an entity or the combined
/// faces cannot be built.
pub fn compound(a: &Solid, b: &Solid, tolerance: f64) -> Result<Solid> {
    let mut builder = SolidBuilder::new().with_tolerance(tolerance);
    for face in polygon_faces(a)?.into_iter().chain(polygon_faces(b)?) {
        builder.add_face(face);
    }
    builder.build()
}
