use crate::error::Result;
use crate::math::polygon_3d::polygon_area_3d;
use crate::topology::{FaceId, Solid};

/// Area of one face, holes excluded.
///
/// # Errors
///
/// Returns an error if the face or one of its entities is missing.
pub fn face_area(solid: &Solid, face: FaceId) -> Result<f64> {
    let normal = *solid.face(face)?.plane.plane_normal();
    let polygon = solid.face_polygon(face)?;
    let holes: f64 = polygon
        .holes
        .iter()
        .map(|h| polygon_area_3d(h, &normal))
        .sum();
    Ok(polygon_area_3d(&polygon.outer, &normal) - holes)
}

/// Computes the total surface area of a solid.
pub struct Area<'a> {
    solid: &'a Solid,
}

impl<'a> Area<'a> {
    /// Creates a new `Area` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the summed area of all faces.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of the solid is missing.
    pub fn execute(&self) -> Result<f64> {
        self.solid
            .faces()
            .map(|(id, _)| face_area(self.solid, id))
            .sum()
    }
}
