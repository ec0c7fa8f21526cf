use crate::error::Result;
use crate::topology::{ShellId, Solid};

/// Signed volume enclosed by one shell, by the divergence theorem.
///
/// Each face loop is fanned into triangles and each triangle contributes the
/// signed volume of its tetrahedron with the origin. Holes wind opposite to
/// their outer loop, so they subtract themselves. Positive for an outward
/// oriented shell, negative for an inward (void) one.
///
/// # Errors
///
/// Returns an error if an entity of the shell is missing.
pub fn shell_signed_volume(solid: &Solid, shell: ShellId) -> Result<f64> {
    let mut six_volume = 0.0;
    for &face in solid.shell_faces(shell)? {
        for l in solid.face(face)?.loops() {
            let pts = solid.loop_points(l)?;
            let Some(first) = pts.first() else {
                continue;
            };
            for w in pts.windows(2).skip(1) {
                six_volume += first.coords.dot(&w[0].coords.cross(&w[1].coords));
            }
        }
    }
    Ok(six_volume / 6.0)
}

/// Computes the volume of a solid.
///
/// Sums the signed volume of every shell: outer shells and lumps add,
/// voids subtract.
pub struct Volume<'a> {
    solid: &'a Solid,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the enclosed volume.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of the solid is missing.
    pub fn execute(&self) -> Result<f64> {
        self.solid
            .all_shells()
            .into_iter()
            .map(|s| shell_signed_volume(self.solid, s))
            .sum()
    }
}
