use tracing::debug;

use crate::error::Result;
use crate::topology::Solid;

use super::{TessellateFace, TessellationParams, TriangleMesh};

/// Tessellates every face of every shell of a solid into one mesh.
pub struct TessellateSolid<'a> {
    solid: &'a Solid,
    params: TessellationParams,
}

impl<'a> TessellateSolid<'a> {
    #[must_use]
    pub fn new(solid: &'a Solid) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the tessellation, returning a combined triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if any face cannot be tessellated.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let mut combined = TriangleMesh::default();
        for shell in self.solid.all_shells() {
            for &face in self.solid.shell_faces(shell)? {
                let face_mesh = TessellateFace::new(self.solid, face, self.params).execute()?;
                combined.merge(&face_mesh);
            }
        }
        debug!(
            faces = self.solid.face_count(),
            triangles = combined.triangle_count(),
            "tessellated solid"
        );
        Ok(combined)
    }
}

/// Triangle mesh of a solid's boundary with default parameters.
///
/// # Errors
///
/// Returns an error if any face cannot be tessellated.
pub fn solid_to_mesh(solid: &Solid) -> Result<TriangleMesh> {
    TessellateSolid::new(solid).execute()
}
