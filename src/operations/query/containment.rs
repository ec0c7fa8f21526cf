use crate::error::Result;
use crate::geometry::surface::Plane;
use crate::math::polygon_2d::{classify_point_in_region, Containment};
use crate::math::winding::winding_number;
use crate::math::{Point2, Point3, Vector3};
use crate::topology::{FaceId, ShellId, Solid};

use super::bounding_box::Aabb;

/// Where a point lies relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointContainment {
    Inside,
    Outside,
    /// On a boundary face, with that face's outward normal.
    OnBoundary { face: FaceId, normal: Vector3 },
}

#[derive(Debug, Clone)]
struct ProbeFace {
    id: FaceId,
    plane: Plane,
    outer: Vec<Point2>,
    holes: Vec<Vec<Point2>>,
    loops: Vec<Vec<Point3>>,
    aabb: Aabb,
}

/// Point-membership queries against a fixed set of shells.
///
/// Face polygons are extracted once so that many points can be classified
/// cheaply. Inside/outside uses the generalized winding number, which stays
/// correct for non-convex shells and for points near (but not on) the
/// boundary.
#[derive(Debug, Clone)]
pub struct SolidProbe {
    faces: Vec<ProbeFace>,
}

impl SolidProbe {
    /// Probe over every shell of `solid`.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of the solid is missing.
    pub fn new(solid: &Solid) -> Result<Self> {
        Self::for_shells(solid, &solid.all_shells())
    }

    /// Probe over the given shells only.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of a shell is missing.
    pub fn for_shells(solid: &Solid, shells: &[ShellId]) -> Result<Self> {
        let mut faces = Vec::new();
        for &shell in shells {
            for &id in solid.shell_faces(shell)? {
                let plane = solid.face(id)?.plane.clone();
                let polygon = solid.face_polygon(id)?;
                let Some(aabb) = Aabb::from_points(&polygon.outer) else {
                    continue;
                };
                let outer = polygon.outer.iter().map(|p| plane.project(p)).collect();
                let holes = polygon
                    .holes
                    .iter()
                    .map(|h| h.iter().map(|p| plane.project(p)).collect())
                    .collect();
                let mut loops = vec![polygon.outer];
                loops.extend(polygon.holes);
                faces.push(ProbeFace {
                    id,
                    plane,
                    outer,
                    holes,
                    loops,
                    aabb,
                });
            }
        }
        Ok(Self { faces })
    }

    /// Generalized winding number of `point`: about 1 inside, 0 outside.
    #[must_use]
    pub fn winding_number(&self, point: &Point3) -> f64 {
        winding_number(
            point,
            self.faces
                .iter()
                .flat_map(|f| f.loops.iter().map(Vec::as_slice)),
        )
    }

    /// The face whose closed region contains `point`, within `tolerance`.
    #[must_use]
    pub fn face_at(&self, point: &Point3, tolerance: f64) -> Option<(FaceId, Vector3)> {
        self.faces
            .iter()
            .find(|f| {
                f.aabb.contains(point, tolerance)
                    && f.plane.signed_distance(point).abs() <= tolerance
                    && classify_point_in_region(
                        &f.plane.project(point),
                        &f.outer,
                        &f.holes,
                        tolerance,
                    ) != Containment::Outside
            })
            .map(|f| (f.id, *f.plane.plane_normal()))
    }

    /// Classifies `point` as inside, outside, or on the boundary.
    #[must_use]
    pub fn classify(&self, point: &Point3, tolerance: f64) -> PointContainment {
        if let Some((face, normal)) = self.face_at(point, tolerance) {
            return PointContainment::OnBoundary { face, normal };
        }
        if self.winding_number(point) > 0.5 {
            PointContainment::Inside
        } else {
            PointContainment::Outside
        }
    }
}
