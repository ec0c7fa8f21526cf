use crate::error::Result;
use crate::geometry::surface::Plane;
use crate::math::intersect_3d::{plane_plane_intersect, projected_extent, PlanePairRelation};
use crate::math::polygon_3d::{clip_segment_to_region, segment_point_at};
use crate::math::{Point2, Point3};
use crate::operations::query::Aabb;
use crate::topology::{FaceId, FaceKind, Solid};

/// Sine of the angle under which crossing planes are reported as near-tangent.
const NEAR_TANGENT_SINE: f64 = 1e-6;

/// Parallel planes closer than this many tolerances are reported as
/// near-tangent.
pub const NEAR_PARALLEL_FACTOR: f64 = 100.0;

/// A face's polygon extracted once for the pairwise intersection loop.
#[derive(Debug, Clone)]
pub struct FaceGeometry {
    pub id: FaceId,
    pub kind: FaceKind,
    pub plane: Plane,
    pub outer: Vec<Point3>,
    pub holes: Vec<Vec<Point3>>,
    pub outer_uv: Vec<Point2>,
    pub holes_uv: Vec<Vec<Point2>>,
    pub aabb: Aabb,
}

impl FaceGeometry {
    /// Extracts one face of `solid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its loops is missing.
    pub fn from_face(solid: &Solid, id: FaceId) -> Result<Self> {
        let face = solid.face(id)?;
        let plane = face.plane.clone();
        let polygon = solid.face_polygon(id)?;
        let aabb = crate::operations::query::bounding_box::face_aabb(solid, id)?;
        let outer_uv = polygon.outer.iter().map(|p| plane.project(p)).collect();
        let holes_uv = polygon
            .holes
            .iter()
            .map(|h| h.iter().map(|p| plane.project(p)).collect())
            .collect();
        Ok(Self {
            id,
            kind: face.kind,
            plane,
            outer: polygon.outer,
            holes: polygon.holes,
            outer_uv,
            holes_uv,
            aabb,
        })
    }

    /// Every face of every shell of `solid`.
    ///
    /// # Errors
    ///
    /// Returns an error if an entity of the solid is missing.
    pub fn collect(solid: &Solid) -> Result<Vec<Self>> {
        let mut faces = Vec::new();
        for shell in solid.all_shells() {
            for &id in solid.shell_faces(shell)? {
                faces.push(Self::from_face(solid, id)?);
            }
        }
        Ok(faces)
    }

    fn loop_segments(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        std::iter::once(&self.outer)
            .chain(self.holes.iter())
            .flat_map(|l| {
                let n = l.len();
                (0..n).map(move |i| (l[i], l[(i + 1) % n]))
            })
    }

    fn clip(&self, start: &Point3, end: &Point3, tolerance: f64) -> Vec<(f64, f64)> {
        clip_segment_to_region(
            start,
            end,
            &self.outer_uv,
            &self.holes_uv,
            &self.plane,
            tolerance,
        )
    }
}

/// Cut segments and curve pieces produced by one face pair.
#[derive(Debug, Clone, Default)]
pub struct FacePairIntersection {
    /// Segments to insert into face A's boundary.
    pub cuts_a: Vec<(Point3, Point3)>,
    /// Segments to insert into face B's boundary.
    pub cuts_b: Vec<(Point3, Point3)>,
    /// Pieces of the transversal intersection curve.
    pub curve: Vec<(Point3, Point3)>,
    /// The planes cross at a grazing angle or are parallel within a hair of
    /// coinciding.
    pub near_tangent: bool,
}

/// Intersects two planar faces.
///
/// Crossing planes yield the piece of their common line that lies in both
/// faces (boundary inclusive); it becomes a cut for both faces and a piece of
/// the intersection curve. Coplanar faces exchange their boundary edges, each
/// clipped to the other face, as cuts. Pieces shorter than `tolerance` are
/// dropped.
#[must_use]
pub fn intersect_faces(
    a: &FaceGeometry,
    b: &FaceGeometry,
    tolerance: f64,
    angular_tolerance: f64,
) -> FacePairIntersection {
    let mut out = FacePairIntersection::default();
    match plane_plane_intersect(&a.plane, &b.plane, tolerance, angular_tolerance) {
        PlanePairRelation::IntersectionLine { origin, direction } => {
            let sine = a.plane.plane_normal().cross(b.plane.plane_normal()).norm();
            out.near_tangent = sine < NEAR_TANGENT_SINE;

            let Some((t_min, t_max)) = projected_extent(
                &origin,
                &direction,
                a.outer.iter().chain(b.outer.iter()).copied(),
            ) else {
                return out;
            };
            let start = origin + direction * (t_min - 1.0);
            let end = origin + direction * (t_max + 1.0);
            let length = (end - start).norm();

            let spans_a = a.clip(&start, &end, tolerance);
            let spans_b = b.clip(&start, &end, tolerance);
            for &(a0, a1) in &spans_a {
                for &(b0, b1) in &spans_b {
                    let (lo, hi) = (a0.max(b0), a1.min(b1));
                    if (hi - lo) * length > tolerance {
                        let piece = (
                            segment_point_at(&start, &end, lo),
                            segment_point_at(&start, &end, hi),
                        );
                        out.cuts_a.push(piece);
                        out.cuts_b.push(piece);
                        out.curve.push(piece);
                    }
                }
            }
        }
        PlanePairRelation::Coincident { .. } => {
            out.cuts_a = clipped_edges(b, a, tolerance);
            out.cuts_b = clipped_edges(a, b, tolerance);
        }
        PlanePairRelation::Parallel { distance } => {
            out.near_tangent = distance < tolerance * NEAR_PARALLEL_FACTOR;
        }
    }
    out
}

/// Boundary edges of `source` clipped to the region of `target`.
fn clipped_edges(
    source: &FaceGeometry,
    target: &FaceGeometry,
    tolerance: f64,
) -> Vec<(Point3, Point3)> {
    let mut cuts = Vec::new();
    for (s, e) in source.loop_segments() {
        let length = (e - s).norm();
        for (t0, t1) in target.clip(&s, &e, tolerance) {
            if (t1 - t0) * length > tolerance {
                cuts.push((segment_point_at(&s, &e, t0), segment_point_at(&s, &e, t1)));
            }
        }
    }
    cuts
}
