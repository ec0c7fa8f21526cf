use crate::geometry::surface::Plane;
use crate::math::arrangement::split_region;
use crate::math::polygon_2d::interior_point;
use crate::math::{Point2, Point3};
use crate::topology::{FaceId, FaceKind, PolygonFace};

use super::face_intersection::FaceGeometry;

/// Which operand a face fragment originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
}

/// A piece of an operand face bounded by its original edges and cut segments.
#[derive(Debug, Clone)]
pub struct FaceFragment {
    pub source: Operand,
    pub source_face: FaceId,
    pub kind: FaceKind,
    /// The source face's outward plane.
    pub plane: Plane,
    pub outer: Vec<Point3>,
    pub holes: Vec<Vec<Point3>>,
    /// A point strictly inside the fragment, used for classification.
    pub sample: Option<Point3>,
}

impl FaceFragment {
    /// The fragment as a builder face with its source orientation.
    #[must_use]
    pub fn into_polygon(self) -> PolygonFace {
        PolygonFace::new(self.outer)
            .with_holes(self.holes)
            .with_kind(self.kind)
    }
}

/// Splits a face along a set of cut segments lying in its plane.
///
/// The face region and the cuts are arranged in the face's plane
/// coordinates; every bounded sub-region inside the face becomes a fragment.
/// A face without cuts is returned whole.
#[must_use]
pub fn split_face(
    face: &FaceGeometry,
    cuts: &[(Point3, Point3)],
    source: Operand,
    tolerance: f64,
) -> Vec<FaceFragment> {
    let fragment = |outer_uv: &[Point2],
                    holes_uv: &[Vec<Point2>],
                    outer: Vec<Point3>,
                    holes: Vec<Vec<Point3>>| FaceFragment {
        source,
        source_face: face.id,
        kind: face.kind,
        plane: face.plane.clone(),
        outer,
        holes,
        sample: interior_point(outer_uv, holes_uv).map(|uv| face.plane.unproject(&uv)),
    };

    if cuts.is_empty() {
        return vec![fragment(
            &face.outer_uv,
            &face.holes_uv,
            face.outer.clone(),
            face.holes.clone(),
        )];
    }

    let cuts_uv: Vec<(Point2, Point2)> = cuts
        .iter()
        .map(|(s, e)| (face.plane.project(s), face.plane.project(e)))
        .collect();
    let lift = |l: &[Point2]| -> Vec<Point3> {
        l.iter().map(|uv| face.plane.unproject(uv)).collect()
    };

    split_region(&face.outer_uv, &face.holes_uv, &cuts_uv, tolerance)
        .into_iter()
        .map(|region| {
            let outer = lift(&region.outer);
            let holes = region.holes.iter().map(|h| lift(h)).collect();
            fragment(&region.outer, &region.holes, outer, holes)
        })
        .collect()
}
