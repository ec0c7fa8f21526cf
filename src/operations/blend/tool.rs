use crate::error::Result;
use crate::operations::creation::MakePrism;
use crate::topology::{FaceKind, Solid};

use super::edge_frame::EdgeFrame;

/// Fraction of the setback by which the tool reaches past the faces.
const MARGIN_RATIO: f64 = 0.25;

/// Cross-section of a blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendProfile {
    /// Rolling-ball arc of the given radius, faceted.
    Round { radius: f64, segments: usize },
    /// Flat bevel with equal setback on both faces.
    Bevel { distance: f64 },
}

impl BlendProfile {
    /// Distance from the edge to the blend boundary on each face.
    #[must_use]
    pub fn setback(&self, alpha: f64) -> f64 {
        match *self {
            Self::Round { radius, .. } => radius / (alpha / 2.0).tan(),
            Self::Bevel { distance } => distance,
        }
    }

    fn face_kind(&self) -> FaceKind {
        match self {
            Self::Round { .. } => FaceKind::Fillet,
            Self::Bevel { .. } => FaceKind::Chamfer,
        }
    }
}

/// Builds the prism that is removed from (convex) or added to (concave) the
/// solid to blend one edge.
///
/// The cross-section is bounded by the edge, the two setback lines and the
/// blend curve, and reaches a small margin out of the wedge so that the
/// boolean cuts cleanly through both faces. It is swept exactly along the
/// edge, so its caps are perpendicular to the edge.
///
/// # Errors
///
/// Returns an error if the prism cannot be built.
pub fn blend_tool(frame: &EdgeFrame, profile: &BlendProfile) -> Result<Solid> {
    let p = frame.start;
    let s = profile.setback(frame.alpha);
    let m = s * MARGIN_RATIO;
    let [w1, w2] = frame.away_from_wedge();
    let tangent1 = p + frame.t1 * s;
    let tangent2 = p + frame.t2 * s;

    let mut section = vec![tangent1 + w1 * m, p + (w1 + w2) * m, tangent2 + w2 * m, tangent2];
    let mut kinds = vec![FaceKind::Primary; 3];
    match *profile {
        BlendProfile::Round { radius, segments } => {
            let half = frame.alpha / 2.0;
            let bisector = (frame.t1 + frame.t2).normalize();
            let center = p + bisector * (radius / half.sin());
            let e2 = (tangent2 - center) / radius;
            let e1 = (tangent1 - center) / radius;
            let sweep = std::f64::consts::PI - frame.alpha;
            #[allow(clippy::cast_precision_loss)]
            let steps = segments as f64;
            for k in 1..segments {
                #[allow(clippy::cast_precision_loss)]
                let t = k as f64 / steps;
                let dir = (e2 * ((1.0 - t) * sweep).sin() + e1 * (t * sweep).sin()) / sweep.sin();
                section.push(center + dir * radius);
            }
            kinds.extend(std::iter::repeat_n(FaceKind::Fillet, segments));
        }
        BlendProfile::Bevel { .. } => kinds.push(profile.face_kind()),
    }
    section.push(tangent1);
    kinds.push(FaceKind::Primary);

    MakePrism::new(section, frame.end - frame.start)
        .with_side_kinds(kinds)
        .execute()
}
