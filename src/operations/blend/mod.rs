//! Edge blends: fillets and chamfers on planar solids.
//!
//! Each selected edge gets a tool prism whose cross-section is the corner
//! region cut off by the blend. Convex edges subtract the tool and concave
//! edges add it, one boolean per edge. Edges that cannot be blended are
//! reported individually and never stop the rest of the batch.

mod clearance;
mod edge_frame;
mod tool;

pub use edge_frame::EdgeFrame;
pub use tool::BlendProfile;

use tracing::{debug, warn};

use crate::topology::{EdgeId, Solid};

use self::clearance::{available_setback, overlapping_blend, Placed};
use self::tool::blend_tool;
use super::boolean::{Boolean, BooleanOp, BooleanOptions};

/// Why one edge could not be blended.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlendError {
    #[error("edge not found in solid")]
    EdgeNotFound,

    #[error("edge is used by {uses} faces, expected 2")]
    NotManifoldEdge { uses: usize },

    #[error("adjacent faces are tangent")]
    TangentFaces,

    #[error("setback {setback} exceeds the available {available}")]
    InsufficientClearance { setback: f64, available: f64 },

    #[error("blend overlaps the blend of edge {other:?}")]
    OverlappingBlend { other: EdgeId },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("boolean failed: {0}")]
    OperationFailed(String),
}

/// An edge that was left unblended.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedEdge {
    pub edge: EdgeId,
    pub reason: BlendError,
}

/// Outcome of a fillet or chamfer batch.
///
/// `solid` holds the blended solid when at least one edge was blended, and
/// is `None` when every edge failed.
#[derive(Debug, Clone, Default)]
pub struct BlendResult {
    pub solid: Option<Solid>,
    pub failed_edges: Vec<FailedEdge>,
}

/// Options shared by fillets and chamfers.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendOptions {
    /// Flat facets approximating each fillet arc.
    pub segments: usize,
    /// Options for the per-edge booleans.
    pub boolean: BooleanOptions,
}

impl Default for BlendOptions {
    fn default() -> Self {
        Self {
            segments: 8,
            boolean: BooleanOptions::default(),
        }
    }
}

/// Rounds edges of a solid with a constant radius.
pub struct Fillet<'a> {
    solid: &'a Solid,
    edges: Vec<EdgeId>,
    radius: f64,
    options: BlendOptions,
}

impl<'a> Fillet<'a> {
    /// Creates a new `Fillet` operation.
    #[must_use]
    pub fn new(solid: &'a Solid, edges: &[EdgeId], radius: f64) -> Self {
        Self {
            solid,
            edges: edges.to_vec(),
            radius,
            options: BlendOptions::default(),
        }
    }

    /// Sets the number of facets per arc.
    #[must_use]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.options.segments = segments;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: BlendOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes the fillet.
    #[must_use]
    pub fn execute(&self) -> BlendResult {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return reject_all(&self.edges, &format!("radius {} is not positive", self.radius));
        }
        if self.options.segments == 0 {
            return reject_all(&self.edges, "fillet needs at least one segment");
        }
        let profile = BlendProfile::Round {
            radius: self.radius,
            segments: self.options.segments,
        };
        blend_edges(self.solid, &self.edges, &profile, &self.options.boolean)
    }
}

/// Bevels edges of a solid with a constant setback.
pub struct Chamfer<'a> {
    solid: &'a Solid,
    edges: Vec<EdgeId>,
    distance: f64,
    options: BlendOptions,
}

impl<'a> Chamfer<'a> {
    /// Creates a new `Chamfer` operation.
    #[must_use]
    pub fn new(solid: &'a Solid, edges: &[EdgeId], distance: f64) -> Self {
        Self {
            solid,
            edges: edges.to_vec(),
            distance,
            options: BlendOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BlendOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes the chamfer.
    #[must_use]
    pub fn execute(&self) -> BlendResult {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return reject_all(
                &self.edges,
                &format!("distance {} is not positive", self.distance),
            );
        }
        let profile = BlendProfile::Bevel {
            distance: self.distance,
        };
        blend_edges(self.solid, &self.edges, &profile, &self.options.boolean)
    }
}

/// Fillets `edges` of `solid` with `radius`, using default options.
#[must_use]
pub fn apply_fillet(solid: &Solid, edges: &[EdgeId], radius: f64) -> BlendResult {
    Fillet::new(solid, edges, radius).execute()
}

/// Chamfers `edges` of `solid` with setback `distance`, using default options.
#[must_use]
pub fn apply_chamfer(solid: &Solid, edges: &[EdgeId], distance: f64) -> BlendResult {
    Chamfer::new(solid, edges, distance).execute()
}

fn reject_all(edges: &[EdgeId], message: &str) -> BlendResult {
    warn!(reason = message, "blend rejected");
    BlendResult {
        solid: None,
        failed_edges: edges
            .iter()
            .map(|&edge| FailedEdge {
                edge,
                reason: BlendError::InvalidParameter(message.to_string()),
            })
            .collect(),
    }
}

/// Blends each edge in turn.
///
/// Every edge is measured and checked on the input solid; the tools are then
/// applied to the running result in input order.
fn blend_edges(
    solid: &Solid,
    edges: &[EdgeId],
    profile: &BlendProfile,
    options: &BooleanOptions,
) -> BlendResult {
    let tol = options.tolerance;
    let uses = solid.edge_uses();
    let mut failed = Vec::new();
    let mut placed: Vec<Placed> = Vec::new();
    let mut seen = Vec::new();

    for &edge in edges {
        if seen.contains(&edge) {
            continue;
        }
        seen.push(edge);
        let edge_uses = uses.get(&edge).map_or(&[][..], Vec::as_slice);
        let checked = EdgeFrame::compute(solid, edge, edge_uses, options.angular_tolerance)
            .and_then(|frame| {
                let setback = profile.setback(frame.alpha);
                let available = available_setback(solid, &frame)
                    .map_err(|e| BlendError::OperationFailed(e.to_string()))?;
                if setback > available + tol {
                    return Err(BlendError::InsufficientClearance { setback, available });
                }
                if let Some(other) = overlapping_blend(&placed, &frame, setback, tol) {
                    return Err(BlendError::OverlappingBlend { other });
                }
                Ok(Placed { frame, setback })
            });
        match checked {
            Ok(p) => placed.push(p),
            Err(reason) => {
                debug!(?edge, %reason, "edge rejected");
                failed.push(FailedEdge { edge, reason });
            }
        }
    }

    let mut current: Option<Solid> = None;
    for p in &placed {
        let edge = p.frame.edge;
        let tool = match blend_tool(&p.frame, profile) {
            Ok(tool) => tool,
            Err(e) => {
                failed.push(FailedEdge {
                    edge,
                    reason: BlendError::OperationFailed(e.to_string()),
                });
                continue;
            }
        };
        let op = if p.frame.convex {
            BooleanOp::Subtract
        } else {
            BooleanOp::Union
        };
        let base = current.as_ref().unwrap_or(solid);
        let result = Boolean::new(base, &tool, op)
            .with_options(options.clone())
            .execute();
        match result.into_solid() {
            Ok(next) => {
                debug!(?edge, convex = p.frame.convex, "edge blended");
                current = Some(next);
            }
            Err(err) => {
                warn!(?edge, %err, "blend boolean failed");
                failed.push(FailedEdge {
                    edge,
                    reason: BlendError::OperationFailed(err.to_string()),
                });
            }
        }
    }

    debug!(
        requested = edges.len(),
        failed = failed.len(),
        "blend finished"
    );
    BlendResult {
        solid: current,
        failed_edges: failed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeBox, MakePrism};
    use crate::operations::query::Volume;
    use crate::topology::FaceKind;
    use crate::validation::validate_solid;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn volume(solid: &Solid) -> f64 {
        Volume::new(solid).execute().unwrap()
    }

    /// The edge running from `a` to `b` in either direction.
    fn edge_between(solid: &Solid, a: Point3, b: Point3) -> EdgeId {
        solid
            .edges()
            .find(|(_, e)| {
                let s = *e.curve.start();
                let t = *e.curve.end();
                ((s - a).norm() < 1e-9 && (t - b).norm() < 1e-9)
                    || ((s - b).norm() < 1e-9 && (t - a).norm() < 1e-9)
            })
            .map(|(id, _)| id)
            .unwrap()
    }

    /// Removed cross-section of a right-angle fillet faceted into 8 pieces.
    fn faceted_corner(r: f64) -> f64 {
        r * r - 4.0 * r * r * (PI / 16.0).sin()
    }

    #[test]
    fn fillet_one_box_edge() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).execute().unwrap();
        let edge = edge_between(&solid, p(2.0, 0.0, 2.0), p(2.0, 2.0, 2.0));
        let result = apply_fillet(&solid, &[edge], 0.5);
        assert!(result.failed_edges.is_empty(), "{:?}", result.failed_edges);
        let blended = result.solid.unwrap();
        assert!(validate_solid(&blended).valid);
        let expected = 8.0 - 2.0 * faceted_corner(0.5);
        assert_relative_eq!(volume(&blended), expected, epsilon = 1e-9);
        // Within one percent of the true rounded volume.
        let smooth = 8.0 - 2.0 * 0.25 * (1.0 - PI / 4.0);
        assert!((volume(&blended) - smooth).abs() / smooth < 0.01);
        let facets = blended
            .faces()
            .filter(|(_, f)| f.kind == FaceKind::Fillet)
            .count();
        assert_eq!(facets, 8);
    }

    #[test]
    fn clearance_failure_leaves_other_edges_blended() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(4.0, 4.0, 1.0)).execute().unwrap();
        let vertical = edge_between(&solid, p(4.0, 4.0, 0.0), p(4.0, 4.0, 1.0));
        let top = edge_between(&solid, p(0.0, 0.0, 1.0), p(4.0, 0.0, 1.0));
        let result = apply_fillet(&solid, &[vertical, top], 0.75);

        assert_eq!(result.failed_edges.len(), 1);
        assert_eq!(result.failed_edges[0].edge, top);
        assert!(matches!(
            result.failed_edges[0].reason,
            BlendError::InsufficientClearance { .. }
        ));
        let blended = result.solid.unwrap();
        assert!(validate_solid(&blended).valid);
        assert_relative_eq!(volume(&blended), 16.0 - faceted_corner(0.75), epsilon = 1e-9);
    }

    #[test]
    fn chamfer_box_edge() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).execute().unwrap();
        let edge = edge_between(&solid, p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0));
        let result = apply_chamfer(&solid, &[edge], 0.5);
        assert!(result.failed_edges.is_empty(), "{:?}", result.failed_edges);
        let blended = result.solid.unwrap();
        assert!(validate_solid(&blended).valid);
        assert_relative_eq!(volume(&blended), 8.0 - 2.0 * 0.125, epsilon = 1e-9);
        assert_eq!(blended.face_count(), 7);
        let bevels = blended
            .faces()
            .filter(|(_, f)| f.kind == FaceKind::Chamfer)
            .count();
        assert_eq!(bevels, 1);
    }

    #[test]
    fn fillet_two_edges_sharing_a_corner() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).execute().unwrap();
        let a = edge_between(&solid, p(2.0, 0.0, 2.0), p(2.0, 2.0, 2.0));
        let b = edge_between(&solid, p(0.0, 2.0, 2.0), p(2.0, 2.0, 2.0));
        let result = apply_fillet(&solid, &[a, b], 0.5);
        assert!(result.failed_edges.is_empty(), "{:?}", result.failed_edges);
        let blended = result.solid.unwrap();
        assert!(validate_solid(&blended).valid);
        assert!(volume(&blended) < 8.0 - 2.0 * faceted_corner(0.5));
    }

    #[test]
    fn concave_edge_is_filled() {
        let profile = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 2.0, 0.0),
            p(0.0, 2.0, 0.0),
        ];
        let solid = MakePrism::new(profile, Vector3::new(0.0, 0.0, 1.0))
            .execute()
            .unwrap();
        let inner = edge_between(&solid, p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0));
        let result = apply_fillet(&solid, &[inner], 0.25);
        assert!(result.failed_edges.is_empty(), "{:?}", result.failed_edges);
        let blended = result.solid.unwrap();
        assert!(validate_solid(&blended).valid);
        assert_relative_eq!(volume(&blended), 3.0 + faceted_corner(0.25), epsilon = 1e-9);
    }

    #[test]
    fn overlapping_blends_on_a_thin_face() {
        // Parallelogram prism: the two long cap edges are 1 apart but their
        // neighbours are long.
        let profile = vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(8.0, 1.0, 0.0),
            p(4.0, 1.0, 0.0),
        ];
        let solid = MakePrism::new(profile, Vector3::new(0.0, 0.0, 4.0))
            .execute()
            .unwrap();
        let first = edge_between(&solid, p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0));
        let second = edge_between(&solid, p(8.0, 1.0, 0.0), p(4.0, 1.0, 0.0));
        let result = apply_chamfer(&solid, &[first, second], 0.6);
        assert_eq!(result.failed_edges.len(), 1);
        assert_eq!(result.failed_edges[0].edge, second);
        assert_eq!(
            result.failed_edges[0].reason,
            BlendError::OverlappingBlend { other: first }
        );
        assert!(result.solid.is_some());
    }

    #[test]
    fn invalid_parameters_fail_every_edge() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute().unwrap();
        let edges: Vec<EdgeId> = solid.edges().map(|(id, _)| id).take(3).collect();
        let result = apply_fillet(&solid, &edges, -1.0);
        assert!(result.solid.is_none());
        assert_eq!(result.failed_edges.len(), 3);
        assert!(result
            .failed_edges
            .iter()
            .all(|f| matches!(f.reason, BlendError::InvalidParameter(_))));

        let zero = Fillet::new(&solid, &edges, 0.1).with_segments(0).execute();
        assert_eq!(zero.failed_edges.len(), 3);
    }

    #[test]
    fn input_solid_is_unchanged() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).execute().unwrap();
        let edge = edge_between(&solid, p(2.0, 0.0, 2.0), p(2.0, 2.0, 2.0));
        let _ = Fillet::new(&solid, &[edge], 0.5).with_segments(4).execute();
        assert_eq!(solid.face_count(), 6);
        assert_relative_eq!(volume(&solid), 8.0, epsilon = 1e-12);
    }
}
