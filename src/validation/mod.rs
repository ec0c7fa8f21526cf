//! Structural checks and repair for solids.
//!
//! - [`validate_manifold`] checks one shell's half-edge structure
//! - [`validate_solid`] checks every shell plus orientation and containment
//! - [`orient_faces`] makes a shell's face orientations consistent

mod manifold;
mod orient;
mod solid;

pub use manifold::validate_manifold;
pub use orient::{orient_faces, OrientReport};
pub use solid::validate_solid;

use crate::topology::{EdgeId, FaceId, HalfEdgeId, LoopId, ShellId, VertexId};

/// A single problem found by validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("entity missing: {0}")]
    MissingEntity(String),

    #[error("loop {loop_id:?} has fewer than three half-edges")]
    DegenerateLoop { loop_id: LoopId },

    #[error("loop {loop_id:?} of face {face:?} is not closed")]
    OpenLoop { face: FaceId, loop_id: LoopId },

    #[error("edge {edge:?} is used by {uses} half-edges, expected 2")]
    EdgeIncidence { edge: EdgeId, uses: usize },

    #[error("half-edge {half_edge:?} has no twin")]
    MissingTwin { half_edge: HalfEdgeId },

    #[error("half-edge {half_edge:?} and its twin {twin:?} disagree")]
    AsymmetricTwin {
        half_edge: HalfEdgeId,
        twin: HalfEdgeId,
    },

    #[error("edge {edge:?} is traversed in the same direction by both faces")]
    TwinSameDirection { edge: EdgeId },

    #[error("vertex {vertex:?} joins {fans} separate face fans")]
    NonManifoldVertex { vertex: VertexId, fans: usize },

    #[error("outer shell {shell:?} is inverted (signed volume {signed_volume})")]
    InvertedShell { shell: ShellId, signed_volume: f64 },

    #[error("void shell {shell:?} is not inverted (signed volume {signed_volume})")]
    VoidNotInverted { shell: ShellId, signed_volume: f64 },

    #[error("void shell {shell:?} lies outside the material")]
    VoidOutsideMaterial { shell: ShellId },
}

impl From<crate::error::TopologyError> for Violation {
    fn from(err: crate::error::TopologyError) -> Self {
        Self::MissingEntity(err.to_string())
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// `true` when no violations were found.
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub(crate) fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}
