//! A polyhedral boundary-representation kernel.
//!
//! Solids are closed half-edge structures of planar faces. The crate builds
//! them ([`operations::creation`]), checks and repairs them ([`validation`]),
//! combines them ([`operations::boolean`]), rounds or bevels their edges
//! ([`operations::blend`]) and converts them for display ([`tessellation`]).

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod tessellation;
pub mod topology;
pub mod validation;

pub use error::{KernelError, Result};
pub use operations::blend::{apply_chamfer, apply_fillet, BlendResult};
pub use operations::boolean::{boolean_operation, BooleanOp, BooleanResult};
pub use tessellation::{solid_to_mesh, solid_to_wireframe};
pub use topology::Solid;
pub use validation::{orient_faces, validate_manifold, validate_solid};
