//! Boolean operations on solids.
//!
//! The pipeline runs in stages, each in its own module:
//! face/face intersection, face splitting, fragment classification,
//! selection by operation, and reassembly through
//! [`SolidBuilder`](crate::topology::SolidBuilder).

mod assemble;
mod classify;
mod curves;
mod engine;
mod face_intersection;
mod result;
mod select;
mod split;

pub use classify::FragmentClass;
pub use engine::{boolean_operation, Boolean, BooleanOptions};
pub use result::{BooleanError, BooleanResult, IntersectionCurve};
pub use select::{select, BooleanOp, KeepDecision};
pub use split::Operand;
