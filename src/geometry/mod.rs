pub mod curve;
pub mod surface;

pub use curve::{Curve, CurveDomain, LineSegment};
pub use surface::Plane;
