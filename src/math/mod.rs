pub mod arrangement;
pub mod intersect_3d;
pub mod polygon_2d;
pub mod polygon_3d;
pub mod winding;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Threshold below which a vector or length is treated as zero.
///
/// This guards divisions and normalizations only. Modeling tolerances
/// (vertex welding, coplanarity) are configured per operation and default
/// to [`DEFAULT_LINEAR_TOLERANCE`].
pub const TOLERANCE: f64 = 1e-12;

/// Default distance below which two points are the same vertex.
pub const DEFAULT_LINEAR_TOLERANCE: f64 = 1e-7;

/// Default sine of the angle below which two directions are parallel.
pub const DEFAULT_ANGULAR_TOLERANCE: f64 = 1e-9;
