pub mod area;
pub mod bounding_box;
pub mod containment;
pub mod volume;

pub use area::Area;
pub use bounding_box::{Aabb, BoundingBox};
pub use containment::{PointContainment, SolidProbe};
pub use volume::Volume;
