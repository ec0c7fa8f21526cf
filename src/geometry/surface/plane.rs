use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

/// An infinite oriented plane in 3D space.
///
/// Defined by an origin point and two orthogonal unit direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir × v_dir`, so a loop that is
/// counter-clockwise in `(u, v)` coordinates winds counter-clockwise around
/// the normal.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a new plane from an origin and two direction vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("plane directions are parallel".into()).into(),
            );
        }
        let normal = normal / normal_len;
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Fits a plane through a closed polygon.
    ///
    /// The normal follows the polygon's winding (Newell's method) and the
    /// origin is the vertex centroid.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon has fewer than three points or
    /// encloses no area.
    pub fn from_polygon(points: &[Point3]) -> Result<Self> {
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            ))
            .into());
        }
        let normal = crate::math::polygon_3d::newell_normal(points);
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("polygon has zero area".into()).into());
        }
        Self::from_normal(crate::math::polygon_3d::centroid(points), normal)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the same plane with the opposite orientation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            u_dir: self.u_dir,
            v_dir: -self.v_dir,
            normal: -self.normal,
        }
    }

    /// Signed distance from `point` to the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&(point - self.origin))
    }

    /// Projects a 3D point into the plane's `(u, v)` coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let diff = point - self.origin;
        Point2::new(diff.dot(&self.u_dir), diff.dot(&self.v_dir))
    }

    /// Lifts a `(u, v)` coordinate back onto the plane.
    #[must_use]
    pub fn unproject(&self, uv: &Point2) -> Point3 {
        self.origin + self.u_dir * uv.x + self.v_dir * uv.y
    }

    /// Returns `true` if `other` is the same geometric plane.
    ///
    /// Orientation is ignored; use [`Plane::same_orientation`] to compare normals.
    #[must_use]
    pub fn is_coplanar_with(&self, other: &Self, tolerance: f64, angular_tolerance: f64) -> bool {
        self.normal.cross(&other.normal).norm() < angular_tolerance
            && self.signed_distance(&other.origin).abs() < tolerance
    }

    /// Returns `true` if both normals point the same way.
    #[must_use]
    pub fn same_orientation(&self, other: &Self) -> bool {
        self.normal.dot(&other.normal) > 0.0
    }
}
