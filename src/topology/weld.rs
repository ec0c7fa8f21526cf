use std::collections::HashMap;

use crate::math::Point3;

/// Spatial hash-based vertex welder.
///
/// Groups points by grid cell and maps every point within `tolerance` of an
/// earlier one onto that earlier point's index.
#[derive(Debug)]
pub struct VertexWelder {
    tolerance: f64,
    points: Vec<Point3>,
    map: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl VertexWelder {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            points: Vec::new(),
            map: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point3) -> (i64, i64, i64) {
        let inv = 1.0 / self.tolerance;
        (
            (p.x * inv).floor() as i64,
            (p.y * inv).floor() as i64,
            (p.z * inv).floor() as i64,
        )
    }

    /// Index of an existing point within tolerance of `point`, if any.
    #[must_use]
    pub fn find(&self, point: &Point3) -> Option<usize> {
        let key = self.cell_key(point);

        // Search in neighboring cells (3x3x3) for a match
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (key.0 + dx, key.1 + dy, key.2 + dz);
                    if let Some(entries) = self.map.get(&neighbor) {
                        for &i in entries {
                            if (point - self.points[i]).norm() < self.tolerance {
                                return Some(i);
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Returns the index of the welded point for `point`, inserting it if new.
    pub fn weld(&mut self, point: &Point3) -> usize {
        if let Some(i) = self.find(point) {
            return i;
        }
        let key = self.cell_key(point);
        self.points.push(*point);
        let i = self.points.len() - 1;
        self.map.entry(key).or_default().push(i);
        i
    }

    /// Welded positions, indexed by the values [`weld`](Self::weld) returns.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }
}
