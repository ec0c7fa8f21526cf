use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::math::{Point3, DEFAULT_ANGULAR_TOLERANCE, DEFAULT_LINEAR_TOLERANCE};
use crate::operations::query::{BoundingBox, SolidProbe, Volume};
use crate::topology::{Solid, SolidBuilder};
use crate::validation::{validate_solid, Violation};

use super::assemble::{add_fragment, compound};
use super::classify::classify_fragment;
use super::curves::chain_segments;
use super::face_intersection::{intersect_faces, FaceGeometry, NEAR_PARALLEL_FACTOR};
use super::result::{BooleanError, BooleanResult};
use super::select::{select, BooleanOp};
use super::split::{split_face, Operand};

/// Tolerances and retry policy for a boolean operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanOptions {
    /// Distance below which points are merged and pieces are dropped.
    pub tolerance: f64,
    /// Sine of the angle below which face normals count as parallel.
    pub angular_tolerance: f64,
    /// Factor applied to `tolerance` on each retry.
    pub relaxed_factor: f64,
    /// Retries after a result fails validation.
    pub max_retries: usize,
    /// Merge coplanar fragments back into single faces.
    pub merge_coplanar: bool,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_LINEAR_TOLERANCE,
            angular_tolerance: DEFAULT_ANGULAR_TOLERANCE,
            relaxed_factor: 100.0,
            max_retries: 1,
            merge_coplanar: true,
        }
    }
}

impl BooleanOptions {
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_angular_tolerance(mut self, angular_tolerance: f64) -> Self {
        self.angular_tolerance = angular_tolerance;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_retries: usize, relaxed_factor: f64) -> Self {
        self.max_retries = max_retries;
        self.relaxed_factor = relaxed_factor;
        self
    }

    #[must_use]
    pub fn with_coplanar_merge(mut self, merge: bool) -> Self {
        self.merge_coplanar = merge;
        self
    }
}

/// One run of the pipeline at a fixed tolerance.
enum Attempt {
    Built(Solid),
    Empty,
    Invalid(Vec<Violation>),
    Unbuildable(String),
}

/// Computes the union, difference or intersection of two solids.
///
/// Neither input is modified. The result solid, when present, has passed
/// [`validate_solid`].
pub struct Boolean<'a> {
    a: &'a Solid,
    b: &'a Solid,
    op: BooleanOp,
    options: BooleanOptions,
}

impl<'a> Boolean<'a> {
    /// Creates a new `Boolean` operation computing `a op b`.
    #[must_use]
    pub fn new(a: &'a Solid, b: &'a Solid, op: BooleanOp) -> Self {
        Self {
            a,
            b,
            op,
            options: BooleanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: BooleanOptions) -> Self {
        self.options = options;
        self
    }

    /// Executes the operation.
    ///
    /// Failures are reported in [`BooleanResult::errors`] rather than as a
    /// `Result`.
    #[must_use]
    pub fn execute(&self) -> BooleanResult {
        let mut result = BooleanResult::default();
        if let Err(err) = self.run(&mut result) {
            result.solid = None;
            result.errors.push(BooleanError::Internal(err.to_string()));
        }
        result.success = result.errors.is_empty() && result.solid.is_some();
        debug!(
            op = ?self.op,
            success = result.success,
            attempts = result.attempts,
            face_pairs = result.face_pairs_tested,
            curves = result.intersection_curves.len(),
            "boolean finished"
        );
        result
    }

    fn run(&self, result: &mut BooleanResult) -> Result<()> {
        for (operand, solid) in [(Operand::A, self.a), (Operand::B, self.b)] {
            let report = validate_solid(solid);
            if !report.valid {
                warn!(?operand, violations = report.violations.len(), "invalid boolean operand");
                result.errors.push(BooleanError::InvalidInput {
                    operand,
                    violations: report.violations,
                });
            }
        }
        if !result.errors.is_empty() {
            return Ok(());
        }

        let tol = self.options.tolerance;
        let box_a = BoundingBox::new(self.a).execute()?;
        let box_b = BoundingBox::new(self.b).execute()?;
        if !box_a.overlaps(&box_b, tol) {
            debug!(op = ?self.op, "operand bounds are disjoint");
            match self.op {
                BooleanOp::Union => result.solid = Some(compound(self.a, self.b, tol)?),
                BooleanOp::Subtract => result.solid = Some(self.a.clone()),
                BooleanOp::Intersect => result.errors.push(BooleanError::NoOverlap),
            }
            return Ok(());
        }

        let runs = self.options.max_retries + 1;
        let mut tolerance = tol;
        let mut last = Attempt::Empty;
        for run in 1..=runs {
            result.attempts = run;
            last = match self.attempt(tolerance, result)? {
                Attempt::Built(solid) => {
                    if Volume::new(&solid).execute()?.abs() <= tol {
                        result.errors.push(BooleanError::EmptyResult);
                    } else {
                        result.solid = Some(solid);
                    }
                    return Ok(());
                }
                Attempt::Empty => {
                    result.errors.push(BooleanError::EmptyResult);
                    return Ok(());
                }
                failed => failed,
            };
            if run < runs {
                tolerance *= self.options.relaxed_factor;
                warn!(tolerance, "boolean result invalid, retrying with relaxed tolerance");
                result
                    .warnings
                    .push(format!("retried with relaxed tolerance {tolerance:e}"));
            }
        }

        result.errors.push(match last {
            Attempt::Invalid(violations) => BooleanError::NonManifoldResult { violations },
            Attempt::Unbuildable(message) => BooleanError::Internal(message),
            Attempt::Built(_) | Attempt::Empty => BooleanError::EmptyResult,
        });
        Ok(())
    }

    /// Intersects, splits, classifies, selects and reassembles at `tolerance`.
    fn attempt(&self, tolerance: f64, result: &mut BooleanResult) -> Result<Attempt> {
        let ang_tol = self.options.angular_tolerance;
        let faces_a = FaceGeometry::collect(self.a)?;
        let faces_b = FaceGeometry::collect(self.b)?;

        let mut cuts_a: Vec<Vec<(Point3, Point3)>> = vec![Vec::new(); faces_a.len()];
        let mut cuts_b: Vec<Vec<(Point3, Point3)>> = vec![Vec::new(); faces_b.len()];
        let mut curve_pieces = Vec::new();
        let mut pairs = 0;
        let mut near_tangent = 0;
        // Wide enough to reach faces parallel within the near-tangent band.
        let reach = tolerance * NEAR_PARALLEL_FACTOR;
        for (i, fa) in faces_a.iter().enumerate() {
            for (j, fb) in faces_b.iter().enumerate() {
                if !fa.aabb.overlaps(&fb.aabb, reach) {
                    continue;
                }
                pairs += 1;
                let hit = intersect_faces(fa, fb, tolerance, ang_tol);
                if hit.near_tangent {
                    near_tangent += 1;
                }
                cuts_a[i].extend(hit.cuts_a);
                cuts_b[j].extend(hit.cuts_b);
                curve_pieces.extend(hit.curve);
            }
        }
        result.face_pairs_tested = pairs;
        result.intersection_curves = chain_segments(&curve_pieces, tolerance);
        if near_tangent > 0 {
            warn!(pairs = near_tangent, "near-tangent face pairs");
            result
                .warnings
                .push(format!("{near_tangent} near-tangent face pairs"));
        }
        debug!(
            pairs,
            segments = curve_pieces.len(),
            curves = result.intersection_curves.len(),
            "face intersection done"
        );

        let probe_a = SolidProbe::new(self.a)?;
        let probe_b = SolidProbe::new(self.b)?;
        let mut builder = SolidBuilder::new()
            .with_tolerance(tolerance)
            .with_angular_tolerance(ang_tol)
            .with_coplanar_merge(self.options.merge_coplanar);

        let operands = [
            (Operand::A, &faces_a, &cuts_a, &probe_b),
            (Operand::B, &faces_b, &cuts_b, &probe_a),
        ];
        let mut fragments = 0;
        let mut kept = 0;
        for (source, faces, cuts, other) in operands {
            for (face, face_cuts) in faces.iter().zip(cuts.iter()) {
                for fragment in split_face(face, face_cuts, source, tolerance) {
                    fragments += 1;
                    let Some(class) = classify_fragment(&fragment, other, tolerance) else {
                        trace!(face = ?fragment.source_face, "dropping fragment without area");
                        continue;
                    };
                    let decision = select(fragment.source, class, self.op);
                    trace!(source = ?fragment.source, ?class, ?decision, "fragment");
                    if add_fragment(&mut builder, fragment, decision) {
                        kept += 1;
                    }
                }
            }
        }
        debug!(fragments, kept, "fragments selected");

        if kept == 0 {
            return Ok(Attempt::Empty);
        }
        let solid = match builder.build() {
            Ok(solid) => solid,
            Err(err) => return Ok(Attempt::Unbuildable(err.to_string())),
        };
        let report = validate_solid(&solid);
        if report.valid {
            Ok(Attempt::Built(solid))
        } else {
            debug!(violations = report.violations.len(), "assembled result is invalid");
            Ok(Attempt::Invalid(report.violations))
        }
    }
}

/// Computes `a op b` with default options.
#[must_use]
pub fn boolean_operation(a: &Solid, b: &Solid, op: BooleanOp) -> BooleanResult {
    Boolean::new(a, b, op).execute()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeBox, MakePrism};
    use crate::topology::PolygonFace;
    use crate::validation::validate_manifold;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn cube(min: Point3, size: f64) -> Solid {
        MakeBox::new(min, min + crate::math::Vector3::repeat(size))
            .execute()
            .unwrap()
    }

    fn volume(solid: &Solid) -> f64 {
        Volume::new(solid).execute().unwrap()
    }

    fn assert_closed(solid: &Solid) {
        for shell in solid.all_shells() {
            let report = validate_manifold(solid, shell);
            assert!(report.valid, "{:?}", report.violations);
        }
        assert!(validate_solid(solid).valid);
    }

    #[test]
    fn offset_unit_cubes() {
        init_tracing();
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(0.5, 0.0, 0.0), 1.0);

        let union = boolean_operation(&a, &b, BooleanOp::Union);
        assert!(union.success, "{:?}", union.errors);
        assert!(union.errors.is_empty());
        let solid = union.solid.unwrap();
        assert_relative_eq!(volume(&solid), 1.5, epsilon = 1e-9);
        assert_eq!(solid.face_count(), 6);
        assert_eq!(solid.vertex_count(), 8);
        assert_closed(&solid);

        let inter = boolean_operation(&a, &b, BooleanOp::Intersect);
        assert!(inter.success, "{:?}", inter.errors);
        let solid = inter.solid.unwrap();
        assert_relative_eq!(volume(&solid), 0.5, epsilon = 1e-9);
        assert_closed(&solid);

        let diff = boolean_operation(&a, &b, BooleanOp::Subtract);
        assert!(diff.success, "{:?}", diff.errors);
        let solid = diff.solid.unwrap();
        assert_relative_eq!(volume(&solid), 0.5, epsilon = 1e-9);
        let bounds = BoundingBox::new(&solid).execute().unwrap();
        assert_relative_eq!(bounds.max.x, 0.5, epsilon = 1e-9);
        assert_closed(&solid);
    }

    #[test]
    fn corner_overlap_traces_one_closed_curve() {
        let a = cube(p(0.0, 0.0, 0.0), 2.0);
        let b = cube(p(1.0, 1.0, 1.0), 2.0);
        let result = boolean_operation(&a, &b, BooleanOp::Union);
        assert!(result.success, "{:?}", result.errors);
        assert_relative_eq!(volume(result.solid.as_ref().unwrap()), 15.0, epsilon = 1e-9);
        assert_eq!(result.intersection_curves.len(), 1);
        let curve = &result.intersection_curves[0];
        assert!(curve.closed);
        assert_eq!(curve.points.len(), 6);
        assert!(result.face_pairs_tested > 0);
        assert_eq!(result.attempts, 1);

        let inter = boolean_operation(&a, &b, BooleanOp::Intersect);
        assert_relative_eq!(volume(inter.solid.as_ref().unwrap()), 1.0, epsilon = 1e-9);
        let diff = boolean_operation(&a, &b, BooleanOp::Subtract);
        let solid = diff.solid.unwrap();
        assert_relative_eq!(volume(&solid), 7.0, epsilon = 1e-9);
        assert_closed(&solid);
    }

    #[test]
    fn union_volume_is_commutative() {
        let a = cube(p(0.0, 0.0, 0.0), 2.0);
        let b = MakeBox::new(p(0.5, -1.0, 0.5), p(1.5, 3.0, 1.0)).execute().unwrap();
        let ab = boolean_operation(&a, &b, BooleanOp::Union).into_solid().unwrap();
        let ba = boolean_operation(&b, &a, BooleanOp::Union).into_solid().unwrap();
        assert_relative_eq!(volume(&ab), volume(&ba), epsilon = 1e-9);
        assert_relative_eq!(volume(&ab), 8.0 + 1.0, epsilon = 1e-9);
    }

    #[test]
    fn complement_identity() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(0.5, 0.25, 0.25), 1.0);
        let diff = boolean_operation(&a, &b, BooleanOp::Subtract).into_solid().unwrap();
        let back = boolean_operation(&diff, &b, BooleanOp::Union).into_solid().unwrap();
        assert!(volume(&back) >= volume(&a) - 1e-9);
        assert_closed(&back);
    }

    #[test]
    fn touching_boxes_fuse() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(1.0, 0.0, 0.0), 1.0);
        let solid = boolean_operation(&a, &b, BooleanOp::Union).into_solid().unwrap();
        assert_relative_eq!(volume(&solid), 2.0, epsilon = 1e-9);
        assert_eq!(solid.face_count(), 6);
        assert_eq!(solid.vertex_count(), 8);
        assert!(!solid.is_compound());
    }

    #[test]
    fn enclosed_subtract_leaves_a_void() {
        let a = cube(p(0.0, 0.0, 0.0), 4.0);
        let b = cube(p(1.0, 1.0, 1.0), 2.0);
        let solid = boolean_operation(&a, &b, BooleanOp::Subtract).into_solid().unwrap();
        assert_eq!(solid.void_shells().len(), 1);
        assert_relative_eq!(volume(&solid), 56.0, epsilon = 1e-9);
        assert_closed(&solid);

        let union = boolean_operation(&a, &b, BooleanOp::Union).into_solid().unwrap();
        assert_relative_eq!(volume(&union), 64.0, epsilon = 1e-9);
        let inter = boolean_operation(&a, &b, BooleanOp::Intersect).into_solid().unwrap();
        assert_relative_eq!(volume(&inter), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn through_hole() {
        let plate = MakeBox::new(p(0.0, 0.0, 0.0), p(4.0, 4.0, 1.0)).execute().unwrap();
        let pin = MakeBox::new(p(1.0, 1.0, -1.0), p(3.0, 3.0, 2.0)).execute().unwrap();
        let solid = boolean_operation(&plate, &pin, BooleanOp::Subtract)
            .into_solid()
            .unwrap();
        assert_relative_eq!(volume(&solid), 12.0, epsilon = 1e-9);
        assert_eq!(solid.face_count(), 10);
        assert!(solid.void_shells().is_empty());
        assert_closed(&solid);
    }

    #[test]
    fn disjoint_operands_short_circuit() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(5.0, 0.0, 0.0), 1.0);

        let union = boolean_operation(&a, &b, BooleanOp::Union);
        assert!(union.success);
        assert_eq!(union.face_pairs_tested, 0);
        let solid = union.solid.unwrap();
        assert_eq!(solid.lumps().len(), 1);
        assert_relative_eq!(volume(&solid), 2.0, epsilon = 1e-9);

        let inter = boolean_operation(&a, &b, BooleanOp::Intersect);
        assert!(!inter.success);
        assert!(inter.solid.is_none());
        assert_eq!(inter.errors, vec![BooleanError::NoOverlap]);
        assert_eq!(inter.face_pairs_tested, 0);

        let diff = boolean_operation(&a, &b, BooleanOp::Subtract);
        assert!(diff.success);
        assert_relative_eq!(volume(diff.solid.as_ref().unwrap()), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn overlapping_bounds_without_contact() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let wedge = MakePrism::new(
            vec![p(2.5, 0.0, 0.0), p(2.5, 2.5, 0.0), p(0.0, 2.5, 0.0)],
            crate::math::Vector3::new(0.0, 0.0, 1.0),
        )
        .execute()
        .unwrap();

        let inter = boolean_operation(&a, &wedge, BooleanOp::Intersect);
        assert!(!inter.success);
        assert_eq!(inter.errors, vec![BooleanError::EmptyResult]);

        let union = boolean_operation(&a, &wedge, BooleanOp::Union)
            .into_solid()
            .unwrap();
        assert!(union.is_compound());
        assert_relative_eq!(volume(&union), 1.0 + 3.125, epsilon = 1e-9);
    }

    #[test]
    fn invalid_operand_is_rejected() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let mut builder = SolidBuilder::new();
        builder
            .add_face(PolygonFace::new(vec![
                p(0.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(1.0, 0.0, 0.0),
            ]))
            .add_face(PolygonFace::new(vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 0.0, 1.0),
                p(0.0, 0.0, 1.0),
            ]));
        let open = builder.build().unwrap();

        let result = boolean_operation(&a, &open, BooleanOp::Union);
        assert!(!result.success);
        assert!(result.solid.is_none());
        assert!(matches!(
            result.errors.as_slice(),
            [BooleanError::InvalidInput { operand: Operand::B, .. }]
        ));
        assert_eq!(result.attempts, 0);
    }

    #[test]
    fn operands_are_not_modified() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(0.5, 0.5, 0.5), 1.0);
        let before = (a.face_count(), a.vertex_count(), volume(&a));
        let _ = boolean_operation(&a, &b, BooleanOp::Subtract);
        assert_eq!(before, (a.face_count(), a.vertex_count(), volume(&a)));
    }

    fn violations(result: &BooleanResult) -> &[Violation] {
        match result.errors.as_slice() {
            [BooleanError::NonManifoldResult { violations }] => violations,
            other => panic!("expected a non-manifold result, got {other:?}"),
        }
    }

    #[test]
    fn corner_touching_union_is_rejected() {
        init_tracing();
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = cube(p(1.0, 1.0, 1.0), 1.0);
        let result = boolean_operation(&a, &b, BooleanOp::Union);
        assert!(!result.success);
        assert!(result.solid.is_none());
        let pinched: Vec<_> = violations(&result)
            .iter()
            .filter_map(|v| match v {
                Violation::NonManifoldVertex { vertex, fans } => Some((*vertex, *fans)),
                _ => None,
            })
            .collect();
        assert_eq!(pinched.len(), 1);
        assert_eq!(pinched[0].1, 2);
    }

    #[test]
    fn pinched_single_shell_is_rejected() {
        // An L of two blocks and a post, closed into a ring by a cube that
        // meets the first block only at its corner (1, 1, 1).
        let block = cube(p(0.0, 0.0, 0.0), 1.0);
        let base = MakeBox::new(p(0.0, 0.0, -1.0), p(3.0, 1.0, 0.0)).execute().unwrap();
        let post = MakeBox::new(p(2.0, 1.0, -1.0), p(3.0, 2.0, 2.0)).execute().unwrap();
        let corner = cube(p(1.0, 1.0, 1.0), 1.0);

        let el = boolean_operation(&block, &base, BooleanOp::Union).into_solid().unwrap();
        let hook = boolean_operation(&el, &post, BooleanOp::Union).into_solid().unwrap();
        assert_closed(&hook);
        assert_eq!(hook.all_shells().len(), 1);

        let result = boolean_operation(&hook, &corner, BooleanOp::Union);
        assert!(!result.success);
        assert!(violations(&result)
            .iter()
            .any(|v| matches!(v, Violation::NonManifoldVertex { fans: 2, .. })));
    }

    #[test]
    fn invalid_result_is_retried_once() {
        init_tracing();
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = MakeBox::new(p(1.0, 1.0, 0.0), p(2.0, 2.0, 1.0)).execute().unwrap();
        let result = boolean_operation(&a, &b, BooleanOp::Union);
        assert!(!result.success);
        assert_eq!(result.attempts, 2);
        assert!(result.warnings.iter().any(|w| w.contains("relaxed tolerance")));
        assert!(violations(&result)
            .iter()
            .any(|v| matches!(v, Violation::EdgeIncidence { uses: 4, .. })));

        let once = Boolean::new(&a, &b, BooleanOp::Union)
            .with_options(BooleanOptions::default().with_retries(0, 100.0))
            .execute();
        assert_eq!(once.attempts, 1);
        assert!(once.warnings.iter().all(|w| !w.contains("relaxed")));
    }

    #[test]
    fn near_parallel_faces_warn() {
        let a = cube(p(0.0, 0.0, 0.0), 1.0);
        let b = MakeBox::new(p(0.5, 1e-6, 0.0), p(1.5, 1.0, 1.0)).execute().unwrap();
        for op in [BooleanOp::Union, BooleanOp::Intersect, BooleanOp::Subtract] {
            let result = boolean_operation(&a, &b, op);
            assert!(
                result.warnings.iter().any(|w| w.contains("near-tangent")),
                "{op:?}: {:?}",
                result.warnings
            );
        }
    }
}

