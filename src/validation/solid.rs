use std::collections::HashMap;

use tracing::debug;

use crate::operations::query::containment::SolidProbe;
use crate::operations::query::volume::shell_signed_volume;
use crate::topology::{ShellId, Solid, VertexId};

use super::{validate_manifold, ValidationReport, Violation};

/// Checks that a solid is a valid closed, oriented boundary.
///
/// Every shell must pass [`validate_manifold`]. Outer shells and lumps must
/// enclose positive signed volume; void shells must enclose negative signed
/// volume and lie inside the material of the outer shells. Shells may not
/// share vertices, since the faces around such a vertex form one fan per
/// shell.
#[must_use]
pub fn validate_solid(solid: &Solid) -> ValidationReport {
    let mut violations = Vec::new();

    let outers: Vec<ShellId> = std::iter::once(solid.outer_shell())
        .chain(solid.lumps().iter().copied())
        .collect();

    for &shell in &outers {
        violations.extend(validate_manifold(solid, shell).violations);
        match shell_signed_volume(solid, shell) {
            Ok(v) if v <= 0.0 => violations.push(Violation::InvertedShell {
                shell,
                signed_volume: v,
            }),
            Ok(_) => {}
            Err(err) => violations.push(Violation::MissingEntity(err.to_string())),
        }
    }

    for &shell in solid.void_shells() {
        violations.extend(validate_manifold(solid, shell).violations);
        match shell_signed_volume(solid, shell) {
            Ok(v) if v >= 0.0 => violations.push(Violation::VoidNotInverted {
                shell,
                signed_volume: v,
            }),
            Ok(_) => {}
            Err(err) => violations.push(Violation::MissingEntity(err.to_string())),
        }
        if !void_inside_material(solid, shell, &outers) {
            violations.push(Violation::VoidOutsideMaterial { shell });
        }
    }

    violations.extend(shared_vertices(solid));

    if !violations.is_empty() {
        debug!(count = violations.len(), "solid failed validation");
    }
    ValidationReport::from_violations(violations)
}

/// Vertices used by more than one shell, with the number of shells.
fn shared_vertices(solid: &Solid) -> Vec<Violation> {
    let mut owners: HashMap<VertexId, usize> = HashMap::new();
    for shell in solid.all_shells() {
        if let Ok(vertices) = solid.shell_vertices(shell) {
            for v in vertices {
                *owners.entry(v).or_default() += 1;
            }
        }
    }
    let mut shared: Vec<(VertexId, usize)> = owners.into_iter().filter(|&(_, n)| n > 1).collect();
    shared.sort_unstable();
    shared
        .into_iter()
        .map(|(vertex, fans)| Violation::NonManifoldVertex { vertex, fans })
        .collect()
}

fn void_inside_material(solid: &Solid, void: ShellId, outers: &[ShellId]) -> bool {
    let Some(sample) = solid
        .shell_vertices(void)
        .ok()
        .and_then(|vs| vs.first().copied())
        .and_then(|v| solid.vertex(v).ok().map(|d| d.point))
    else {
        return false;
    };
    SolidProbe::for_shells(solid, outers).is_ok_and(|probe| probe.winding_number(&sample) > 0.5)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::boolean::{boolean_operation, BooleanOp};
    use crate::operations::creation::MakeBox;
    use crate::topology::{PolygonFace, SolidBuilder};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn box_is_valid() {
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 1.0, 1.0)).execute().unwrap();
        assert!(validate_solid(&solid).valid);
    }

    #[test]
    fn fully_flipped_box_is_inverted() {
        let mut solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute().unwrap();
        let faces: Vec<_> = solid.faces().map(|(id, _)| id).collect();
        for f in faces {
            solid.flip_face(f).unwrap();
        }
        let report = validate_solid(&solid);
        assert!(!report.valid);
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::InvertedShell { .. })));
        // Still manifold, just inside out.
        assert!(validate_manifold(&solid, solid.outer_shell()).valid);
    }

    fn boxes(corners: &[(Point3, Point3)]) -> Solid {
        let mut builder = SolidBuilder::new();
        for &(min, max) in corners {
            let cube = MakeBox::new(min, max).execute().unwrap();
            for (id, _) in cube.faces() {
                builder.add_face(PolygonFace::new(cube.face_polygon(id).unwrap().outer));
            }
        }
        builder.build().unwrap()
    }

    fn hollow_box() -> Solid {
        let outer = MakeBox::new(p(0.0, 0.0, 0.0), p(4.0, 4.0, 4.0)).execute().unwrap();
        let inner = MakeBox::new(p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0)).execute().unwrap();
        boolean_operation(&outer, &inner, BooleanOp::Subtract)
            .into_solid()
            .unwrap()
    }

    #[test]
    fn shells_sharing_a_corner_are_not_manifold() {
        let solid = boxes(&[
            (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)),
            (p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)),
        ]);
        assert_eq!(solid.lumps().len(), 1);
        // Each shell on its own is fine.
        for shell in solid.all_shells() {
            assert!(validate_manifold(&solid, shell).valid);
        }
        let report = validate_solid(&solid);
        assert!(!report.valid);
        let pinched: Vec<_> = report
            .violations
            .iter()
            .filter_map(|v| match v {
                Violation::NonManifoldVertex { vertex, fans } => Some((*vertex, *fans)),
                _ => None,
            })
            .collect();
        assert_eq!(pinched.len(), 1);
        let (vertex, fans) = pinched[0];
        assert_eq!(fans, 2);
        let corner = solid.vertex(vertex).unwrap().point;
        assert!((corner - p(1.0, 1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn separate_lumps_are_valid() {
        let solid = boxes(&[
            (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)),
            (p(2.0, 2.0, 2.0), p(3.0, 3.0, 3.0)),
        ]);
        assert!(validate_solid(&solid).valid);
    }

    #[test]
    fn void_with_outward_normals_is_reported() {
        let mut solid = hollow_box();
        assert!(validate_solid(&solid).valid);
        let void = solid.void_shells()[0];
        let faces = solid.shell_faces(void).unwrap().to_vec();
        for f in faces {
            solid.flip_face(f).unwrap();
        }
        let report = validate_solid(&solid);
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::VoidNotInverted { shell, .. } if *shell == void)));
        assert!(!report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::VoidOutsideMaterial { .. })));
    }

    #[test]
    fn void_outside_the_material_is_reported() {
        let mut solid = boxes(&[
            (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)),
            (p(3.0, 0.0, 0.0), p(4.0, 1.0, 1.0)),
        ]);
        let outer = solid.outer_shell();
        let stray = solid.lumps()[0];
        let faces = solid.shell_faces(stray).unwrap().to_vec();
        for f in faces {
            solid.flip_face(f).unwrap();
        }
        solid.set_shell_roles(outer, Vec::new(), vec![stray]);

        let report = validate_solid(&solid);
        assert!(!report.valid);
        assert!(report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::VoidOutsideMaterial { shell } if *shell == stray)));
        assert!(!report
            .violations
            .iter()
            .any(|v| matches!(v, Violation::VoidNotInverted { .. })));
    }
}
