use std::collections::{HashMap, HashSet};

use crate::error::TopologyError;
use crate::topology::{EdgeId, HalfEdgeId, ShellId, Solid, VertexId};

use super::{ValidationReport, Violation};

/// Checks that a shell is a closed 2-manifold.
///
/// Every loop must close, every edge must be used by exactly two half-edges
/// running in opposite directions and twinned with each other, and the faces
/// around every vertex must form a single fan.
#[must_use]
pub fn validate_manifold(solid: &Solid, shell: ShellId) -> ValidationReport {
    let mut violations = Vec::new();
    if let Err(err) = check_shell(solid, shell, &mut violations) {
        violations.push(err.into());
    }
    ValidationReport::from_violations(violations)
}

fn check_shell(
    solid: &Solid,
    shell: ShellId,
    violations: &mut Vec<Violation>,
) -> Result<(), TopologyError> {
    let mut half_edges: Vec<HalfEdgeId> = Vec::new();

    for &face_id in solid.shell_faces(shell)? {
        let face = solid.face(face_id)?;
        for loop_id in face.loops() {
            let hes = &solid.face_loop(loop_id)?.half_edges;
            if hes.len() < 3 {
                violations.push(Violation::DegenerateLoop { loop_id });
            }
            let n = hes.len();
            let mut closed = true;
            for i in 0..n {
                let he = solid.half_edge(hes[i])?;
                if he.loop_id != loop_id {
                    closed = false;
                }
                let next = solid.half_edge(hes[(i + 1) % n])?;
                if solid.half_edge_target(hes[i])? != next.origin {
                    closed = false;
                }
            }
            if !closed {
                violations.push(Violation::OpenLoop {
                    face: face_id,
                    loop_id,
                });
            }
            half_edges.extend_from_slice(hes);
        }
    }

    let mut uses: HashMap<EdgeId, usize> = HashMap::new();
    for &h in &half_edges {
        *uses.entry(solid.half_edge(h)?.edge).or_default() += 1;
    }
    let mut uses: Vec<(EdgeId, usize)> = uses.into_iter().collect();
    uses.sort_by_key(|(e, _)| *e);
    for (edge, count) in uses {
        if count != 2 {
            violations.push(Violation::EdgeIncidence { edge, uses: count });
        }
    }

    for &h in &half_edges {
        let he = solid.half_edge(h)?;
        let Some(t) = he.twin else {
            violations.push(Violation::MissingTwin { half_edge: h });
            continue;
        };
        let Ok(twin) = solid.half_edge(t) else {
            violations.push(Violation::AsymmetricTwin { half_edge: h, twin: t });
            continue;
        };
        if twin.twin != Some(h) || twin.edge != he.edge {
            violations.push(Violation::AsymmetricTwin { half_edge: h, twin: t });
        } else if twin.origin == he.origin && h < t {
            violations.push(Violation::TwinSameDirection { edge: he.edge });
        }
    }

    check_vertex_fans(solid, &half_edges, violations)?;
    Ok(())
}

/// Walks the faces around each vertex; more than one fan means the surface
/// pinches there.
fn check_vertex_fans(
    solid: &Solid,
    half_edges: &[HalfEdgeId],
    violations: &mut Vec<Violation>,
) -> Result<(), TopologyError> {
    let mut outgoing: HashMap<VertexId, Vec<HalfEdgeId>> = HashMap::new();
    for &h in half_edges {
        outgoing.entry(solid.half_edge(h)?.origin).or_default().push(h);
    }

    let mut vertices: Vec<VertexId> = outgoing.keys().copied().collect();
    vertices.sort();
    for vertex in vertices {
        let spokes = &outgoing[&vertex];
        let mut seen: HashSet<HalfEdgeId> = HashSet::new();
        let mut fans = 0usize;
        for &start in spokes {
            if seen.contains(&start) {
                continue;
            }
            fans += 1;
            let mut current = start;
            // Each step rotates to the next face around the vertex.
            for _ in 0..=spokes.len() {
                if !seen.insert(current) {
                    break;
                }
                let prev = solid.prev_half_edge(current)?;
                let Some(twin) = solid.half_edge(prev)?.twin else {
                    break;
                };
                if solid.half_edge(twin)?.origin != vertex {
                    break;
                }
                current = twin;
            }
        }
        if fans > 1 {
            violations.push(Violation::NonManifoldVertex { vertex, fans });
        }
    }
    Ok(())
}
