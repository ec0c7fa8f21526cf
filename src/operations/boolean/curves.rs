use std::collections::BTreeSet;

use crate::math::Point3;
use crate::topology::weld::VertexWelder;

use super::result::IntersectionCurve;

/// Chains intersection segments into polylines.
///
/// Endpoints within `tolerance` are joined and duplicate segments (the same
/// piece reported by two face pairs sharing an edge) are counted once. Chains
/// are traced from their open ends first; what is left forms closed loops.
#[must_use]
pub fn chain_segments(segments: &[(Point3, Point3)], tolerance: f64) -> Vec<IntersectionCurve> {
    let mut welder = VertexWelder::new(tolerance);
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (s, e) in segments {
        let (a, b) = (welder.weld(s), welder.weld(e));
        if a != b {
            edges.insert((a.min(b), a.max(b)));
        }
    }
    let points = welder.into_points();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for &(a, b) in &edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut used: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut curves = Vec::new();

    let open_starts = (0..points.len()).filter(|&v| adjacency[v].len() != 2);
    let all_starts: Vec<usize> = open_starts.chain(0..points.len()).collect();
    for start in all_starts {
        while let Some(chain) = walk(start, &adjacency, &mut used) {
            let closed = chain.len() > 2 && chain.first() == chain.last();
            let mut ids = chain;
            if closed {
                ids.pop();
            }
            curves.push(IntersectionCurve {
                points: ids.iter().map(|&i| points[i]).collect(),
                closed,
            });
        }
    }
    curves
}

/// Follows unused edges from `start` until stuck.
fn walk(
    start: usize,
    adjacency: &[Vec<usize>],
    used: &mut BTreeSet<(usize, usize)>,
) -> Option<Vec<usize>> {
    let key = |a: usize, b: usize| (a.min(b), a.max(b));
    let mut chain = vec![start];
    let mut at = start;
    loop {
        let next = adjacency[at]
            .iter()
            .copied()
            .find(|&n| !used.contains(&key(at, n)));
        let Some(next) = next else { break };
        used.insert(key(at, next));
        chain.push(next);
        at = next;
        if at == start || adjacency[at].len() != 2 {
            break;
        }
    }
    (chain.len() > 1).then_some(chain)
}
