//! Relation Constructor and Relation Filter.
//!
//! Proposes belief-weighted alignments between every pair of views, fuses
//! them with Dempster's rule and keeps the relations on a maximum-support
//! spanning tree of the views.

use std::collections::BTreeSet;

use ortho_types::{EdgeRole, RelationAxis, RelationKind};
use tracing::{debug, info, instrument};

use crate::config::ReconstructionConfig;
use crate::drawing::Drawing;
use crate::error::ReconstructError;
use crate::evidence::EvidenceSet;
use crate::geometry::distance_to_line;
use crate::view::{CuttingChain, View, ViewId, ViewRelation};

type Pair = (usize, usize);

fn pair(a: ViewId, b: ViewId) -> Pair {
    if a.0 < b.0 {
        (a.0, b.0)
    } else {
        (b.0, a.0)
    }
}

/// Whether the segment between the centers of `a` and `b` misses every other view.
fn unobstructed(views: &[View], a: usize, b: usize) -> bool {
    let (ca, cb) = (views[a].center(), views[b].center());
    views
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != a && *i != b)
        .all(|(_, v)| !v.bounds.intersects_segment(&ca, &cb))
}

/// Propose relations for every ordered pair of views. Relations are stored
/// on the source view.
#[instrument(skip_all, fields(views = views.len()))]
pub fn construct_relations(drawing: &Drawing, views: &mut [View], config: &ReconstructionConfig) {
    let eps = config.tolerance.coincidence;
    let geometric = config.evidence.geometric_belief;
    let mut source_chains: Vec<(usize, CuttingChain)> = Vec::new();

    for a in 0..views.len() {
        let mut found = Vec::new();
        for b in 0..views.len() {
            if a == b {
                continue;
            }
            let (va, vb) = (&views[a], &views[b]);
            let target = vb.id;
            let mut push = |kind, axis, belief| {
                found.push(ViewRelation {
                    kind,
                    axis,
                    target,
                    belief,
                })
            };

            if unobstructed(views, a, b) {
                let (wa, ha) = (va.bounds.width(), va.bounds.height());
                let (wb, hb) = (vb.bounds.width(), vb.bounds.height());
                if (wa - wb).abs() < eps {
                    push(RelationKind::Parallel, RelationAxis::X, geometric);
                }
                if (wa - hb).abs() < eps {
                    push(RelationKind::Perpendicular, RelationAxis::X, geometric);
                }
                if (ha - hb).abs() < eps {
                    push(RelationKind::Parallel, RelationAxis::Y, geometric);
                }
                if (ha - wb).abs() < eps {
                    push(RelationKind::Perpendicular, RelationAxis::Y, geometric);
                }
            }

            if let (true, Some(name)) = (vb.is_sectional(), vb.name.as_ref()) {
                if let Some(chain) = va.cutting_chains.iter().find(|c| &c.name == name) {
                    if let Some(e) = chain.edges.first().and_then(|id| drawing.edges.get(*id)) {
                        let d = e.chord_from(0);
                        push(
                            RelationKind::Name,
                            RelationAxis::of_direction(d.x, d.y),
                            config.evidence.name_belief,
                        );
                        source_chains.push((b, chain.clone()));
                    }
                }
            }

            let center_lines: Vec<_> = vb
                .edges_with_role(drawing, EdgeRole::Center)
                .filter_map(|id| drawing.edges.get(id))
                .filter(|e| e.is_line())
                .map(|e| (e.endpoint(0), e.chord_from(0)))
                .collect();
            if center_lines.is_empty() {
                continue;
            }
            let arcs = va
                .edges_with_role(drawing, EdgeRole::Normal)
                .filter_map(|id| drawing.edges.get(id)?.curve.as_arc().copied());
            for arc in arcs {
                let mut hit = false;
                for (start, dir) in &center_lines {
                    if distance_to_line(&arc.center, start, dir) < eps {
                        let axis = RelationAxis::of_direction(dir.x, dir.y).perpendicular();
                        push(RelationKind::Center, axis, geometric);
                        hit = true;
                    }
                }
                if hit {
                    break;
                }
            }
        }
        debug!(view = a, relations = found.len(), "relations proposed");
        views[a].relations = found;
    }

    for (b, chain) in source_chains {
        views[b].source_chain = Some(chain);
    }
}

/// Keep only the relations on a maximum-support spanning tree of the views
/// and record the tree edges as adjacency. Returns the tree edges in the
/// order they were added.
#[instrument(skip_all, fields(views = views.len()))]
pub fn filter_relations(views: &mut [View]) -> Result<Vec<(ViewId, ViewId)>, ReconstructError> {
    let n = views.len();
    if n < 2 {
        return Err(ReconstructError::TooFewViews { count: n });
    }
    let frame: BTreeSet<Pair> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    let mut evidence = EvidenceSet::vacuous(frame.clone());
    let mut related = BTreeSet::new();
    for view in views.iter() {
        for r in &view.relations {
            let p = pair(view.id, r.target);
            related.insert(p);
            let source = EvidenceSet::simple_support(frame.clone(), BTreeSet::from([p]), r.belief);
            evidence = evidence.combine(&source)?;
        }
    }
    // Mass committed to the pair alone. With two views the frame is that
    // pair, so an unrelated pair must be ruled out explicitly.
    let support = |p: Pair| {
        if related.contains(&p) {
            evidence.mass(&BTreeSet::from([p]))
        } else {
            0.0
        }
    };

    let mut in_tree = vec![false; n];
    in_tree[0] = true;
    let mut tree: Vec<Pair> = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut best: Option<(Pair, f64)> = None;
        for &(i, j) in &frame {
            if in_tree[i] == in_tree[j] {
                continue;
            }
            let s = support((i, j));
            if best.map_or(true, |(_, b)| s > b) {
                best = Some(((i, j), s));
            }
        }
        match best {
            Some(((i, j), s)) if s > 0.0 => {
                debug!(a = i, b = j, support = s, "tree edge");
                in_tree[i] = true;
                in_tree[j] = true;
                tree.push((i, j));
            }
            _ => {
                let missing = in_tree.iter().position(|t| !t).unwrap_or(0);
                return Err(ReconstructError::Disconnected {
                    view: ViewId(missing),
                });
            }
        }
    }

    for view in views.iter_mut() {
        let id = view.id;
        view.relations.retain(|r| tree.contains(&pair(id, r.target)));
        view.adjacent.clear();
    }
    for &(i, j) in &tree {
        views[i].adjacent.push(ViewId(j));
        views[j].adjacent.push(ViewId(i));
    }
    info!(edges = tree.len(), "relation tree selected");
    Ok(tree.into_iter().map(|(i, j)| (ViewId(i), ViewId(j))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerance;
    use crate::geometry::Rect2;
    use crate::preprocess::preprocess;
    use crate::view_construct::construct_views;
    use nalgebra::Point2;
    use ortho_types::{CurveSpec, DrawingSpec};
    use std::f64::consts::TAU;

    fn boxed(id: usize, x0: f64, y0: f64, x1: f64, y1: f64) -> View {
        let mut v = View::new(ViewId(id));
        v.bounds = Rect2::new(Point2::new(x0, y0), Point2::new(x1, y1));
        v
    }

    #[test]
    fn equal_widths_give_parallel_x() {
        let mut views = vec![boxed(0, 0.0, 0.0, 10.0, 5.0), boxed(1, 0.0, -20.0, 10.0, -12.0)];
        construct_relations(&Drawing::default(), &mut views, &ReconstructionConfig::default());
        assert_eq!(views[0].relations.len(), 1);
        let r = views[0].relations[0];
        assert_eq!((r.kind, r.axis, r.target), (RelationKind::Parallel, RelationAxis::X, ViewId(1)));
        assert_eq!(r.belief, 0.3);
        assert_eq!(views[1].relations[0].target, ViewId(0));
    }

    #[test]
    fn square_views_relate_along_both_axes() {
        let mut views = vec![boxed(0, 0.0, 0.0, 4.0, 4.0), boxed(1, 10.0, 0.0, 14.0, 4.0)];
        construct_relations(&Drawing::default(), &mut views, &ReconstructionConfig::default());
        assert_eq!(views[0].relations.len(), 4);
    }

    #[test]
    fn middle_view_obstructs() {
        let mut views = vec![
            boxed(0, 0.0, 0.0, 4.0, 2.0),
            boxed(1, 10.0, 0.0, 14.0, 2.0),
            boxed(2, 20.0, 0.0, 24.0, 2.0),
        ];
        construct_relations(&Drawing::default(), &mut views, &ReconstructionConfig::default());
        assert!(views[0].relations.iter().all(|r| r.target != ViewId(2)));
        assert!(views[0].relations.iter().any(|r| r.target == ViewId(1)));
    }

    #[test]
    fn filter_builds_a_chain_tree() {
        let mut views = vec![
            boxed(0, 0.0, 0.0, 4.0, 2.0),
            boxed(1, 10.0, 0.0, 14.0, 2.0),
            boxed(2, 20.0, 0.0, 24.0, 2.0),
        ];
        construct_relations(&Drawing::default(), &mut views, &ReconstructionConfig::default());
        let tree = filter_relations(&mut views).unwrap();
        assert_eq!(tree, vec![(ViewId(0), ViewId(1)), (ViewId(1), ViewId(2))]);
        assert_eq!(views[1].adjacent, vec![ViewId(0), ViewId(2)]);
        assert_eq!(views[0].adjacent, vec![ViewId(1)]);
    }

    #[test]
    fn unrelated_views_are_disconnected() {
        let mut views = vec![boxed(0, 0.0, 0.0, 4.0, 2.0), boxed(1, 10.0, 0.0, 17.0, 9.0)];
        construct_relations(&Drawing::default(), &mut views, &ReconstructionConfig::default());
        assert_eq!(
            filter_relations(&mut views),
            Err(ReconstructError::Disconnected { view: ViewId(1) })
        );
    }

    #[test]
    fn single_view_is_rejected() {
        let mut views = vec![boxed(0, 0.0, 0.0, 1.0, 1.0)];
        assert_eq!(
            filter_relations(&mut views),
            Err(ReconstructError::TooFewViews { count: 1 })
        );
    }

    fn rect(spec: &mut DrawingSpec, x0: f64, y0: f64, x1: f64, y1: f64) {
        let c = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]];
        for i in 0..4 {
            spec.push_edge(CurveSpec::line(c[i], c[(i + 1) % 4]), EdgeRole::Normal);
        }
    }

    fn views_of(spec: &DrawingSpec) -> (Drawing, Vec<View>) {
        let tol = Tolerance::default();
        let mut d = Drawing::from_spec(spec);
        preprocess(&mut d, &tol);
        let views = construct_views(&mut d, &tol);
        (d, views)
    }

    #[test]
    fn cutting_chain_names_the_section_view() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
        rect(&mut spec, 20.0, 0.0, 26.0, 3.0);
        spec.push_edge(CurveSpec::line([5.0, -2.0], [5.0, -0.5]), EdgeRole::Cutting)
            .push_edge(CurveSpec::line([5.0, 5.5], [5.0, 7.0]), EdgeRole::Cutting)
            .push_label([6.0, -2.0], "A")
            .push_label([23.0, 4.5], "A-A")
            .push_hatch(vec![CurveSpec::line([21.0, 1.0], [22.0, 2.0])]);
        let (d, mut views) = views_of(&spec);
        assert!(views[1].is_sectional());
        let config = ReconstructionConfig::default();
        construct_relations(&d, &mut views, &config);

        assert_eq!(views[0].relations.len(), 1);
        let r = views[0].relations[0];
        assert_eq!((r.kind, r.axis, r.target), (RelationKind::Name, RelationAxis::Y, ViewId(1)));
        assert_eq!(r.belief, 0.8);
        assert!(views[1].relations.is_empty());
        let chain = views[1].source_chain.as_ref().unwrap();
        assert_eq!(chain.name, "A");
        assert_eq!(chain.edges, views[0].cutting_chains[0].edges);
    }

    #[test]
    fn center_line_through_an_arc_center_aligns_across_it() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 10.0);
        spec.push_edge(CurveSpec::circular_arc([5.0, 5.0], 2.0, 0.0, TAU), EdgeRole::Normal);
        rect(&mut spec, 0.0, -20.0, 10.0, -14.0);
        spec.push_edge(CurveSpec::line([5.0, -21.0], [5.0, -13.0]), EdgeRole::Center)
            .push_edge(CurveSpec::line([-1.0, -17.0], [11.0, -17.0]), EdgeRole::Center);
        let (d, mut views) = views_of(&spec);
        assert_eq!(views.len(), 2);
        construct_relations(&d, &mut views, &ReconstructionConfig::default());

        // Both half arcs share the center; only the first one is scanned.
        let centers: Vec<_> = views[0]
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::Center)
            .collect();
        assert_eq!(centers.len(), 1);
        assert_eq!((centers[0].axis, centers[0].target), (RelationAxis::X, ViewId(1)));
        assert_eq!(centers[0].belief, 0.3);
        assert!(views[1].relations.iter().all(|r| r.kind != RelationKind::Center));
    }
}
