//! Splitting the drawing into views and classifying view vertices.

use std::collections::{BTreeMap, VecDeque};

use nalgebra::Point2;
use ortho_types::{EdgeRole, VertexKind, ViewKind};
use tracing::{debug, info, instrument};

use crate::config::Tolerance;
use crate::drawing::{Curve, Drawing, Edge, EdgeId};
use crate::geometry::{distance_to_line, Rect2};
use crate::view::{CuttingChain, View, ViewId};

/// Group the Normal edges into views and distribute every other drawing
/// element to its closest view.
#[instrument(skip_all, fields(edges = drawing.edges.len()))]
pub fn construct_views(drawing: &mut Drawing, tol: &Tolerance) -> Vec<View> {
    let eps = tol.coincidence;
    let order: BTreeMap<EdgeId, usize> = drawing
        .edge_ids()
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    let components = merge_overlapping(drawing, normal_components(drawing), eps);
    let mut views: Vec<View> = Vec::with_capacity(components.len());
    for mut component in components {
        component.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
        let mut view = View::new(ViewId(views.len()));
        for id in component {
            view.add_edge(drawing, id, eps);
        }
        views.push(view);
    }
    if views.is_empty() {
        return views;
    }

    let others: Vec<EdgeId> = drawing
        .edges
        .iter()
        .filter(|(_, e)| e.role != EdgeRole::Normal)
        .map(|(id, _)| id)
        .collect();
    for id in others {
        let center = drawing.edges[id].bounds().center();
        let v = closest_view(&views, &center);
        views[v].add_edge(drawing, id, eps);
    }

    let hatch_ids: Vec<_> = drawing.hatches.keys().collect();
    for hid in hatch_ids {
        let center = drawing.hatch_bounds(hid).center();
        let v = closest_view(&views, &center);
        views[v].hatches.push(hid);
        views[v].kind = ViewKind::Sectional;
        if let Some(h) = drawing.hatches.get_mut(hid) {
            h.view = Some(ViewId(v));
        }
    }

    let label_ids: Vec<_> = drawing.labels.keys().collect();
    for lid in label_ids {
        let position = drawing.labels[lid].position;
        let v = closest_view(&views, &position);
        views[v].labels.push(lid);
        if let Some(name) = section_name(&drawing.labels[lid].text) {
            views[v].name = Some(name);
        }
        if let Some(l) = drawing.labels.get_mut(lid) {
            l.view = Some(ViewId(v));
        }
    }

    for view in views.iter_mut() {
        build_cutting_chains(drawing, view, eps);
    }

    info!(views = views.len(), "views constructed");
    views
}

/// Mark vertices where only cutting-plane traces meet as virtual.
pub fn classify_vertices(drawing: &Drawing, views: &mut [View]) {
    for view in views.iter_mut() {
        for vertex in view.vertices.values_mut() {
            let only_cutting = !vertex.edges.is_empty()
                && vertex
                    .edges
                    .iter()
                    .all(|id| drawing.edges.get(*id).is_some_and(|e| e.role == EdgeRole::Cutting));
            vertex.kind = if only_cutting {
                VertexKind::Virtual
            } else {
                VertexKind::Normal
            };
        }
    }
}

/// `A-A` names section `A`.
fn section_name(text: &str) -> Option<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    match chars.as_slice() {
        [a, '-', b] if a == b => Some(a.to_string()),
        _ => None,
    }
}

fn closest_view(views: &[View], point: &Point2<f64>) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, v) in views.iter().enumerate() {
        let d = (v.center() - point).norm();
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn normal_components(drawing: &Drawing) -> Vec<Vec<EdgeId>> {
    let mut seen = std::collections::BTreeSet::new();
    let mut components = Vec::new();
    for (seed, e) in drawing.edges.iter() {
        if e.role != EdgeRole::Normal || seen.contains(&seed) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([seed]);
        seen.insert(seed);
        while let Some(id) = queue.pop_front() {
            component.push(id);
            for ext in drawing.edges[id].extensions.iter().flatten() {
                let is_normal = drawing
                    .edges
                    .get(*ext)
                    .is_some_and(|x| x.role == EdgeRole::Normal);
                if is_normal && seen.insert(*ext) {
                    queue.push_back(*ext);
                }
            }
        }
        components.push(component);
    }
    components
}

fn merge_overlapping(drawing: &Drawing, mut components: Vec<Vec<EdgeId>>, eps: f64) -> Vec<Vec<EdgeId>> {
    let bounds_of = |c: &[EdgeId]| {
        let mut r = Rect2::empty();
        for id in c {
            r.extend(&drawing.edges[*id].bounds());
        }
        r
    };
    let mut boxes: Vec<Rect2> = components.iter().map(|c| bounds_of(c.as_slice())).collect();
    'restart: loop {
        for i in 0..components.len() {
            for j in i + 1..components.len() {
                if boxes[i].intersects(&boxes[j], eps) {
                    let moved = components.remove(j);
                    let moved_box = boxes.remove(j);
                    components[i].extend(moved);
                    boxes[i].extend(&moved_box);
                    debug!(into = i, from = j, "merged overlapping components");
                    continue 'restart;
                }
            }
        }
        break;
    }
    components
}

fn build_cutting_chains(drawing: &mut Drawing, view: &mut View, eps: f64) {
    let cutting: Vec<EdgeId> = view
        .edges_with_role(drawing, EdgeRole::Cutting)
        .filter(|id| drawing.edges[*id].is_line())
        .collect();
    let outside = |drawing: &Drawing, id: EdgeId| {
        let e = &drawing.edges[id];
        !view_contains(&view.bounds, e, eps)
    };
    let mut used: Vec<EdgeId> = Vec::new();
    let mut chains = Vec::new();
    for &seed in &cutting {
        if used.contains(&seed) || !outside(&*drawing, seed) {
            continue;
        }
        let seed_edge = &drawing.edges[seed];
        let a = seed_edge.endpoint(0);
        let dir = seed_edge.chord_from(0);
        let seed_center = seed_edge.bounds().center();
        let partner = cutting
            .iter()
            .copied()
            .filter(|id| *id != seed && !used.contains(id))
            .filter(|id| {
                let e = &drawing.edges[*id];
                distance_to_line(&e.endpoint(0), &a, &dir) < eps
                    && distance_to_line(&e.endpoint(1), &a, &dir) < eps
            })
            .min_by(|x, y| {
                let dx = (drawing.edges[*x].bounds().center() - seed_center).norm();
                let dy = (drawing.edges[*y].bounds().center() - seed_center).norm();
                dx.total_cmp(&dy)
            });
        let Some(partner) = partner else {
            continue;
        };
        if !outside(&*drawing, partner) {
            continue;
        }
        let name = view
            .labels
            .iter()
            .filter_map(|lid| drawing.labels.get(*lid))
            .filter(|l| l.text.trim().chars().count() == 1)
            .min_by(|x, y| {
                (x.position - seed_center)
                    .norm()
                    .total_cmp(&(y.position - seed_center).norm())
            })
            .map(|l| l.text.trim().to_string());
        let Some(name) = name else {
            continue;
        };
        used.push(seed);
        used.push(partner);
        chains.push((seed, partner, name));
    }

    for (seed, partner, name) in chains {
        let points = [
            drawing.edges[seed].endpoint(0),
            drawing.edges[seed].endpoint(1),
            drawing.edges[partner].endpoint(0),
            drawing.edges[partner].endpoint(1),
        ];
        let mut far = (points[0], points[1]);
        let mut far_d = -1.0;
        for i in 0..4 {
            for j in i + 1..4 {
                let d = (points[i] - points[j]).norm();
                if d > far_d {
                    far_d = d;
                    far = (points[i], points[j]);
                }
            }
        }
        view.remove_edge(drawing, seed);
        view.remove_edge(drawing, partner);
        drawing.edges.remove(seed);
        drawing.edges.remove(partner);
        let merged = drawing
            .edges
            .insert(Edge::new(Curve::line(far.0, far.1), EdgeRole::Cutting));
        view.add_edge(drawing, merged, eps);
        debug!(view = view.id.0, name = %name, "cutting chain recorded");
        view.cutting_chains.push(CuttingChain {
            name,
            edges: vec![merged],
        });
    }
}

fn view_contains(bounds: &Rect2, edge: &Edge, eps: f64) -> bool {
    bounds.contains_segment(&edge.endpoint(0), &edge.endpoint(1), eps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;
    use ortho_types::{CurveSpec, DrawingSpec};

    fn rect(spec: &mut DrawingSpec, x0: f64, y0: f64, x1: f64, y1: f64) {
        let c = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]];
        for i in 0..4 {
            spec.push_edge(CurveSpec::line(c[i], c[(i + 1) % 4]), EdgeRole::Normal);
        }
    }

    fn build(spec: &DrawingSpec) -> (Drawing, Vec<View>) {
        let tol = Tolerance::default();
        let mut d = Drawing::from_spec(spec);
        preprocess(&mut d, &tol);
        let mut views = construct_views(&mut d, &tol);
        classify_vertices(&d, &mut views);
        (d, views)
    }

    #[test]
    fn separate_rectangles_become_views() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
        rect(&mut spec, 0.0, -20.0, 10.0, -12.0);
        let (_d, views) = build(&spec);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, ViewId(0));
        assert_eq!(views[0].edges.len(), 4);
        assert_eq!(views[0].vertices.len(), 4);
    }

    #[test]
    fn overlapping_components_merge() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 10.0);
        rect(&mut spec, 2.0, 2.0, 4.0, 4.0);
        let (_d, views) = build(&spec);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].edges.len(), 8);
    }

    #[test]
    fn hatches_and_labels_go_to_closest_view() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
        rect(&mut spec, 20.0, 0.0, 30.0, 5.0);
        spec.push_label([25.0, 7.0], " B-B ")
            .push_hatch(vec![CurveSpec::line([21.0, 1.0], [22.0, 2.0])]);
        let (_d, views) = build(&spec);
        assert_eq!(views[1].kind, ViewKind::Sectional);
        assert_eq!(views[1].name.as_deref(), Some("B"));
        assert_eq!(views[0].kind, ViewKind::Regular);
        assert!(views[0].name.is_none());
    }

    #[test]
    fn cutting_pair_becomes_chain() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
        rect(&mut spec, 20.0, 0.0, 30.0, 5.0);
        spec.push_edge(CurveSpec::line([5.0, -2.0], [5.0, -0.5]), EdgeRole::Cutting)
            .push_edge(CurveSpec::line([5.0, 5.5], [5.0, 7.0]), EdgeRole::Cutting)
            .push_label([6.0, -2.0], "A");
        let (d, views) = build(&spec);
        let chain = &views[0].cutting_chains[0];
        assert_eq!(chain.name, "A");
        let e = &d.edges[chain.edges[0]];
        assert!((e.endpoint(0) - e.endpoint(1)).norm() > 8.9);
        let virtuals = views[0]
            .vertices
            .values()
            .filter(|v| v.kind == VertexKind::Virtual)
            .count();
        assert_eq!(virtuals, 2);
    }

    #[test]
    fn section_names_need_matching_letters() {
        assert_eq!(section_name("A-A").as_deref(), Some("A"));
        assert_eq!(section_name("A-B"), None);
        assert_eq!(section_name("AA"), None);
    }
}
