//! Loop Formation Constructor: cross-view loop matching, cone and sphere
//! detection, pruning and Protrusion/Depression classification.

use std::collections::BTreeSet;

use nalgebra::{Point2, Point3, Vector3};
use ortho_types::FormationKind;
use tracing::{debug, info, instrument};

use crate::config::{ReconstructionConfig, Tolerance};
use crate::drawing::{Drawing, EdgeId};
use crate::formation::{ConeGeometry, FormationClass, LoopFormation, LoopRef};
use crate::geometry::are_parallel;
use crate::loop_merge::merge_loops;
use crate::loops::Loop;
use crate::view::View;
use crate::view_box::ViewBox;

/// Coordinates along `axis` of a loop's corners, plus its 3D extent.
fn corner_coords(view: &View, l: &Loop, axis: usize, normal_only: bool) -> Vec<f64> {
    let mut coords: Vec<f64> = l
        .corners()
        .iter()
        .filter(|c| !normal_only || c.kind == ortho_types::CornerKind::Normal)
        .filter_map(|c| view.vertices.get(c.vertex))
        .map(|v| v.position3d[axis])
        .collect();
    coords.push(l.bounds3d().min[axis]);
    coords.push(l.bounds3d().max[axis]);
    coords
}

fn covered(needles: &[f64], haystack: &[f64], eps: f64) -> bool {
    needles
        .iter()
        .all(|n| haystack.iter().any(|h| (n - h).abs() < eps))
}

/// Whether two loops of views with different projection axes can project the
/// same feature: equal extents along the shared axis and corner coverage in
/// at least one direction.
pub fn loops_match(vb: &ViewBox, src: LoopRef, tgt: LoopRef, eps: f64) -> bool {
    let (Some(sv), Some(tv)) = (vb.view(src.view), vb.view(tgt.view)) else {
        return false;
    };
    let (Some(ps), Some(pt)) = (sv.perpendicular_axis(), tv.perpendicular_axis()) else {
        return false;
    };
    if ps == pt {
        return false;
    }
    let (Some(sl), Some(tl)) = (sv.loops.get(src.id), tv.loops.get(tgt.id)) else {
        return false;
    };
    let idx = 3 - ps - pt;
    let (sb, tb) = (sl.bounds3d(), tl.bounds3d());
    if (sb.min[idx] - tb.min[idx]).abs() >= eps || (sb.max[idx] - tb.max[idx]).abs() >= eps {
        return false;
    }
    covered(
        &corner_coords(sv, sl, idx, true),
        &corner_coords(tv, tl, idx, false),
        eps,
    ) || covered(
        &corner_coords(tv, tl, idx, true),
        &corner_coords(sv, sl, idx, false),
        eps,
    )
}

/// Center and radius when every edge is a circular arc around one center.
pub fn circle_of(drawing: &Drawing, l: &Loop, eps: f64) -> Option<(Point2<f64>, f64)> {
    let mut result: Option<(Point2<f64>, f64)> = None;
    for id in l.edges() {
        let arc = drawing.edges.get(*id)?.curve.as_arc()?;
        if !arc.is_circular(eps) {
            return None;
        }
        match result {
            Some((c, _)) if (c - arc.center).norm() >= eps => return None,
            Some(_) => {}
            None => result = Some((arc.center, arc.radius())),
        }
    }
    result
}

/// Opposite parallel edges of a four-line loop.
pub fn trapezoid_sides(drawing: &Drawing, l: &Loop, tol: &Tolerance) -> Option<(EdgeId, EdgeId)> {
    let edges = l.edges();
    if edges.len() != 4 {
        return None;
    }
    let mut dirs = Vec::with_capacity(4);
    for id in edges {
        let e = drawing.edges.get(*id)?;
        if !e.is_line() {
            return None;
        }
        dirs.push(e.chord_from(0));
    }
    if are_parallel(&dirs[1], &dirs[3], tol.angular) {
        Some((edges[1], edges[3]))
    } else if are_parallel(&dirs[0], &dirs[2], tol.angular) {
        Some((edges[0], edges[2]))
    } else {
        None
    }
}

struct Cone {
    circle: LoopRef,
    trapezoid: LoopRef,
    inner: LoopRef,
    geometry: ConeGeometry,
}

fn detect_cone(drawing: &Drawing, vb: &ViewBox, group: &[LoopRef], tol: &Tolerance) -> Option<Cone> {
    let eps = tol.coincidence;
    for &c in group {
        let cv = vb.view(c.view)?;
        let Some(cl) = cv.loops.get(c.id) else {
            continue;
        };
        let Some((center, radius)) = circle_of(drawing, cl, eps) else {
            continue;
        };
        for &t in group.iter().filter(|t| t.view != c.view) {
            let tv = vb.view(t.view)?;
            let Some(tl) = tv.loops.get(t.id) else {
                continue;
            };
            let Some((ea, eb)) = trapezoid_sides(drawing, tl, tol) else {
                continue;
            };
            let (Some(pc), Some(pt)) = (cv.perpendicular_axis(), tv.perpendicular_axis()) else {
                continue;
            };
            if pc == pt {
                continue;
            }
            let idx = 3 - pc - pt;
            let edge_extent = |id: EdgeId| {
                drawing
                    .edges
                    .get(id)
                    .map(|e| tv.transform.transform_rect2(&e.bounds()))
            };
            let same = |a: (f64, f64), b: (f64, f64)| {
                (a.0 - b.0).abs() < tol.fold && (a.1 - b.1).abs() < tol.fold
            };
            let c_ext = (cl.bounds3d().min[idx], cl.bounds3d().max[idx]);

            for (inner_id, inner) in cv.loops.iter().filter(|(id, _)| *id != c.id) {
                let Some((inner_center, inner_radius)) = circle_of(drawing, inner, eps) else {
                    continue;
                };
                if (inner_center - center).norm() >= eps {
                    continue;
                }
                let i_ext = (inner.bounds3d().min[idx], inner.bounds3d().max[idx]);
                for (one, two) in [(ea, eb), (eb, ea)] {
                    let (Some(b1), Some(b2)) = (edge_extent(one), edge_extent(two)) else {
                        continue;
                    };
                    if !same((b1.min[idx], b1.max[idx]), c_ext) || !same((b2.min[idx], b2.max[idx]), i_ext) {
                        continue;
                    }
                    let lc = |v: Vector3<f64>| cv.transform.transform_vector(&v);
                    let mut base = cv.transform.transform_point2(&center);
                    base[pc] = b1.min[pc];
                    let mid = |id: EdgeId| drawing.edges.get(id).map(|e| e.bounds().center());
                    let (m1, m2) = (mid(one)?, mid(two)?);
                    let geometry = ConeGeometry {
                        base,
                        height: tv.transform.transform_vector2(&(m2 - m1)),
                        base_x: lc(Vector3::new(0.0, radius, 0.0)),
                        base_y: lc(Vector3::new(radius, 0.0, 0.0)),
                        top_x: lc(Vector3::new(0.0, inner_radius, 0.0)),
                        top_y: lc(Vector3::new(inner_radius, 0.0, 0.0)),
                    };
                    return Some(Cone {
                        circle: c,
                        trapezoid: t,
                        inner: LoopRef {
                            view: c.view,
                            id: inner_id,
                        },
                        geometry,
                    });
                }
            }
        }
    }
    None
}

/// Sphere class when every loop is a circle and the folded centers agree on
/// every coordinate two loops both see.
fn sphere_class(drawing: &Drawing, vb: &ViewBox, loops: &[LoopRef], tol: &Tolerance) -> Option<FormationClass> {
    if loops.len() < 2 {
        return None;
    }
    let mut center = Point3::<f64>::origin();
    let mut known = [false; 3];
    let mut radius = None;
    for r in loops {
        let view = vb.view(r.view)?;
        let l = view.loops.get(r.id)?;
        let (c2, rad) = circle_of(drawing, l, tol.coincidence)?;
        let c3 = view.transform.transform_point2(&c2);
        let perp = view.perpendicular_axis()?;
        radius.get_or_insert(rad);
        for k in (0..3).filter(|k| *k != perp) {
            if known[k] && (center[k] - c3[k]).abs() >= tol.fold {
                return None;
            }
            center[k] = c3[k];
            known[k] = true;
        }
    }
    Some(FormationClass::Sphere {
        center,
        radius: radius?,
    })
}

/// Protrusion/Depression rules, first match wins.
pub fn classify_formation(drawing: &Drawing, vb: &ViewBox, f: &LoopFormation, tol: &Tolerance) -> FormationKind {
    let loops: Vec<(&View, &Loop, bool)> = f
        .loops
        .iter()
        .filter_map(|r| {
            let v = vb.view(r.view)?;
            Some((v, v.loops.get(r.id)?, v.outer_loop == Some(r.id)))
        })
        .collect();

    if loops.iter().any(|(v, l, _)| v.is_sectional() && l.hatched) {
        return FormationKind::Protrusion;
    }
    let borders_hatch = |l: &Loop| {
        l.edges()
            .iter()
            .any(|e| drawing.edges.get(*e).is_some_and(|x| x.hatch.is_some()))
    };
    if loops
        .iter()
        .any(|(v, l, _)| v.is_sectional() && l.fundamental && !l.hatched && borders_hatch(*l))
    {
        return FormationKind::Depression;
    }
    if loops.iter().any(|(_, _, outer)| *outer) {
        return FormationKind::Protrusion;
    }
    for (v, l, _) in &loops {
        let Some(outer) = v.outer() else {
            continue;
        };
        if l.vertex_set().is_subset(outer.vertex_set()) {
            return if merge_loops(l, outer, drawing, tol).is_some() {
                FormationKind::Protrusion
            } else {
                FormationKind::Depression
            };
        }
    }
    if loops.iter().any(|(_, l, _)| !l.solid) {
        return FormationKind::Depression;
    }
    FormationKind::Protrusion
}

/// Build, prune and classify the loop formations of a folded view box.
/// Formations are stored on the view box; the count is returned.
#[instrument(skip_all, fields(views = vb.views.len()))]
pub fn construct_formations(drawing: &Drawing, vb: &mut ViewBox, config: &ReconstructionConfig) -> usize {
    let tol = &config.tolerance;
    let limits = &config.formation;
    let refs = vb.loop_refs();
    let mut seen: BTreeSet<BTreeSet<LoopRef>> = BTreeSet::new();
    let mut formations: Vec<LoopFormation> = Vec::new();

    for &src in &refs {
        let mut group = vec![src];
        group.extend(
            refs.iter()
                .copied()
                .filter(|t| t.view != src.view && loops_match(vb, src, *t, tol.fold)),
        );

        if let Some(cone) = detect_cone(drawing, vb, &group, tol) {
            let key = BTreeSet::from([cone.circle, cone.trapezoid]);
            if seen.contains(&key) {
                continue;
            }
            seen.insert(key);
            seen.insert(BTreeSet::from([cone.inner, cone.trapezoid]));
            if !group.contains(&cone.inner) {
                group.push(cone.inner);
            }
            seen.insert(group.iter().copied().collect());
            debug!(loops = group.len(), "cone formation");
            formations.push(LoopFormation::new(group, FormationClass::Cone(cone.geometry)));
            continue;
        }

        if group.len() < limits.min_loops {
            continue;
        }
        let any_disjoint = group
            .iter()
            .any(|r| vb.get_loop(*r).is_some_and(|l| l.disjoint));
        if !any_disjoint
            && group.len() < limits.sparse_min_loops
            && vb.views.len() > limits.sparse_view_threshold
        {
            continue;
        }
        let views: BTreeSet<_> = group.iter().map(|r| r.view).collect();
        if views.len() != group.len() {
            continue;
        }
        if !seen.insert(group.iter().copied().collect()) {
            continue;
        }
        let class = sphere_class(drawing, vb, &group, tol).unwrap_or(FormationClass::Normal);
        formations.push(LoopFormation::new(group, class));
    }

    let outers: Vec<LoopRef> = vb
        .views
        .iter()
        .filter_map(|v| v.outer_loop.map(|id| LoopRef { view: v.id, id }))
        .collect();
    let outer_set: BTreeSet<LoopRef> = outers.iter().copied().collect();
    if !outers.is_empty() && !seen.contains(&outer_set) {
        debug!("adding outer bound formation");
        formations.push(LoopFormation::new(outers, FormationClass::Normal));
    }

    for f in formations.iter_mut() {
        f.kind = classify_formation(drawing, vb, f, tol);
    }
    info!(formations = formations.len(), "formations constructed");
    let count = formations.len();
    vb.formations = formations;
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loop_trace::construct_loops;
    use crate::loops::LoopId;
    use crate::preprocess::preprocess;
    use crate::view::ViewId;
    use crate::view_construct::construct_views;
    use ortho_types::{CurveSpec, DrawingSpec, EdgeRole};
    use std::f64::consts::TAU;

    fn rect(spec: &mut DrawingSpec, x0: f64, y0: f64, x1: f64, y1: f64) {
        let c = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]];
        for i in 0..4 {
            spec.push_edge(CurveSpec::line(c[i], c[(i + 1) % 4]), EdgeRole::Normal);
        }
    }

    fn loops_of(spec: &DrawingSpec) -> (Drawing, Vec<View>) {
        let tol = Tolerance::default();
        let mut d = Drawing::from_spec(spec);
        preprocess(&mut d, &tol);
        let mut views = construct_views(&mut d, &tol);
        construct_loops(&mut d, &mut views, &tol).unwrap();
        (d, views)
    }

    #[test]
    fn circle_and_trapezoid_predicates() {
        let mut spec = DrawingSpec::new();
        spec.push_edge(CurveSpec::line([-2.0, 0.0], [2.0, 0.0]), EdgeRole::Normal)
            .push_edge(CurveSpec::line([2.0, 0.0], [1.0, 3.0]), EdgeRole::Normal)
            .push_edge(CurveSpec::line([1.0, 3.0], [-1.0, 3.0]), EdgeRole::Normal)
            .push_edge(CurveSpec::line([-1.0, 3.0], [-2.0, 0.0]), EdgeRole::Normal)
            .push_edge(CurveSpec::circular_arc([20.0, 0.0], 2.0, 0.0, TAU), EdgeRole::Normal);
        let (d, views) = loops_of(&spec);
        let tol = Tolerance::default();
        let trapezoid = views[0].outer().unwrap();
        let circle = views[1].outer().unwrap();
        assert!(trapezoid_sides(&d, trapezoid, &tol).is_some());
        assert!(circle_of(&d, trapezoid, tol.coincidence).is_none());
        let (c, r) = circle_of(&d, circle, tol.coincidence).unwrap();
        assert_eq!(c, Point2::new(20.0, 0.0));
        assert_eq!(r, 2.0);
        assert!(trapezoid_sides(&d, circle, &tol).is_none());
    }

    #[test]
    fn hatched_section_loop_is_protrusion() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 4.0, 4.0);
        spec.push_hatch(vec![
            CurveSpec::line([0.0, 0.0], [4.0, 0.0]),
            CurveSpec::line([4.0, 0.0], [4.0, 4.0]),
            CurveSpec::line([4.0, 4.0], [0.0, 4.0]),
            CurveSpec::line([0.0, 4.0], [0.0, 0.0]),
        ]);
        let (d, views) = loops_of(&spec);
        let outer = views[0].outer_loop.unwrap();
        assert!(views[0].loops[outer].hatched);
        let vb = ViewBox::new(views, crate::view::ViewId(0));
        let f = LoopFormation::new(
            vec![LoopRef {
                view: crate::view::ViewId(0),
                id: outer,
            }],
            FormationClass::Normal,
        );
        assert_eq!(
            classify_formation(&d, &vb, &f, &Tolerance::default()),
            FormationKind::Protrusion
        );
    }

    fn strip(view: &View, x0: f64, x1: f64) -> LoopId {
        view.loops
            .iter()
            .find(|(_, l)| {
                l.fundamental
                    && (l.bounds().min.x - x0).abs() < 1e-9
                    && (l.bounds().max.x - x1).abs() < 1e-9
            })
            .map(|(id, _)| id)
            .unwrap()
    }

    fn classify_alone(d: &Drawing, views: Vec<View>, id: LoopId) -> FormationKind {
        let vb = ViewBox::new(views, ViewId(0));
        let f = LoopFormation::new(vec![LoopRef { view: ViewId(0), id }], FormationClass::Normal);
        classify_formation(d, &vb, &f, &Tolerance::default())
    }

    #[test]
    fn unhatched_strip_beside_a_hatch_is_depression() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 8.0);
        spec.push_edge(CurveSpec::line([4.0, 0.0], [4.0, 8.0]), EdgeRole::Normal)
            .push_hatch(vec![
                CurveSpec::line([0.0, 0.0], [4.0, 0.0]),
                CurveSpec::line([4.0, 0.0], [4.0, 8.0]),
                CurveSpec::line([4.0, 8.0], [0.0, 8.0]),
                CurveSpec::line([0.0, 8.0], [0.0, 0.0]),
            ]);
        let (d, views) = loops_of(&spec);
        assert!(views[0].is_sectional());
        let left = strip(&views[0], 0.0, 4.0);
        let right = strip(&views[0], 4.0, 10.0);
        assert!(views[0].loops[left].hatched);
        assert!(!views[0].loops[right].hatched);
        assert_eq!(classify_alone(&d, views.clone(), left), FormationKind::Protrusion);
        assert_eq!(classify_alone(&d, views, right), FormationKind::Depression);
    }

    #[test]
    fn inner_loop_is_protrusion_only_when_it_merges_with_the_outline() {
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
        spec.push_edge(CurveSpec::line([4.0, 0.0], [4.0, 5.0]), EdgeRole::Normal);
        let (d, views) = loops_of(&spec);
        let left = strip(&views[0], 0.0, 4.0);
        assert_eq!(classify_alone(&d, views, left), FormationKind::Protrusion);

        // The rest of the outline falls apart into two pieces.
        let mut spec = DrawingSpec::new();
        rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
        spec.push_edge(CurveSpec::line([4.0, 0.0], [4.0, 5.0]), EdgeRole::Normal)
            .push_edge(CurveSpec::line([6.0, 0.0], [6.0, 5.0]), EdgeRole::Normal);
        let (d, views) = loops_of(&spec);
        let middle = strip(&views[0], 4.0, 6.0);
        assert_eq!(classify_alone(&d, views, middle), FormationKind::Depression);
    }
}
