//! Plane Folder: assigns every view a 3D pose by walking the relation tree.

use nalgebra::{Point2, Point3, SMatrix, SVector, Vector3};
use ortho_types::{ProjectionPlane, RelationAxis};
use tracing::{debug, info, instrument};

use crate::config::Tolerance;
use crate::drawing::Drawing;
use crate::error::ReconstructError;
use crate::geometry::Affine;
use crate::view::{View, ViewId};

/// Non-sectional view with the most neighbours; the first one wins ties.
pub fn select_root(views: &[View]) -> Option<ViewId> {
    let mut best: Option<(ViewId, usize)> = None;
    for v in views.iter().filter(|v| !v.is_sectional()) {
        if best.map_or(true, |(_, n)| v.adjacent.len() > n) {
            best = Some((v.id, v.adjacent.len()));
        }
    }
    best.map(|(id, _)| id)
}

/// Transform placing the root view in the Front plane with its box minimum
/// at the origin: drawing `(x, y)` goes to world `(x, 0, y)`.
pub fn root_transform(view: &View) -> Affine {
    let rotation = Affine::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, -1.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
    ]);
    let min = view.bounds.min;
    rotation.compose(&Affine::translation(Vector3::new(-min.x, -min.y, 0.0)))
}

/// Summed beliefs of the relations between two views, split by axis.
fn axis_weights(child: &View, parent: &View) -> (f64, f64) {
    let mut wx = 0.0;
    let mut wy = 0.0;
    let forward = child.relations.iter().filter(|r| r.target == parent.id);
    let backward = parent.relations.iter().filter(|r| r.target == child.id);
    for r in forward.chain(backward) {
        match r.axis {
            RelationAxis::X => wx += r.belief,
            RelationAxis::Y => wy += r.belief,
        }
    }
    (wx, wy)
}

/// Solve the 3x4 affine map taking each `source` point to its `target`.
fn solve_affine(pairs: &[(Point3<f64>, Point3<f64>); 4]) -> Option<Affine> {
    let mut a = SMatrix::<f64, 12, 12>::zeros();
    let mut b = SVector::<f64, 12>::zeros();
    for (k, (s, d)) in pairs.iter().enumerate() {
        for r in 0..3 {
            let row = 3 * k + r;
            for c in 0..3 {
                a[(row, 4 * r + c)] = s[c];
            }
            a[(row, 4 * r + 3)] = 1.0;
            b[row] = d[r];
        }
    }
    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut rows = [[0.0; 4]; 3];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = x[4 * r + c];
        }
    }
    Some(Affine::from_rows(rows))
}

/// Pose of `child` relative to an already folded `parent`.
pub fn fold_child(child: &View, parent: &View) -> Result<Affine, ReconstructError> {
    let (wx, wy) = axis_weights(child, parent);
    if (wx - wy).abs() <= 1e-6 {
        return Err(ReconstructError::AmbiguousFold {
            view: child.id,
            parent: parent.id,
            weight_x: wx,
            weight_y: wy,
        });
    }
    let axis = if wx > wy { RelationAxis::X } else { RelationAxis::Y };

    let c = child.bounds.corners();
    let p = parent.bounds.corners();
    let lift = |q: Point2<f64>| Point3::new(q.x, q.y, 0.0);
    let mapped = |i: usize| parent.transform.transform_point2(&p[i]);
    // corners() yields c00 c10 c11 c01
    let (c0, c1, p0, p1, dir) = match axis {
        RelationAxis::X if child.center().y > parent.center().y => {
            (c[3], c[2], mapped(0), mapped(1), Vector3::new(0.0, 1.0, 0.0))
        }
        RelationAxis::X => (c[0], c[1], mapped(3), mapped(2), Vector3::new(0.0, -1.0, 0.0)),
        RelationAxis::Y if child.center().x > parent.center().x => {
            (c[1], c[2], mapped(0), mapped(3), Vector3::new(1.0, 0.0, 0.0))
        }
        RelationAxis::Y => (c[0], c[3], mapped(1), mapped(2), Vector3::new(-1.0, 0.0, 0.0)),
    };
    let c0 = lift(c0);
    let normal = parent.transform.transform_vector(&Vector3::z());
    let pairs = [
        (c0, p0),
        (lift(c1), p1),
        (c0 + Vector3::z(), p0 - parent.transform.transform_vector(&dir)),
        (c0 + dir, p0 + normal),
    ];
    solve_affine(&pairs).ok_or(ReconstructError::SingularFold {
        view: child.id,
        parent: parent.id,
    })
}

/// Set vertex positions and loop boxes of a view from its transform.
pub fn apply_transform(drawing: &Drawing, view: &mut View) {
    let t = view.transform;
    for v in view.vertices.values_mut() {
        v.position3d = t.transform_point2(&v.position);
    }
    for l in view.loops.values_mut() {
        l.refresh_3d(drawing, &t);
    }
}

/// Fold every view into one world frame, depth first from the root.
#[instrument(skip_all, fields(views = views.len()))]
pub fn fold_planes(
    drawing: &Drawing,
    views: &mut [View],
    tol: &Tolerance,
) -> Result<ViewId, ReconstructError> {
    let root = select_root(views).ok_or(ReconstructError::NoRootView)?;
    let r = root.0;
    views[r].transform = root_transform(&views[r]);
    views[r].plane = Some(ProjectionPlane::Front);
    apply_transform(drawing, &mut views[r]);
    info!(root = r, "root view selected");

    let mut visited = vec![false; views.len()];
    visited[r] = true;
    let mut stack: Vec<(usize, usize)> = views[r]
        .adjacent
        .iter()
        .rev()
        .map(|c| (c.0, r))
        .collect();
    while let Some((child, parent)) = stack.pop() {
        if visited[child] {
            continue;
        }
        visited[child] = true;
        let transform = fold_child(&views[child], &views[parent])?;
        let normal = transform.transform_vector(&Vector3::z());
        let plane = ProjectionPlane::from_normal([normal.x, normal.y, normal.z], tol.plane)
            .ok_or(ReconstructError::UnalignedView {
                view: views[child].id,
            })?;
        views[child].transform = transform;
        views[child].plane = Some(plane);
        apply_transform(drawing, &mut views[child]);
        debug!(view = child, parent, ?plane, "view folded");
        for next in views[child].adjacent.iter().rev() {
            if !visited[next.0] {
                stack.push((next.0, child));
            }
        }
    }
    Ok(root)
}
