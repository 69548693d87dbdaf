//! Splitting planar faces into convex pieces for the BSP tree.

use nalgebra::{Point2, Point3, Vector3};

const AREA_EPS: f64 = 1e-12;

/// Project a planar face onto the coordinate plane most perpendicular to
/// `normal`, keeping the face's winding.
pub fn project(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let axis = normal.iamax();
    let (u, v) = match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };
    let flip = normal[axis] < 0.0;
    points
        .iter()
        .map(|p| {
            if flip {
                Point2::new(p[v], p[u])
            } else {
                Point2::new(p[u], p[v])
            }
        })
        .collect()
}

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}

/// Counter-clockwise polygon with no reflex corner. Collinear corners are allowed.
pub fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    (0..n).all(|i| cross(&points[i], &points[(i + 1) % n], &points[(i + 2) % n]) >= -AREA_EPS)
}

/// Inside or on the boundary of the counter-clockwise triangle `abc`.
/// Points at a corner of the triangle do not count.
fn blocks_ear(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    if [a, b, c].iter().any(|q| (p - *q).norm_squared() <= AREA_EPS) {
        return false;
    }
    cross(a, b, p) >= -AREA_EPS && cross(b, c, p) >= -AREA_EPS && cross(c, a, p) >= -AREA_EPS
}

/// Ear-clip a simple counter-clockwise polygon into triangles that keep its
/// winding. Every emitted triangle has positive area; collinear corners are
/// dropped without a triangle.
pub fn ear_clip(points: &[Point2<f64>]) -> Vec<[usize; 3]> {
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));

    while remaining.len() >= 3 {
        let n = remaining.len();
        let corner = |i: usize| {
            (
                remaining[(i + n - 1) % n],
                remaining[i],
                remaining[(i + 1) % n],
            )
        };
        let turn = |i: usize| {
            let (a, b, c) = corner(i);
            cross(&points[a], &points[b], &points[c])
        };
        let ear = (0..n).find(|&i| {
            let (a, b, c) = corner(i);
            turn(i) > AREA_EPS
                && remaining
                    .iter()
                    .filter(|&&k| k != a && k != b && k != c)
                    .all(|&k| !blocks_ear(&points[k], &points[a], &points[b], &points[c]))
        });
        if let Some(i) = ear {
            let (a, b, c) = corner(i);
            triangles.push([a, b, c]);
            remaining.remove(i);
            continue;
        }
        // No clean ear: shed a flat corner first, else clip any convex one.
        if let Some(i) = (0..n).find(|&i| turn(i).abs() <= AREA_EPS) {
            remaining.remove(i);
        } else if let Some(i) = (0..n).find(|&i| turn(i) > AREA_EPS) {
            let (a, b, c) = corner(i);
            triangles.push([a, b, c]);
            remaining.remove(i);
        } else {
            break;
        }
    }
    triangles
}

/// Split a planar 3D face into convex index lists (into `points`).
pub fn convex_pieces(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Vec<usize>> {
    let projected = project(points, normal);
    if is_convex(&projected) {
        return vec![(0..points.len()).collect()];
    }
    ear_clip(&projected).into_iter().map(|t| t.to_vec()).collect()
}
