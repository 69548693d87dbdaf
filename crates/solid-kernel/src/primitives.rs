//! Closed primitive solids. Every generator returns an outward-oriented polyhedron.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::types::Polyhedron;

/// Axis-aligned box spanning `min..max`.
pub fn make_box(min: Point3<f64>, max: Point3<f64>) -> Polyhedron {
    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, max.y, max.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(max.x, max.y, max.z),
    ];
    let faces = vec![
        vec![0, 1, 3, 2],
        vec![7, 5, 4, 6],
        vec![0, 2, 6, 4],
        vec![2, 3, 7, 6],
        vec![3, 1, 5, 7],
        vec![1, 0, 4, 5],
    ];
    Polyhedron::new(vertices, faces).oriented_outward()
}

fn sphere_point(center: &Point3<f64>, radius: f64, phi: f64, psi: f64) -> Point3<f64> {
    center + radius * Vector3::new(phi.cos() * psi.cos(), phi.sin() * psi.cos(), psi.sin())
}

/// UV sphere with `stacks` latitude bands and `slices` longitude segments.
pub fn make_sphere(center: Point3<f64>, radius: f64, stacks: usize, slices: usize) -> Polyhedron {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut vertices = Vec::with_capacity((stacks - 1) * slices + 2);
    for j in 0..stacks - 1 {
        let psi = (j + 1) as f64 * PI / stacks as f64 - FRAC_PI_2;
        for i in 0..slices {
            let phi = i as f64 * 2.0 * PI / slices as f64;
            vertices.push(sphere_point(&center, radius, phi, psi));
        }
    }
    vertices.push(sphere_point(&center, radius, 0.0, -FRAC_PI_2));
    vertices.push(sphere_point(&center, radius, 0.0, FRAC_PI_2));

    let n = vertices.len() - 2;
    let mut faces = Vec::with_capacity(slices * stacks);
    for i in 0..slices {
        faces.push(vec![n, (i + 1) % slices, i]);
        faces.push(vec![n + 1, n - 1 - (i + 1) % slices, n - 1 - i]);
    }
    for j in 0..stacks - 2 {
        for i in 0..slices {
            let i1 = (i + 1) % slices;
            let j1 = j + 1;
            faces.push(vec![
                j * slices + i,
                j * slices + i1,
                j1 * slices + i1,
                j1 * slices + i,
            ]);
        }
    }
    debug!(radius, vertices = vertices.len(), "sphere generated");
    Polyhedron::new(vertices, faces).oriented_outward()
}

/// Elliptic frustum from `base` along `height`; each end is the ellipse
/// spanned by its two axis vectors.
pub fn make_cone(
    base: Point3<f64>,
    height: Vector3<f64>,
    base_x: Vector3<f64>,
    base_y: Vector3<f64>,
    top_x: Vector3<f64>,
    top_y: Vector3<f64>,
    slices: usize,
) -> Polyhedron {
    if base_x.cross(&base_y).dot(&height) < 0.0 {
        return make_cone(base + height, -height, top_x, top_y, base_x, base_y, slices);
    }
    let slices = slices.max(3);
    let mut vertices = Vec::with_capacity(slices * 2);
    for i in 0..slices {
        let a = i as f64 * 2.0 * PI / slices as f64;
        vertices.push(base + base_x * a.cos() + base_y * a.sin());
        vertices.push(base + height + top_x * a.cos() + top_y * a.sin());
    }
    let m = slices * 2;
    let mut faces: Vec<Vec<usize>> = (0..slices)
        .map(|i| vec![i * 2 + 1, i * 2, (i * 2 + 2) % m, (i * 2 + 3) % m])
        .collect();
    faces.push((0..slices).map(|i| 2 * (slices - 1) - i * 2).collect());
    faces.push((0..slices).map(|i| i * 2 + 1).collect());
    Polyhedron::new(vertices, faces).oriented_outward()
}
