use std::collections::HashMap;

use nalgebra::Point3;
use tracing::{debug, instrument};

use crate::bsp::{self, Polygon};
use crate::traits::SolidKernel;
use crate::triangulate::convex_pieces;
use crate::types::{newell_normal, BooleanOp, KernelError, Polyhedron};

/// Solid kernel evaluating booleans on BSP trees of convex polygons.
#[derive(Debug, Clone)]
pub struct BspKernel {
    /// Vertices closer than this are welded by `canonicalize`.
    pub weld_tolerance: f64,
}

impl Default for BspKernel {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-7,
        }
    }
}

impl BspKernel {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_polygons(&self, solid: &Polyhedron) -> Result<Vec<Polygon>, KernelError> {
        solid.validate()?;
        let mut polygons = Vec::with_capacity(solid.faces.len());
        for face in 0..solid.faces.len() {
            let points = solid.face_points(face);
            let normal = newell_normal(&points);
            if normal.norm() < 1e-12 {
                continue;
            }
            for piece in convex_pieces(&points, &normal) {
                let piece_points = piece.iter().map(|&i| points[i]).collect();
                if let Some(polygon) = Polygon::new(piece_points) {
                    polygons.push(polygon);
                }
            }
        }
        Ok(polygons)
    }

    fn from_polygons(&self, polygons: Vec<Polygon>) -> Result<Polyhedron, KernelError> {
        let mut vertices = Vec::new();
        let mut faces = Vec::with_capacity(polygons.len());
        for polygon in polygons {
            let start = vertices.len();
            faces.push((start..start + polygon.vertices.len()).collect());
            vertices.extend(polygon.vertices);
        }
        let raw = Polyhedron::new(vertices, faces);
        raw.validate()?;
        Ok(weld(&raw, self.weld_tolerance))
    }

    #[instrument(skip(self, a, b), fields(a_faces = a.faces.len(), b_faces = b.faces.len()))]
    fn boolean(
        &self,
        op: BooleanOp,
        a: &Polyhedron,
        b: &Polyhedron,
    ) -> Result<Polyhedron, KernelError> {
        let pa = self.to_polygons(a)?;
        let pb = self.to_polygons(b)?;
        let out = match op {
            BooleanOp::Union => bsp::union(pa, pb),
            BooleanOp::Subtract => bsp::subtract(pa, pb),
            BooleanOp::Intersect => bsp::intersect(pa, pb),
        };
        let result = self.from_polygons(out)?;
        debug!(?op, faces = result.faces.len(), "boolean evaluated");
        Ok(result)
    }
}

impl SolidKernel for BspKernel {
    fn intersect(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError> {
        self.boolean(BooleanOp::Intersect, a, b)
    }

    fn union(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError> {
        if a.is_empty() {
            return Ok(b.clone());
        }
        if b.is_empty() {
            return Ok(a.clone());
        }
        self.boolean(BooleanOp::Union, a, b)
    }

    fn subtract(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError> {
        if a.is_empty() || b.is_empty() {
            return Ok(a.clone());
        }
        self.boolean(BooleanOp::Subtract, a, b)
    }

    fn canonicalize(&mut self, solid: &Polyhedron) -> Result<Polyhedron, KernelError> {
        solid.validate()?;
        Ok(weld(solid, self.weld_tolerance))
    }

    fn build_from_faces(
        &mut self,
        vertices: Vec<Point3<f64>>,
        faces: Vec<Vec<usize>>,
    ) -> Result<Polyhedron, KernelError> {
        let solid = Polyhedron::new(vertices, faces);
        solid.validate()?;
        Ok(solid.oriented_outward())
    }
}

type Cell = (i64, i64, i64);

/// Spatial hash used to weld vertices within a tolerance.
struct Welder {
    tolerance: f64,
    cell_size: f64,
    cells: HashMap<Cell, Vec<usize>>,
    points: Vec<Point3<f64>>,
}

impl Welder {
    fn new(tolerance: f64) -> Self {
        let tolerance = tolerance.max(1e-12);
        Self {
            tolerance,
            cell_size: tolerance * 4.0,
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }

    fn insert(&mut self, p: Point3<f64>) -> usize {
        let (cx, cy, cz) = self.cell(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        if let Some(&i) = bucket
                            .iter()
                            .find(|&&i| (self.points[i] - p).norm() <= self.tolerance)
                        {
                            return i;
                        }
                    }
                }
            }
        }
        let index = self.points.len();
        self.points.push(p);
        self.cells.entry((cx, cy, cz)).or_default().push(index);
        index
    }
}

/// Weld vertices, collapse repeated corners and drop faces left with no area.
/// Only vertices referenced by a surviving face are kept.
pub fn weld(solid: &Polyhedron, tolerance: f64) -> Polyhedron {
    let mut welder = Welder::new(tolerance);
    let mut faces = Vec::with_capacity(solid.faces.len());
    for face in &solid.faces {
        let mut indices: Vec<usize> = Vec::with_capacity(face.len());
        for &i in face {
            let w = welder.insert(solid.vertices[i]);
            if indices.last() != Some(&w) {
                indices.push(w);
            }
        }
        while indices.len() > 1 && indices.first() == indices.last() {
            indices.pop();
        }
        if indices.len() < 3 {
            continue;
        }
        let points: Vec<_> = indices.iter().map(|&i| welder.points[i]).collect();
        if newell_normal(&points).norm() < 1e-12 {
            continue;
        }
        faces.push(indices);
    }

    let mut used = vec![None; welder.points.len()];
    let mut vertices = Vec::new();
    for face in &mut faces {
        for i in face.iter_mut() {
            let slot = *used[*i].get_or_insert_with(|| {
                vertices.push(welder.points[*i]);
                vertices.len() - 1
            });
            *i = slot;
        }
    }
    Polyhedron::new(vertices, faces)
}
