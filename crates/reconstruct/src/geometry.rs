//! Planar and spatial value types: boxes, affine transforms and line predicates.

use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Axis-aligned 2D box. The empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Default for Rect2 {
    fn default() -> Self {
        Self::empty()
    }
}

impl Rect2 {
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Self {
        let mut r = Self::empty();
        for p in points {
            r.extend_point(p);
        }
        r
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn extend_point(&mut self, p: &Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn extend(&mut self, other: &Rect2) {
        if !other.is_empty() {
            self.extend_point(&other.min);
            self.extend_point(&other.max);
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Corners `c00 c10 c11 c01`, indexed by (x side, y side).
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    pub fn contains_point(&self, p: &Point2<f64>, eps: f64) -> bool {
        p.x >= self.min.x - eps
            && p.x <= self.max.x + eps
            && p.y >= self.min.y - eps
            && p.y <= self.max.y + eps
    }

    pub fn contains_segment(&self, a: &Point2<f64>, b: &Point2<f64>, eps: f64) -> bool {
        self.contains_point(a, eps) && self.contains_point(b, eps)
    }

    pub fn intersects(&self, other: &Rect2, eps: f64) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x + eps
            && self.max.x >= other.min.x - eps
            && self.min.y <= other.max.y + eps
            && self.max.y >= other.min.y - eps
    }

    /// Whether the closed segment `a..b` touches the box (Liang-Barsky clip).
    pub fn intersects_segment(&self, a: &Point2<f64>, b: &Point2<f64>) -> bool {
        if self.is_empty() {
            return false;
        }
        let d = b - a;
        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        for k in 0..2 {
            if d[k].abs() < 1e-15 {
                if a[k] < self.min[k] || a[k] > self.max[k] {
                    return false;
                }
                continue;
            }
            let mut ta = (self.min[k] - a[k]) / d[k];
            let mut tb = (self.max[k] - a[k]) / d[k];
            if ta > tb {
                std::mem::swap(&mut ta, &mut tb);
            }
            t0 = t0.max(ta);
            t1 = t1.min(tb);
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

/// Axis-aligned 3D box. The empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Default for Rect3 {
    fn default() -> Self {
        Self::empty()
    }
}

impl Rect3 {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|k| self.min[k] > self.max[k])
    }

    pub fn extend_point(&mut self, p: &Point3<f64>) {
        for k in 0..3 {
            self.min[k] = self.min[k].min(p[k]);
            self.max[k] = self.max[k].max(p[k]);
        }
    }

    pub fn extend(&mut self, other: &Rect3) {
        if !other.is_empty() {
            self.extend_point(&other.min);
            self.extend_point(&other.max);
        }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// Affine map of 3D space stored as a homogeneous 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    matrix: Matrix4<f64>,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from the top three rows; the last row is `0 0 0 1`.
    pub fn from_rows(rows: [[f64; 4]; 3]) -> Self {
        let mut matrix = Matrix4::identity();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                matrix[(r, c)] = *value;
            }
        }
        Self { matrix }
    }

    pub fn translation(v: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&v),
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &Affine) -> Affine {
        Affine {
            matrix: self.matrix * other.matrix,
        }
    }

    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let h = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(h.x, h.y, h.z)
    }

    /// Map a sheet point (z = 0) into space.
    pub fn transform_point2(&self, p: &Point2<f64>) -> Point3<f64> {
        self.transform_point(&Point3::new(p.x, p.y, 0.0))
    }

    /// Apply the linear part only.
    pub fn transform_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let h = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vector3::new(h.x, h.y, h.z)
    }

    pub fn transform_vector2(&self, v: &Vector2<f64>) -> Vector3<f64> {
        self.transform_vector(&Vector3::new(v.x, v.y, 0.0))
    }

    /// The 3D box covering a transformed sheet box.
    pub fn transform_rect2(&self, rect: &Rect2) -> Rect3 {
        let mut out = Rect3::empty();
        if rect.is_empty() {
            return out;
        }
        for corner in rect.corners() {
            out.extend_point(&self.transform_point2(&corner));
        }
        out
    }
}

/// Distance from `p` to the infinite line through `a` with direction `dir`.
pub fn distance_to_line(p: &Point2<f64>, a: &Point2<f64>, dir: &Vector2<f64>) -> f64 {
    let len = dir.norm();
    if len < 1e-15 {
        return (p - a).norm();
    }
    (p - a).perp(dir).abs() / len
}

pub fn are_parallel(a: &Vector2<f64>, b: &Vector2<f64>, eps: f64) -> bool {
    let (la, lb) = (a.norm(), b.norm());
    if la < 1e-15 || lb < 1e-15 {
        return false;
    }
    (a.perp(b) / (la * lb)).abs() < eps
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rect_extend_and_measure() {
        let r = Rect2::from_points(&[Point2::new(0.0, 1.0), Point2::new(3.0, -1.0)]);
        assert_eq!(r.width(), 3.0);
        assert_eq!(r.height(), 2.0);
        assert_eq!(r.center(), Point2::new(1.5, 0.0));
        assert!(Rect2::empty().is_empty());
    }

    #[test]
    fn segment_box_intersection() {
        let r = Rect2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(r.intersects_segment(&Point2::new(-1.0, 0.5), &Point2::new(2.0, 0.5)));
        assert!(!r.intersects_segment(&Point2::new(-1.0, 2.0), &Point2::new(2.0, 2.0)));
        assert!(!r.intersects_segment(&Point2::new(-2.0, 0.0), &Point2::new(0.0, 3.0)));
        assert!(r.intersects_segment(&Point2::new(0.5, 0.5), &Point2::new(0.6, 0.6)));
    }

    #[test]
    fn affine_rows_and_compose() {
        let rot = Affine::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ]);
        let t = rot.compose(&Affine::translation(Vector3::new(-2.0, -3.0, 0.0)));
        let p = t.transform_point2(&Point2::new(5.0, 7.0));
        assert_relative_eq!(p, Point3::new(3.0, 0.0, 4.0));
        let n = t.transform_vector(&Vector3::z());
        assert_relative_eq!(n, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn line_distance_and_parallel() {
        let d = distance_to_line(
            &Point2::new(1.0, 2.0),
            &Point2::new(0.0, 0.0),
            &Vector2::new(3.0, 0.0),
        );
        assert_relative_eq!(d, 2.0);
        assert!(are_parallel(&Vector2::new(1.0, 1.0), &Vector2::new(-2.0, -2.0), 1e-9));
        assert!(!are_parallel(&Vector2::new(1.0, 0.0), &Vector2::new(0.0, 1.0), 1e-9));
    }
}
