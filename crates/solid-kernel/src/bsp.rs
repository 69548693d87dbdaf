//! Binary space partitioning trees over convex polygons.
//!
//! Booleans follow the classic clip-and-rebuild scheme: each operand's
//! polygons are clipped against the other operand's tree, with inversions
//! turning the same clipping step into union, difference and intersection.
//! Coplanar polygons are kept on the side their normal points to, which is
//! what makes flush cuts (coincident faces) come out right.

use nalgebra::{Point3, Vector3};

use crate::types::newell_normal;

/// Distance below which a point is considered to lie on a plane.
pub const EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    /// Best-fit plane of a polygon. `None` for zero-area polygons.
    pub fn through(points: &[Point3<f64>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let n = newell_normal(points);
        let len = n.norm();
        if len < 1e-12 {
            return None;
        }
        let normal = n / len;
        let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / points.len() as f64;
        Some(Self {
            normal,
            w: normal.dot(&centroid),
        })
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }

    fn classify(&self, p: &Point3<f64>) -> u8 {
        let t = self.distance(p);
        if t < -EPSILON {
            BACK
        } else if t > EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Sort `polygon` into the four output lists, splitting it when it spans
    /// the plane. Coplanar polygons go front or back by normal direction.
    pub fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let types: Vec<u8> = polygon.vertices.iter().map(|v| self.classify(v)).collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon {
                        vertices: f,
                        plane: polygon.plane,
                    });
                }
                if b.len() >= 3 {
                    back.push(Polygon {
                        vertices: b,
                        plane: polygon.plane,
                    });
                }
            }
        }
    }
}

/// A convex planar polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    pub plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3<f64>>) -> Option<Self> {
        let plane = Plane::through(&vertices)?;
        Some(Self { vertices, plane })
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Swap solid and empty space.
    pub fn invert(&mut self) {
        for p in &mut self.polygons {
            p.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that are inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for p in &polygons {
            plane.split_polygon(p, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
        }
        front.append(&mut coplanar_front);
        back.append(&mut coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };
        front.extend(back);
        front
    }

    /// Remove every polygon of this tree that lies inside `other`.
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.polygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }

    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for p in &polygons {
            plane.split_polygon(p, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
        }
        self.polygons.append(&mut coplanar_front);
        self.polygons.append(&mut coplanar_back);
        if !front.is_empty() {
            self.front.get_or_insert_with(Default::default).build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Default::default).build(back);
        }
    }
}

pub fn union(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.all_polygons()
}

pub fn subtract(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

pub fn intersect(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64, up: bool) -> Polygon {
        let mut pts = vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(0.0, 1.0, z),
        ];
        if !up {
            pts.reverse();
        }
        Polygon::new(pts).unwrap()
    }

    #[test]
    fn plane_through_square() {
        let p = square(2.0, true);
        assert!((p.plane.normal.z - 1.0).abs() < 1e-12);
        assert!((p.plane.w - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_area_has_no_plane() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(Plane::through(&pts).is_none());
    }

    #[test]
    fn spanning_polygon_is_split() {
        let splitter = Plane {
            normal: Vector3::new(1.0, 0.0, 0.0),
            w: 0.5,
        };
        let (mut cf, mut cb, mut f, mut b) = (vec![], vec![], vec![], vec![]);
        splitter.split_polygon(&square(0.0, true), &mut cf, &mut cb, &mut f, &mut b);
        assert_eq!((f.len(), b.len()), (1, 1));
        assert_eq!(f[0].vertices.len(), 4);
        assert!(f[0].vertices.iter().all(|v| v.x >= 0.5 - 1e-12));
        assert!(b[0].vertices.iter().all(|v| v.x <= 0.5 + 1e-12));
    }

    #[test]
    fn coplanar_sorted_by_normal() {
        let splitter = square(0.0, true).plane;
        let (mut cf, mut cb, mut f, mut b) = (vec![], vec![], vec![], vec![]);
        splitter.split_polygon(&square(0.0, true), &mut cf, &mut cb, &mut f, &mut b);
        splitter.split_polygon(&square(0.0, false), &mut cf, &mut cb, &mut f, &mut b);
        assert_eq!((cf.len(), cb.len(), f.len(), b.len()), (1, 1, 0, 0));
    }

    #[test]
    fn invert_twice_restores_polygons() {
        let mut node = Node::new(vec![square(0.0, false), square(1.0, true)]);
        let before = node.all_polygons();
        node.invert();
        node.invert();
        assert_eq!(node.all_polygons(), before);
    }
}
