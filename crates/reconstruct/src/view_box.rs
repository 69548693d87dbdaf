//! The folded assembly of all views.

use std::collections::BTreeMap;

use ortho_types::ProjectionPlane;

use crate::formation::{LoopFormation, LoopRef};
use crate::geometry::Rect3;
use crate::loops::Loop;
use crate::view::{View, ViewId};

#[derive(Debug, Clone)]
pub struct ViewBox {
    pub views: Vec<View>,
    pub root: ViewId,
    pub formations: Vec<LoopFormation>,
    /// Union of the folded view boxes.
    pub bounds: Rect3,
}

impl ViewBox {
    /// Wrap folded views and compute the overall 3D box.
    pub fn new(views: Vec<View>, root: ViewId) -> Self {
        let mut bounds = Rect3::empty();
        for v in &views {
            bounds.extend(&v.transform.transform_rect2(&v.bounds));
        }
        Self {
            views,
            root,
            formations: Vec::new(),
            bounds,
        }
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id.0)
    }

    pub fn get_loop(&self, r: LoopRef) -> Option<&Loop> {
        self.view(r.view)?.loops.get(r.id)
    }

    /// Views grouped by projection plane, in view order.
    pub fn by_plane(&self) -> BTreeMap<ProjectionPlane, Vec<ViewId>> {
        let mut map: BTreeMap<ProjectionPlane, Vec<ViewId>> = BTreeMap::new();
        for v in &self.views {
            if let Some(p) = v.plane {
                map.entry(p).or_default().push(v.id);
            }
        }
        map
    }

    /// Every loop of every view, in view then loop order.
    pub fn loop_refs(&self) -> Vec<LoopRef> {
        self.views
            .iter()
            .flat_map(|v| v.loops.keys().map(move |id| LoopRef { view: v.id, id }))
            .collect()
    }

    pub fn is_outer(&self, r: LoopRef) -> bool {
        self.view(r.view).is_some_and(|v| v.outer_loop == Some(r.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Affine, Rect2};
    use nalgebra::{Point2, Point3, Vector3};

    #[test]
    fn bounds_cover_folded_views() {
        let mut front = View::new(ViewId(0));
        front.bounds = Rect2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 5.0));
        front.transform = Affine::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ]);
        front.plane = Some(ProjectionPlane::Front);
        let mut top = View::new(ViewId(1));
        top.bounds = Rect2::new(Point2::new(0.0, -20.0), Point2::new(10.0, -12.0));
        top.transform = Affine::translation(Vector3::new(0.0, 20.0, 5.0));
        top.plane = Some(ProjectionPlane::Top);
        let vb = ViewBox::new(vec![front, top], ViewId(0));
        assert_eq!(vb.bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(vb.bounds.max, Point3::new(10.0, 8.0, 5.0));
        assert_eq!(vb.by_plane()[&ProjectionPlane::Top], vec![ViewId(1)]);
        assert!(vb.loop_refs().is_empty());
    }
}
