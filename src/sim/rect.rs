//! Axis-aligned rectangle geometry for entity bounds
//!
//! A rectangle is defined by its top-left corner and size. Edges are
//! half-open for intersection: rectangles that only touch do not overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// The four corners: top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [
            self.min,
            Vec2::new(max.x, self.min.y),
            Vec2::new(self.min.x, max.y),
            max,
        ]
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && other.min.x < a_max.x
            && self.min.y < b_max.y
            && other.min.y < a_max.y
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let min = self.min.min(other.min);
        let max = self.max().max(other.max());
        Rect::new(min, max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlap() {
        let a = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
        let b = Rect::from_xywh(4.0, 4.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_intersects_disjoint() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_xywh(50.0, 50.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_xywh(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_corners_order() {
        let r = Rect::from_xywh(1.0, 2.0, 3.0, 4.0);
        let [tl, tr, bl, br] = r.corners();
        assert_eq!(tl, Vec2::new(1.0, 2.0));
        assert_eq!(tr, Vec2::new(4.0, 2.0));
        assert_eq!(bl, Vec2::new(1.0, 6.0));
        assert_eq!(br, Vec2::new(4.0, 6.0));
    }

    #[test]
    fn test_union_covers_both() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Rect::from_xywh(4.0, -2.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u.min, Vec2::new(0.0, -2.0));
        assert_eq!(u.max(), Vec2::new(14.0, 10.0));
        assert_eq!(u.center(), Vec2::new(7.0, 4.0));
    }
}
