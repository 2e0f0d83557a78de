use crate::foundation::core::{Affine, Point, Rect, Vec2};

/// Axis-aligned bounding box in PostScript big points with an explicit empty state.
///
/// Coordinates are only meaningful when `empty` is false. Merging a non-empty box into an empty
/// one adopts the other box; once non-empty a box never becomes empty again through merging.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    pub empty: bool,
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BBox {
    pub const EMPTY: Self = Self {
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
        top: 0.0,
        empty: true,
    };

    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left: left.min(right),
            bottom: bottom.min(top),
            right: left.max(right),
            top: bottom.max(top),
            empty: false,
        }
    }

    pub fn from_point(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    pub fn from_rect(r: Rect) -> Self {
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }

    /// `None` for an empty box.
    pub fn to_rect(&self) -> Option<Rect> {
        (!self.empty).then(|| Rect::new(self.left, self.bottom, self.right, self.top))
    }

    pub fn width(&self) -> f64 {
        if self.empty { 0.0 } else { self.right - self.left }
    }

    pub fn height(&self) -> f64 {
        if self.empty { 0.0 } else { self.top - self.bottom }
    }

    pub fn add_point(&mut self, p: Point) {
        self.merge(&Self::from_point(p));
    }

    pub fn merge(&mut self, other: &BBox) {
        if other.empty {
            return;
        }
        if self.empty {
            *self = *other;
            return;
        }
        self.left = self.left.min(other.left);
        self.bottom = self.bottom.min(other.bottom);
        self.right = self.right.max(other.right);
        self.top = self.top.max(other.top);
    }

    /// Overlap of two boxes; empty when either is empty or they do not meet.
    pub fn intersect(&self, other: &BBox) -> BBox {
        if self.empty || other.empty {
            return Self::EMPTY;
        }
        let left = self.left.max(other.left);
        let bottom = self.bottom.max(other.bottom);
        let right = self.right.min(other.right);
        let top = self.top.min(other.top);
        if left > right || bottom > top {
            return Self::EMPTY;
        }
        Self::new(left, bottom, right, top)
    }

    /// Translate in place. Empty boxes stay empty.
    pub fn shift(&mut self, by: Vec2) {
        if self.empty {
            return;
        }
        self.left += by.x;
        self.right += by.x;
        self.bottom += by.y;
        self.top += by.y;
    }

    pub fn shifted(mut self, by: Vec2) -> BBox {
        self.shift(by);
        self
    }

    /// Box of the transformed corners.
    pub fn transformed(&self, t: Affine) -> BBox {
        match self.to_rect() {
            Some(r) => Self::from_rect(t.transform_rect_bbox(r)),
            None => Self::EMPTY,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/bbox.rs"]
mod tests;
