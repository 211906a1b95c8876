//! Axis-aligned boxes and the reading-order sort shared by every stage.
//!
//! All coordinates use a top-left origin. Boxes are usually normalized to the
//! unit square of the page, but nothing here depends on that.

/// Axis-aligned rectangle stored as origin plus size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[must_use]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from corner coordinates
    #[must_use]
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    #[must_use]
    #[inline]
    pub fn endx(&self) -> f32 {
        self.x + self.w
    }

    #[must_use]
    #[inline]
    pub fn endy(&self) -> f32 {
        self.y + self.h
    }

    #[must_use]
    #[inline]
    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    /// Area shared with `other` (zero when disjoint)
    #[must_use]
    #[inline]
    pub fn intersection(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.endx().min(other.endx());
        let y2 = self.endy().min(other.endy());

        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Intersection over Union
    #[must_use]
    #[inline]
    pub fn iou(&self, other: &Rect) -> f32 {
        let intersection = self.intersection(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Intersection divided by the smaller box's area
    #[must_use]
    #[inline]
    pub fn containment(&self, other: &Rect) -> f32 {
        let smaller = self.area().min(other.area());

        if smaller > 0.0 {
            self.intersection(other) / smaller
        } else {
            0.0
        }
    }

    /// Smallest rectangle covering both boxes
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.endx().max(other.endx()),
            self.endy().max(other.endy()),
        )
    }

    /// Clip to the unit square
    #[must_use]
    pub fn clamp_unit(&self) -> Rect {
        let x1 = self.x.clamp(0.0, 1.0);
        let y1 = self.y.clamp(0.0, 1.0);
        let x2 = self.endx().clamp(0.0, 1.0);
        let y2 = self.endy().clamp(0.0, 1.0);

        Rect::from_corners(x1, y1, x2.max(x1), y2.max(y1))
    }

    /// Divide every coordinate by the page size
    #[must_use]
    pub fn normalize(&self, width: f32, height: f32) -> Rect {
        Rect::new(self.x / width, self.y / height, self.w / width, self.h / height)
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Rect, epsilon: f32) -> bool {
        approx_eq(self.x, other.x, epsilon)
            && approx_eq(self.y, other.y, epsilon)
            && approx_eq(self.w, other.w, epsilon)
            && approx_eq(self.h, other.h, epsilon)
    }
}

/// Anything with a bounding box
pub trait Bounded {
    fn rect(&self) -> Rect;
}

impl Bounded for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

/// Sort items top-to-bottom, then left-to-right.
///
/// Items are ordered by bottom edge, then grouped into rows: an item joins the
/// current row while its bottom edge is within `tolerance` of the row's first
/// item. Each row is then ordered by `x`. Grouping against the first item of
/// a row keeps the sort a total order, so it is stable on repeated runs.
pub fn sort_reading_order<T: Bounded>(items: &mut Vec<T>, tolerance: f32) {
    if items.len() < 2 {
        return;
    }

    items.sort_by(|a, b| {
        let (a, b) = (a.rect(), b.rect());
        a.endy().total_cmp(&b.endy()).then(a.x.total_cmp(&b.x))
    });

    let mut rows: Vec<Vec<T>> = Vec::new();
    let mut row_endy = f32::NEG_INFINITY;

    for item in items.drain(..) {
        let endy = item.rect().endy();
        match rows.last_mut() {
            Some(row) if (endy - row_endy).abs() < tolerance => row.push(item),
            _ => {
                row_endy = endy;
                rows.push(vec![item]);
            }
        }
    }

    for mut row in rows {
        row.sort_by(|a, b| a.rect().x.total_cmp(&b.rect().x));
        items.extend(row);
    }
}

#[inline]
fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}
