//! Straight vector segments: underlines and table rulings

use crate::geometry::{Bounded, Rect};
use crate::native::RawRect;

/// Objects thicker than this in both directions are shapes, not lines
/// (page units, about one screen pixel at 72 dpi with antialiasing slack)
pub const LINE_MAX_THICKNESS: f32 = 2.0;

/// Width fraction above which a tall object is treated as a page border
pub const BORDER_WIDTH_RATIO: f32 = 0.7;

/// Height fraction above which a wide object is treated as a page border
pub const BORDER_HEIGHT_RATIO: f32 = 0.9;

/// Orientation of a line segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tilt {
    /// 0 degrees
    Horizontal,
    /// 90 degrees
    Vertical,
}

impl Tilt {
    #[must_use]
    pub fn degrees(self) -> u16 {
        match self {
            Tilt::Horizontal => 0,
            Tilt::Vertical => 90,
        }
    }
}

/// A thin horizontal or vertical segment, normalized to the page
#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub tilt: Tilt,
}

impl LineNode {
    #[must_use]
    pub fn new(x: f32, y: f32, w: f32, h: f32, tilt: Tilt) -> Self {
        Self { x, y, w, h, tilt }
    }

    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.tilt == Tilt::Horizontal
    }

    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.tilt == Tilt::Vertical
    }
}

impl Bounded for LineNode {
    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Classify path bounds into line nodes.
pub(crate) fn build_line_nodes(paths: &[RawRect], page_width: f32, page_height: f32) -> Vec<LineNode> {
    if page_width <= 0.0 || page_height <= 0.0 {
        return Vec::new();
    }

    paths
        .iter()
        .filter_map(|path| {
            let width = (path.right - path.left).abs();
            let height = (path.top - path.bottom).abs();
            let thin = width.min(height);
            let long = width.max(height);

            if thin > LINE_MAX_THICKNESS || long <= thin {
                return None;
            }

            let rect = Rect::new(
                path.left.min(path.right),
                page_height - path.top.max(path.bottom),
                width,
                height,
            )
            .normalize(page_width, page_height);

            if rect.w > BORDER_WIDTH_RATIO && rect.h > BORDER_HEIGHT_RATIO {
                return None;
            }

            let tilt = if height <= width {
                Tilt::Horizontal
            } else {
                Tilt::Vertical
            };

            Some(LineNode::new(rect.x, rect.y, rect.w, rect.h, tilt))
        })
        .collect()
}
