//! Guide frame geometry.
//!
//! The outer guide frame sits 5% inside the visible image on every side, the
//! inner frame 10%. Both analyzer strategies and the renderer share these
//! rectangles so what is drawn matches what is evaluated.

use glam::Vec2;

use crate::types::{BoundingBox, Side};

pub const OUTER_PADDING: f32 = 0.05;
pub const INNER_PADDING: f32 = 0.10;
/// Max center offset, in normalized units, still counted as centered.
pub const CENTER_THRESHOLD: f32 = 0.05;

/// Axis-aligned rectangle in normalized `[0, 1]` frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl NormRect {
    pub const FULL: NormRect = NormRect {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };

    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> NormRect {
        NormRect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle shrunk by `padding` on every side.
    pub fn padded(&self, padding: f32) -> NormRect {
        NormRect::new(
            self.left + padding,
            self.top + padding,
            self.right - padding,
            self.bottom - padding,
        )
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Whether `other` lies within this rectangle with a positive margin on
    /// every side.
    pub fn strictly_contains(&self, other: &NormRect) -> bool {
        other.left > self.left
            && other.top > self.top
            && other.right < self.right
            && other.bottom < self.bottom
    }

    pub fn contains_box(&self, b: &BoundingBox) -> bool {
        b.x1() >= self.left && b.y1() >= self.top && b.x2() <= self.right && b.y2() <= self.bottom
    }

    /// Sides on which `b` extends beyond this rectangle, in left, right, top,
    /// bottom order.
    pub fn protrusions(&self, b: &BoundingBox) -> Vec<Side> {
        let mut sides = Vec::with_capacity(4);
        if b.x1() < self.left {
            sides.push(Side::Left);
        }
        if b.x2() > self.right {
            sides.push(Side::Right);
        }
        if b.y1() < self.top {
            sides.push(Side::Top);
        }
        if b.y2() > self.bottom {
            sides.push(Side::Bottom);
        }
        sides
    }

    /// Maps this normalized rectangle into the pixel rectangle `display`.
    pub fn to_pixels(&self, display: &PixelRect) -> PixelRect {
        PixelRect {
            min: display.min + Vec2::new(self.left, self.top) * display.size,
            size: Vec2::new(self.width(), self.height()) * display.size,
        }
    }
}

impl From<&BoundingBox> for NormRect {
    fn from(b: &BoundingBox) -> Self {
        NormRect::new(b.x1(), b.y1(), b.x2(), b.y2())
    }
}

/// Outer and inner guide rectangles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideFrames {
    pub outer: NormRect,
    pub inner: NormRect,
}

impl Default for GuideFrames {
    fn default() -> Self {
        Self::standard()
    }
}

impl GuideFrames {
    pub fn standard() -> GuideFrames {
        Self::with_padding(OUTER_PADDING, INNER_PADDING)
    }

    pub fn with_padding(outer_padding: f32, inner_padding: f32) -> GuideFrames {
        GuideFrames {
            outer: NormRect::FULL.padded(outer_padding),
            inner: NormRect::FULL.padded(inner_padding),
        }
    }

    /// Both frames have area and the outer one strictly contains the inner.
    pub fn is_measurable(&self) -> bool {
        !self.outer.is_degenerate()
            && !self.inner.is_degenerate()
            && self.outer.strictly_contains(&self.inner)
    }

    pub fn center(&self) -> Vec2 {
        self.inner.center()
    }
}

/// Rectangle in pixel space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> PixelRect {
        PixelRect {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.min.cmpge(self.min).all() && other.max().cmple(self.max()).all()
    }
}

fn is_positive(v: Vec2) -> bool {
    v.is_finite() && v.x > 0.0 && v.y > 0.0
}

/// Rectangle occupied by a `source` sized image scaled uniformly to fit
/// inside `viewport` and centered.
pub fn letterbox(viewport: Vec2, source: Vec2) -> Option<PixelRect> {
    if !is_positive(viewport) || !is_positive(source) {
        return None;
    }
    let scale = (viewport.x / source.x).min(viewport.y / source.y);
    let size = source * scale;
    Some(PixelRect {
        min: (viewport - size) / 2.0,
        size,
    })
}

/// Outer guide rectangle in viewport pixels.
///
/// With `source` dimensions the padding is applied to the letterboxed image
/// rectangle, otherwise to the whole viewport. Degenerate inputs give `None`.
pub fn outer_guide_rect_px(viewport: Vec2, source: Option<Vec2>) -> Option<PixelRect> {
    let display = display_rect(viewport, source)?;
    Some(GuideFrames::standard().outer.to_pixels(&display))
}

/// Rectangle the camera image is drawn in.
pub fn display_rect(viewport: Vec2, source: Option<Vec2>) -> Option<PixelRect> {
    match source {
        Some(source) => letterbox(viewport, source),
        None if is_positive(viewport) => Some(PixelRect {
            min: Vec2::ZERO,
            size: viewport,
        }),
        None => None,
    }
}
