use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical role a rear lens plays in the zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensRole {
    UltraWide,
    Main,
}

/// Lens the capture pipeline is currently bound to, as far as the zoom
/// controller knows. `Unknown` until the first switch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveRole {
    UltraWide,
    Main,
    #[default]
    Unknown,
}

impl From<LensRole> for ActiveRole {
    fn from(role: LensRole) -> Self {
        match role {
            LensRole::UltraWide => ActiveRole::UltraWide,
            LensRole::Main => ActiveRole::Main,
        }
    }
}

impl fmt::Display for LensRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LensRole::UltraWide => write!(f, "ultra-wide"),
            LensRole::Main => write!(f, "main"),
        }
    }
}

/// Side of a rectangle, in image orientation (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    #[serde(default)]
    label: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

/// Normalized detector box, `[0, 1]` relative to the analyzed frame.
///
/// Construction enforces `x1 < x2` and `y1 < y2`; a box is never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    label: String,
    confidence: f32,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = String;

    fn try_from(raw: RawBoundingBox) -> Result<Self, Self::Error> {
        BoundingBox::with_confidence(raw.x1, raw.y1, raw.x2, raw.y2, raw.label, raw.confidence)
            .ok_or_else(|| {
                format!(
                    "invalid box ({}, {}, {}, {}): expected x1 < x2 and y1 < y2",
                    raw.x1, raw.y1, raw.x2, raw.y2
                )
            })
    }
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, label: impl Into<String>) -> Option<Self> {
        Self::with_confidence(x1, y1, x2, y2, label, 1.0)
    }

    pub fn with_confidence(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        label: impl Into<String>,
        confidence: f32,
    ) -> Option<Self> {
        let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
        if !finite || x1 >= x2 || y1 >= y2 {
            return None;
        }
        Some(BoundingBox {
            x1,
            y1,
            x2,
            y2,
            label: label.into(),
            confidence,
        })
    }

    /// Box of the given extents centered on `(cx, cy)`.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32, label: impl Into<String>) -> Option<Self> {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0, label)
    }

    pub fn x1(&self) -> f32 {
        self.x1
    }
    pub fn y1(&self) -> f32 {
        self.y1
    }
    pub fn x2(&self) -> f32 {
        self.x2
    }
    pub fn y2(&self) -> f32 {
        self.y2
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn cx(&self) -> f32 {
        (self.x1 + self.x2) / 2.0
    }
    pub fn cy(&self) -> f32 {
        (self.y1 + self.y2) / 2.0
    }
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.cx(), self.cy())
    }
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Larger of width and height; used to rank candidates.
    pub fn size(&self) -> f32 {
        self.width().max(self.height())
    }
}
