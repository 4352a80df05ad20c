use glam::Vec2;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::geometry::{NormRect, PixelRect, display_rect, outer_guide_rect_px};
use crate::pipeline::FrameAnalysis;
use crate::positioning::PositioningResult;

const GUIDE_COLOR: [u8; 3] = [255, 255, 255];
const LINE_WIDTH: u32 = 2;
const HIGHLIGHT_WIDTH: u32 = 4;
const BANNER_HEIGHT_FRACTION: f32 = 0.06;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub rect: PixelRect,
    pub color: [u8; 3],
    /// The box the instruction refers to.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub text: String,
    pub color: [u8; 3],
}

/// Everything drawn over the preview for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlay {
    pub guide: Option<PixelRect>,
    pub boxes: Vec<OverlayBox>,
    /// `None` clears the banner, which happens when no vehicle is seen.
    pub banner: Option<Banner>,
}

pub fn id_to_color(id: usize) -> [u8; 3] {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    [
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
    ]
}

/// Red when the vehicle is out of the frame, yellow while adjusting, green
/// once centered.
pub fn banner_color(result: &PositioningResult) -> [u8; 3] {
    let t = if result.is_centered {
        1.0
    } else if result.is_vehicle_in_frame {
        0.6
    } else {
        0.0
    };
    let c = colorous::RED_YELLOW_GREEN.eval_continuous(t);
    [c.r, c.g, c.b]
}

pub fn build_overlay(analysis: &FrameAnalysis, viewport: Vec2, source: Option<Vec2>) -> Overlay {
    let Some(display) = display_rect(viewport, source) else {
        return Overlay::default();
    };
    let boxes = analysis
        .vehicles
        .iter()
        .enumerate()
        .map(|(i, b)| OverlayBox {
            rect: NormRect::from(b).to_pixels(&display),
            color: id_to_color(i),
            highlighted: analysis.result.best_index == Some(i),
        })
        .collect();
    let banner = (!analysis.result.is_no_vehicle()).then(|| Banner {
        text: analysis.result.instruction.clone(),
        color: banner_color(&analysis.result),
    });
    Overlay {
        guide: outer_guide_rect_px(viewport, source),
        boxes,
        banner,
    }
}

fn to_rect(rect: &PixelRect) -> Option<Rect> {
    let (w, h) = (rect.size.x.round(), rect.size.y.round());
    if !(w >= 1.0 && h >= 1.0) || !rect.min.is_finite() {
        return None;
    }
    Some(Rect::at(rect.min.x.round() as i32, rect.min.y.round() as i32).of_size(w as u32, h as u32))
}

/// Outline `width` pixels thick, drawn inwards from the rectangle's edge.
fn draw_rect_outline(img: &mut RgbImage, rect: &PixelRect, color: [u8; 3], width: u32) {
    let Some(rect) = to_rect(rect) else {
        return;
    };
    for inset in 0..width {
        let (w, h) = (rect.width().saturating_sub(2 * inset), rect.height().saturating_sub(2 * inset));
        if w == 0 || h == 0 {
            break;
        }
        let ring = Rect::at(rect.left() + inset as i32, rect.top() + inset as i32).of_size(w, h);
        draw_hollow_rect_mut(img, ring, Rgb(color));
    }
}

/// Draws `overlay` onto `img`. Text is left to the UI layer; the banner is
/// rendered as a colored strip along the top edge.
pub fn render_overlay(img: &mut RgbImage, overlay: &Overlay) {
    if let Some(guide) = &overlay.guide {
        draw_rect_outline(img, guide, GUIDE_COLOR, LINE_WIDTH);
    }
    for b in &overlay.boxes {
        let width = if b.highlighted {
            HIGHLIGHT_WIDTH
        } else {
            LINE_WIDTH
        };
        draw_rect_outline(img, &b.rect, b.color, width);
    }
    if let Some(banner) = &overlay.banner {
        let strip = ((img.height() as f32 * BANNER_HEIGHT_FRACTION).ceil() as u32).min(img.height());
        if img.width() > 0 && strip > 0 {
            draw_filled_rect_mut(img, Rect::at(0, 0).of_size(img.width(), strip), Rgb(banner.color));
        }
    }
}
