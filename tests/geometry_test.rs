use glam::Vec2;
use vehicle_capture_guide::geometry::{
    GuideFrames, NormRect, PixelRect, display_rect, letterbox, outer_guide_rect_px,
};
use vehicle_capture_guide::types::{BoundingBox, Side};

fn assert_vec_close(a: Vec2, b: Vec2) {
    assert!((a - b).length() < 1e-3, "expected {:?}, got {:?}", b, a);
}

#[test]
fn test_standard_frames() {
    let frames = GuideFrames::standard();
    assert!((frames.outer.left - 0.05).abs() < 1e-6);
    assert!((frames.outer.right - 0.95).abs() < 1e-6);
    assert!((frames.inner.top - 0.10).abs() < 1e-6);
    assert!((frames.inner.bottom - 0.90).abs() < 1e-6);
    assert!(frames.is_measurable());
    assert!(frames.outer.strictly_contains(&frames.inner));
    assert_vec_close(frames.center(), Vec2::new(0.5, 0.5));
}

#[test]
fn test_protrusions() {
    let outer = GuideFrames::standard().outer;
    let b = BoundingBox::new(0.01, 0.2, 0.99, 0.97, "car").unwrap();
    assert_eq!(outer.protrusions(&b), vec![Side::Left, Side::Right, Side::Bottom]);
    let inside = BoundingBox::new(0.06, 0.06, 0.94, 0.94, "car").unwrap();
    assert!(outer.protrusions(&inside).is_empty());
    assert!(outer.contains_box(&inside));
}

#[test]
fn test_guide_rect_without_source() {
    let rect = outer_guide_rect_px(Vec2::new(1000.0, 2000.0), None).unwrap();
    assert_vec_close(rect.min, Vec2::new(50.0, 100.0));
    assert_vec_close(rect.size, Vec2::new(900.0, 1800.0));
}

#[test]
fn test_letterbox_landscape_into_portrait() {
    let viewport = Vec2::new(1080.0, 1920.0);
    let source = Vec2::new(1920.0, 1080.0);
    let display = letterbox(viewport, source).unwrap();
    assert_vec_close(display.min, Vec2::new(0.0, 656.25));
    assert_vec_close(display.size, Vec2::new(1080.0, 607.5));

    let guide = outer_guide_rect_px(viewport, Some(source)).unwrap();
    assert_vec_close(guide.min, Vec2::new(54.0, 686.625));
    assert_vec_close(guide.size, Vec2::new(972.0, 546.75));
    assert!(display.contains_rect(&guide));
}

#[test]
fn test_letterbox_pillarbox() {
    // 4:3 source into a wide viewport leaves bars left and right
    let display = letterbox(Vec2::new(1600.0, 900.0), Vec2::new(400.0, 300.0)).unwrap();
    assert_vec_close(display.min, Vec2::new(200.0, 0.0));
    assert_vec_close(display.size, Vec2::new(1200.0, 900.0));
}

#[test]
fn test_degenerate_inputs() {
    assert!(outer_guide_rect_px(Vec2::new(0.0, 1920.0), None).is_none());
    assert!(outer_guide_rect_px(Vec2::new(1080.0, 1920.0), Some(Vec2::ZERO)).is_none());
    assert!(letterbox(Vec2::new(f32::NAN, 10.0), Vec2::new(10.0, 10.0)).is_none());
    assert!(display_rect(Vec2::new(-1.0, 10.0), None).is_none());
}

#[test]
fn test_norm_rect_to_pixels() {
    let display = PixelRect::new(10.0, 20.0, 200.0, 100.0);
    let px = NormRect::new(0.25, 0.5, 0.75, 1.0).to_pixels(&display);
    assert_vec_close(px.min, Vec2::new(60.0, 70.0));
    assert_vec_close(px.size, Vec2::new(100.0, 50.0));
    assert_vec_close(px.max(), Vec2::new(160.0, 120.0));
}
