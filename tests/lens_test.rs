use std::io::Write;

use tempfile::TempDir;
use vehicle_capture_guide::error::{Error, Result};
use vehicle_capture_guide::lens::{
    CameraCharacteristics, CameraSystem, JsonCameraSystem, LensCatalog, LensFacing, classify,
    discover, field_of_view_deg,
};
use vehicle_capture_guide::types::LensRole;

fn camera(id: &str, facing: LensFacing, focal: Option<f32>, sensor: Option<(f32, f32)>) -> CameraCharacteristics {
    CameraCharacteristics {
        id: id.to_string(),
        facing,
        focal_lengths_mm: focal.into_iter().collect(),
        sensor_size_mm: sensor,
    }
}

struct BrokenCameraSystem;

impl CameraSystem for BrokenCameraSystem {
    fn cameras(&self) -> Result<Vec<CameraCharacteristics>> {
        Err(Error::CameraEnumeration("camera service unavailable".to_string()))
    }
}

#[test]
fn test_classification_boundary() {
    assert_eq!(classify(2.4), LensRole::UltraWide);
    assert_eq!(classify(2.5), LensRole::Main);
    assert_eq!(classify(1.54), LensRole::UltraWide);
    assert_eq!(classify(5.96), LensRole::Main);
}

#[test]
fn test_field_of_view() {
    // sensor twice the focal length covers 90 degrees
    assert!((field_of_view_deg(4.0, 2.0) - 90.0).abs() < 1e-4);

    let hfov = field_of_view_deg(6.4, 5.6);
    let expected = (2.0 * (6.4f32 / 11.2).atan()).to_degrees();
    assert!((hfov - expected).abs() < 1e-4);
}

#[test]
fn test_discover_rear_lenses_only() {
    let cameras = vec![
        camera("0", LensFacing::Back, Some(5.6), Some((6.4, 4.8))),
        camera("1", LensFacing::Front, Some(2.0), Some((3.6, 2.7))),
        camera("2", LensFacing::Back, Some(2.2), Some((4.0, 3.0))),
        camera("3", LensFacing::External, Some(2.0), Some((4.0, 3.0))),
    ];
    let lenses = discover(&cameras);
    assert_eq!(lenses.len(), 2);
    assert_eq!(lenses[0].id, "0");
    assert_eq!(lenses[0].role, LensRole::Main);
    assert_eq!(lenses[1].id, "2");
    assert_eq!(lenses[1].role, LensRole::UltraWide);
    assert!((lenses[1].horizontal_fov_deg - field_of_view_deg(4.0, 2.2)).abs() < 1e-5);
    assert!((lenses[1].vertical_fov_deg - field_of_view_deg(3.0, 2.2)).abs() < 1e-5);
}

#[test]
fn test_discover_skips_incomplete_metadata() {
    let cameras = vec![
        camera("0", LensFacing::Back, None, Some((6.4, 4.8))),
        camera("1", LensFacing::Back, Some(2.0), None),
        camera("2", LensFacing::Back, Some(0.0), Some((6.4, 4.8))),
    ];
    assert!(discover(&cameras).is_empty());
    let catalog = LensCatalog::discover(&cameras);
    assert!(catalog.is_empty());
    assert!(catalog.ultra_wide().is_none());
    assert!(catalog.main().is_none());
}

#[test]
fn test_catalog_keeps_last_lens_per_role() {
    let cameras = vec![
        camera("0", LensFacing::Back, Some(5.6), Some((6.4, 4.8))),
        camera("2", LensFacing::Back, Some(2.2), Some((4.0, 3.0))),
        camera("4", LensFacing::Back, Some(13.0), Some((4.0, 3.0))),
    ];
    let catalog = LensCatalog::discover(&cameras);
    assert_eq!(catalog.main().unwrap().id, "4");
    assert_eq!(catalog.ultra_wide().unwrap().id, "2");
    assert_eq!(catalog.get(LensRole::Main).unwrap().id, "4");
}

#[test]
fn test_enumeration_failure_yields_empty() {
    assert!(discover(&BrokenCameraSystem).is_empty());
    assert!(LensCatalog::discover(&BrokenCameraSystem).is_empty());
}

#[test]
fn test_json_camera_system() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cameras.json");
    let description = serde_json::json!({
        "cameras": [
            { "id": "0", "facing": "back", "focal_lengths_mm": [5.96], "sensor_size_mm": [6.17, 4.55] },
            { "id": "1", "facing": "front", "focal_lengths_mm": [2.7], "sensor_size_mm": [3.6, 2.7] },
            { "id": "2", "facing": "back", "focal_lengths_mm": [1.54], "sensor_size_mm": [4.0, 3.0] }
        ]
    });
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(description.to_string().as_bytes()).unwrap();

    let system = JsonCameraSystem::new(path.to_str().unwrap());
    assert_eq!(system.cameras().unwrap().len(), 3);
    let catalog = LensCatalog::discover(&system);
    assert_eq!(catalog.main().unwrap().id, "0");
    assert_eq!(catalog.ultra_wide().unwrap().id, "2");
}

#[test]
fn test_json_camera_system_missing_file() {
    let system = JsonCameraSystem::new("non_existent_cameras.json");
    assert!(matches!(system.cameras(), Err(Error::CameraEnumeration(_))));
    assert!(LensCatalog::discover(&system).is_empty());
}
