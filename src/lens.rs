use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::object_from_json;
use crate::types::LensRole;

/// Focal lengths strictly below this are treated as ultra-wide.
pub const ULTRA_WIDE_MAX_FOCAL_MM: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensFacing {
    Front,
    Back,
    External,
}

/// Raw characteristics reported by the platform camera system for one lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCharacteristics {
    pub id: String,
    pub facing: LensFacing,
    #[serde(default)]
    pub focal_lengths_mm: Vec<f32>,
    /// Physical sensor size as (width, height) in millimeters.
    #[serde(default)]
    pub sensor_size_mm: Option<(f32, f32)>,
}

/// Source of lens characteristics. Implemented by the platform glue.
pub trait CameraSystem {
    fn cameras(&self) -> Result<Vec<CameraCharacteristics>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensInfo {
    pub id: String,
    pub focal_length_mm: f32,
    pub sensor_width_mm: f32,
    pub sensor_height_mm: f32,
    pub horizontal_fov_deg: f32,
    pub vertical_fov_deg: f32,
    pub role: LensRole,
}

/// Field of view in degrees covered by `sensor_dim_mm` at `focal_length_mm`.
pub fn field_of_view_deg(sensor_dim_mm: f32, focal_length_mm: f32) -> f32 {
    (2.0 * (sensor_dim_mm / (2.0 * focal_length_mm)).atan()).to_degrees()
}

pub fn classify(focal_length_mm: f32) -> LensRole {
    if focal_length_mm < ULTRA_WIDE_MAX_FOCAL_MM {
        LensRole::UltraWide
    } else {
        LensRole::Main
    }
}

fn lens_info(camera: &CameraCharacteristics) -> Option<LensInfo> {
    let focal_length_mm = camera
        .focal_lengths_mm
        .first()
        .copied()
        .filter(|f| f.is_finite() && *f > 0.0)?;
    let (sensor_width_mm, sensor_height_mm) = camera
        .sensor_size_mm
        .filter(|(w, h)| w.is_finite() && h.is_finite() && *w > 0.0 && *h > 0.0)?;
    Some(LensInfo {
        id: camera.id.clone(),
        focal_length_mm,
        sensor_width_mm,
        sensor_height_mm,
        horizontal_fov_deg: field_of_view_deg(sensor_width_mm, focal_length_mm),
        vertical_fov_deg: field_of_view_deg(sensor_height_mm, focal_length_mm),
        role: classify(focal_length_mm),
    })
}

/// Scans the rear lenses of `system` and classifies each one.
///
/// Front and external lenses are dropped before classification. A lens
/// without focal length or sensor size is skipped. Enumeration failures are
/// logged and produce an empty list, callers then run on digital zoom only.
pub fn discover(system: &dyn CameraSystem) -> Vec<LensInfo> {
    let cameras = match system.cameras() {
        Ok(cameras) => cameras,
        Err(e) => {
            warn!("lens discovery failed, continuing without lens switching: {}", e);
            return Vec::new();
        }
    };
    cameras
        .iter()
        .filter(|c| c.facing == LensFacing::Back)
        .filter_map(|c| {
            let info = lens_info(c);
            match &info {
                Some(l) => trace!(
                    "lens {}: f={:.2}mm hfov={:.1} vfov={:.1} -> {}",
                    l.id,
                    l.focal_length_mm,
                    l.horizontal_fov_deg,
                    l.vertical_fov_deg,
                    l.role
                ),
                None => debug!("lens {} lacks focal length or sensor size, skipped", c.id),
            }
            info
        })
        .collect()
}

/// One lens per role, as discovered for the current camera session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LensCatalog {
    ultra_wide: Option<LensInfo>,
    main: Option<LensInfo>,
}

impl LensCatalog {
    pub fn discover(system: &dyn CameraSystem) -> LensCatalog {
        Self::from_lenses(discover(system))
    }

    /// Keeps the last lens seen for each role.
    pub fn from_lenses(lenses: impl IntoIterator<Item = LensInfo>) -> LensCatalog {
        let mut catalog = LensCatalog::default();
        for lens in lenses {
            match lens.role {
                LensRole::UltraWide => catalog.ultra_wide = Some(lens),
                LensRole::Main => catalog.main = Some(lens),
            }
        }
        catalog
    }

    pub fn ultra_wide(&self) -> Option<&LensInfo> {
        self.ultra_wide.as_ref()
    }

    pub fn main(&self) -> Option<&LensInfo> {
        self.main.as_ref()
    }

    pub fn get(&self, role: LensRole) -> Option<&LensInfo> {
        match role {
            LensRole::UltraWide => self.ultra_wide(),
            LensRole::Main => self.main(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ultra_wide.is_none() && self.main.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CameraSystemDescription {
    cameras: Vec<CameraCharacteristics>,
}

/// Camera system read from a JSON description, e.g. a capture of a device's
/// characteristics.
///
/// ```json
/// { "cameras": [ { "id": "0", "facing": "back", "focal_lengths_mm": [5.6], "sensor_size_mm": [6.4, 4.8] } ] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonCameraSystem {
    path: String,
}

impl JsonCameraSystem {
    pub fn new(path: impl Into<String>) -> JsonCameraSystem {
        JsonCameraSystem { path: path.into() }
    }
}

impl CameraSystem for JsonCameraSystem {
    fn cameras(&self) -> Result<Vec<CameraCharacteristics>> {
        let description: CameraSystemDescription = object_from_json(&self.path)
            .map_err(|e| Error::CameraEnumeration(format!("{}: {}", self.path, e)))?;
        Ok(description.cameras)
    }
}

impl CameraSystem for Vec<CameraCharacteristics> {
    fn cameras(&self) -> Result<Vec<CameraCharacteristics>> {
        Ok(self.clone())
    }
}
