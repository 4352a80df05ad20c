use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::object_from_json;
use crate::positioning::Strategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub initial_ratio: f32,
    /// Bounds used until the first bound lens reports its own range.
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial_ratio: 1.0,
            min_ratio: 0.5,
            max_ratio: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detector labels counted as vehicles.
    pub vehicle_labels: Vec<String>,
    pub min_confidence: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            vehicle_labels: ["car", "truck", "bus", "motorcycle"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    pub zoom: ZoomConfig,
    pub strategy: Strategy,
    pub detection: DetectionConfig,
}

impl GuideConfig {
    pub fn from_json_file(path: &str) -> Result<GuideConfig> {
        object_from_json(path)
    }
}
