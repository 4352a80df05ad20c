use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::types::BoundingBox;

/// Detector output for one analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    #[serde(default)]
    pub timestamp_ns: i64,
    #[serde(default)]
    pub inference_ms: Option<u64>,
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
}

/// What the detector reports per frame. Both variants feed the analyzer the
/// same way; an empty event is a normal steady state.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    Empty { timestamp_ns: i64 },
    Detected(DetectionFrame),
}

impl DetectionEvent {
    pub fn into_frame(self) -> DetectionFrame {
        match self {
            DetectionEvent::Empty { timestamp_ns } => DetectionFrame {
                timestamp_ns,
                inference_ms: None,
                boxes: Vec::new(),
            },
            DetectionEvent::Detected(frame) => frame,
        }
    }
}

impl From<DetectionFrame> for DetectionEvent {
    fn from(frame: DetectionFrame) -> Self {
        if frame.boxes.is_empty() && frame.inference_ms.is_none() {
            DetectionEvent::Empty {
                timestamp_ns: frame.timestamp_ns,
            }
        } else {
            DetectionEvent::Detected(frame)
        }
    }
}

/// Keeps detections whose class is a vehicle and whose confidence clears the
/// configured floor. Input order is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleFilter {
    labels: Vec<String>,
    min_confidence: f32,
}

impl Default for VehicleFilter {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl VehicleFilter {
    pub fn from_config(config: &DetectionConfig) -> VehicleFilter {
        VehicleFilter {
            labels: config.vehicle_labels.iter().map(|l| l.to_lowercase()).collect(),
            min_confidence: config.min_confidence,
        }
    }

    pub fn accepts(&self, b: &BoundingBox) -> bool {
        b.confidence() >= self.min_confidence
            && (self.labels.is_empty() || self.labels.iter().any(|l| b.label().eq_ignore_ascii_case(l)))
    }

    pub fn vehicles(&self, frame: &DetectionFrame) -> Vec<BoundingBox> {
        frame.boxes.iter().filter(|b| self.accepts(b)).cloned().collect()
    }
}
