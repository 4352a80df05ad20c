use std::collections::BTreeMap;
use std::io::Write;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::pipeline::FrameAnalysis;
use crate::positioning::Strategy;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &str, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Summary of a replayed detection session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub timestamp: String,
    pub strategy: Strategy,
    pub frame_count: usize,
    pub frames_with_vehicle: usize,
    pub frames_in_frame: usize,
    pub centered_ratio: f64,
    pub mean_inference_ms: Option<f64>,
    pub instructions: BTreeMap<String, usize>,
}

impl SessionReport {
    pub fn from_analyses(strategy: Strategy, analyses: &[FrameAnalysis]) -> SessionReport {
        let timestamp = time::OffsetDateTime::now_local()
            .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        let mut instructions = BTreeMap::new();
        let mut frames_with_vehicle = 0;
        let mut frames_in_frame = 0;
        let mut centered = 0;
        for a in analyses {
            if a.result.best_index.is_none() {
                continue;
            }
            frames_with_vehicle += 1;
            if a.result.is_vehicle_in_frame {
                frames_in_frame += 1;
            }
            if a.result.is_centered {
                centered += 1;
            }
            *instructions.entry(a.result.instruction.clone()).or_insert(0) += 1;
        }

        let inference: Vec<f64> = analyses
            .iter()
            .filter_map(|a| a.inference_ms)
            .map(|ms| ms as f64)
            .collect();
        let mean_inference_ms = if inference.is_empty() {
            None
        } else {
            Some(inference.iter().sum::<f64>() / inference.len() as f64)
        };

        SessionReport {
            timestamp,
            strategy,
            frame_count: analyses.len(),
            frames_with_vehicle,
            frames_in_frame,
            centered_ratio: if analyses.is_empty() {
                0.0
            } else {
                centered as f64 / analyses.len() as f64
            },
            mean_inference_ms,
            instructions,
        }
    }
}

pub fn write_session_report(output_path: &str, report: &SessionReport) -> Result<()> {
    object_to_json(output_path, report)
}
