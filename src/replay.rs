use std::path::{Path, PathBuf};

use glob::glob;
use log::{trace, warn};

use crate::detection::DetectionFrame;
use crate::error::Result;
use crate::io::object_from_json;

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// Loads recorded detection frames (`*.json`) from `root_folder`.
///
/// Frames are ordered by the timestamp in their file name. Files without a
/// numeric name keep path order and get `index * 100ms` unless the frame
/// carries its own timestamp. Unreadable files are skipped with a warning.
pub fn load_detection_frames(root_folder: &str) -> Result<Vec<DetectionFrame>> {
    let pattern = format!("{}/**/*.json", root_folder.trim_end_matches('/'));
    let mut paths: Vec<PathBuf> = glob(&pattern)?.filter_map(|p| p.ok()).collect();
    paths.sort();
    trace!("found {} detection files under {}", paths.len(), root_folder);

    let mut frames: Vec<(i64, DetectionFrame)> = paths
        .iter()
        .enumerate()
        .filter_map(|(idx, path)| {
            let path_str = path.to_string_lossy();
            let mut frame: DetectionFrame = match object_from_json(&path_str) {
                Ok(f) => f,
                Err(e) => {
                    warn!("skipping {}: {}", path_str, e);
                    return None;
                }
            };
            if let Some(ts) = path_to_timestamp(path) {
                frame.timestamp_ns = ts;
            } else if frame.timestamp_ns == 0 {
                frame.timestamp_ns = idx as i64 * 100_000_000;
            }
            Some((frame.timestamp_ns, frame))
        })
        .collect();
    frames.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(frames.into_iter().map(|(_, f)| f).collect())
}
