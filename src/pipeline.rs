//! Frame delivery to the analyzer.
//!
//! The camera produces frames faster than they may be analyzed. Only the most
//! recent unprocessed frame is kept; publishing over an unconsumed frame drops
//! the older one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;

use log::{debug, trace};
use serde::Serialize;

use crate::detection::{DetectionFrame, VehicleFilter};
use crate::positioning::{PositioningAnalyzer, PositioningResult, Strategy};
use crate::types::BoundingBox;

struct SlotState<T> {
    frame: Option<T>,
    closed: bool,
}

/// Single-slot mailbox, newest frame wins.
pub struct LatestFrameSlot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
    dropped: AtomicU64,
}

impl<T> Default for LatestFrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestFrameSlot<T> {
    pub fn new() -> LatestFrameSlot<T> {
        LatestFrameSlot {
            state: Mutex::new(SlotState {
                frame: None,
                closed: false,
            }),
            ready: Condvar::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Stores `frame`, replacing any frame not yet taken. Returns false once
    /// the slot is closed.
    pub fn publish(&self, frame: T) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return false;
        }
        if state.frame.replace(frame).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.ready.notify_one();
        true
    }

    pub fn try_take(&self) -> Option<T> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .frame
            .take()
    }

    /// Blocks until a frame is available. `None` after the slot is closed and
    /// drained.
    pub fn take(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(frame) = state.frame.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.closed = true;
        self.ready.notify_all();
    }

    /// Frames replaced before anyone took them.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Analyzer output for one frame, with what a renderer needs alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameAnalysis {
    pub timestamp_ns: i64,
    pub inference_ms: Option<u64>,
    pub vehicles: Vec<BoundingBox>,
    pub result: PositioningResult,
}

impl FrameAnalysis {
    pub fn detection_count(&self) -> usize {
        self.vehicles.len()
    }
}

/// Filters a detection frame down to vehicles and analyzes it.
pub fn analyze_frame(
    analyzer: &PositioningAnalyzer,
    filter: &VehicleFilter,
    strategy: Strategy,
    frame: &DetectionFrame,
) -> FrameAnalysis {
    let vehicles = filter.vehicles(frame);
    let result = analyzer.analyze(&vehicles, strategy);
    FrameAnalysis {
        timestamp_ns: frame.timestamp_ns,
        inference_ms: frame.inference_ms,
        vehicles,
        result,
    }
}

/// Runs the analyzer on its own thread, fed through a [`LatestFrameSlot`].
pub struct AnalysisWorker {
    slot: Arc<LatestFrameSlot<DetectionFrame>>,
    handle: Option<JoinHandle<u64>>,
}

impl AnalysisWorker {
    pub fn spawn<F>(
        analyzer: PositioningAnalyzer,
        filter: VehicleFilter,
        strategy: Strategy,
        mut on_result: F,
    ) -> std::io::Result<AnalysisWorker>
    where
        F: FnMut(FrameAnalysis) + Send + 'static,
    {
        let slot = Arc::new(LatestFrameSlot::new());
        let worker_slot = Arc::clone(&slot);
        let handle = std::thread::Builder::new()
            .name("frame-analysis".to_string())
            .spawn(move || {
                let mut processed = 0u64;
                while let Some(frame) = worker_slot.take() {
                    let analysis = analyze_frame(&analyzer, &filter, strategy, &frame);
                    trace!(
                        "frame {}: {} vehicles, '{}'",
                        analysis.timestamp_ns,
                        analysis.detection_count(),
                        analysis.result.instruction
                    );
                    on_result(analysis);
                    processed += 1;
                }
                processed
            })?;
        Ok(AnalysisWorker {
            slot,
            handle: Some(handle),
        })
    }

    /// Hands a frame to the worker, superseding any frame still waiting.
    pub fn submit(&self, frame: DetectionFrame) -> bool {
        self.slot.publish(frame)
    }

    pub fn dropped(&self) -> u64 {
        self.slot.dropped()
    }

    /// Stops accepting frames, finishes the pending one and joins the thread.
    /// Returns the number of frames analyzed.
    pub fn shutdown(mut self) -> u64 {
        self.stop()
    }

    fn stop(&mut self) -> u64 {
        self.slot.close();
        let processed = match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(0),
            None => 0,
        };
        debug!(
            "analysis worker stopped: {} analyzed, {} dropped",
            processed,
            self.slot.dropped()
        );
        processed
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
