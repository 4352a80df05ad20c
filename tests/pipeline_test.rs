use std::sync::mpsc;

use vehicle_capture_guide::config::DetectionConfig;
use vehicle_capture_guide::detection::{DetectionEvent, DetectionFrame, VehicleFilter};
use vehicle_capture_guide::pipeline::{AnalysisWorker, LatestFrameSlot, analyze_frame};
use vehicle_capture_guide::positioning::{PositioningAnalyzer, Strategy};
use vehicle_capture_guide::types::BoundingBox;

fn frame(timestamp_ns: i64, boxes: Vec<BoundingBox>) -> DetectionFrame {
    DetectionFrame {
        timestamp_ns,
        inference_ms: Some(12),
        boxes,
    }
}

#[test]
fn test_latest_frame_wins() {
    let slot = LatestFrameSlot::new();
    assert!(slot.publish(1));
    assert!(slot.publish(2));
    assert!(slot.publish(3));
    assert_eq!(slot.dropped(), 2);
    assert_eq!(slot.try_take(), Some(3));
    assert_eq!(slot.try_take(), None);

    assert!(slot.publish(4));
    assert_eq!(slot.take(), Some(4));
    assert_eq!(slot.dropped(), 2);
}

#[test]
fn test_closed_slot() {
    let slot = LatestFrameSlot::new();
    slot.publish("pending");
    slot.close();
    assert!(!slot.publish("late"));
    assert_eq!(slot.take(), Some("pending"));
    assert_eq!(slot.take(), None);
}

#[test]
fn test_vehicle_filter() {
    let filter = VehicleFilter::from_config(&DetectionConfig {
        vehicle_labels: vec!["car".to_string(), "Truck".to_string()],
        min_confidence: 0.5,
    });
    let boxes = vec![
        BoundingBox::with_confidence(0.1, 0.1, 0.3, 0.3, "person", 0.9).unwrap(),
        BoundingBox::with_confidence(0.2, 0.2, 0.6, 0.6, "CAR", 0.8).unwrap(),
        BoundingBox::with_confidence(0.1, 0.1, 0.9, 0.9, "truck", 0.3).unwrap(),
        BoundingBox::with_confidence(0.3, 0.3, 0.5, 0.5, "truck", 0.6).unwrap(),
    ];
    let vehicles = filter.vehicles(&frame(0, boxes));
    let labels: Vec<_> = vehicles.iter().map(|b| b.label()).collect();
    assert_eq!(labels, vec!["CAR", "truck"]);
}

#[test]
fn test_empty_event_analyzes_to_sentinel() {
    let event = DetectionEvent::from(DetectionFrame {
        timestamp_ns: 7,
        inference_ms: None,
        boxes: Vec::new(),
    });
    assert_eq!(event, DetectionEvent::Empty { timestamp_ns: 7 });
    let analysis = analyze_frame(
        &PositioningAnalyzer::new(),
        &VehicleFilter::default(),
        Strategy::Advanced,
        &event.into_frame(),
    );
    assert_eq!(analysis.timestamp_ns, 7);
    assert_eq!(analysis.detection_count(), 0);
    assert!(analysis.result.is_no_vehicle());
}

#[test]
fn test_analysis_worker_processes_latest() {
    let (tx, rx) = mpsc::channel();
    let worker = AnalysisWorker::spawn(
        PositioningAnalyzer::new(),
        VehicleFilter::default(),
        Strategy::Advanced,
        move |analysis| {
            let _ = tx.send(analysis);
        },
    )
    .unwrap();

    let car = BoundingBox::new(0.11, 0.11, 0.89, 0.89, "car").unwrap();
    let submitted = 20;
    for ts in 0..submitted {
        assert!(worker.submit(frame(ts, vec![car.clone()])));
    }
    let dropped = worker.dropped();
    let processed = worker.shutdown();
    assert!(processed >= 1);
    assert!(processed + dropped <= submitted as u64);

    let results: Vec<_> = rx.iter().collect();
    assert_eq!(results.len() as u64, processed);
    let last = results.last().unwrap();
    assert_eq!(last.timestamp_ns, submitted - 1);
    assert_eq!(last.result.instruction, "correct position");
    assert!(results.windows(2).all(|w| w[0].timestamp_ns < w[1].timestamp_ns));
}
