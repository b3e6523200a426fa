//! Integration test: a full editing session with telemetry, the way a
//! front end drives the engine.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use pixlab_engine::stats::DEFAULT_MATRIX_SIZE;
use pixlab_engine::{
    BlurParams, Clock, Dimensions, MemorySink, Operation, OperationKind, PixelBuffer, RotateParams,
    Session, sample_matrix,
};

/// Every operation appears to take exactly two milliseconds.
struct FixedClock;

impl Clock for FixedClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::from_millis(2)
    }
}

fn checkerboard(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        if (x + y) % 2 == 0 {
            [255, 255, 255, 255]
        } else {
            [0, 0, 0, 255]
        }
    })
    .unwrap()
}

#[test]
fn session_edits_and_reports() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut session = Session::new(checkerboard(8));
    let mut sink = MemorySink::new();
    let ops = [
        Operation::Blur(BlurParams { radius: 1 }),
        Operation::Rotate(RotateParams {
            angle: 30.0,
            ..RotateParams::default()
        }),
        Operation::with_defaults(OperationKind::Grayscale),
    ];
    session.apply_all(&ops, &FixedClock, &mut sink).unwrap();

    assert_eq!(sink.len(), 3);
    assert_eq!(sink.total_duration(), Duration::from_millis(6));
    let rotated = sink.records()[1].output;
    assert_ne!(rotated, Dimensions::new(8, 8));
    assert_eq!(session.current().dimensions(), rotated);
    assert_eq!(sink.records()[2].input, rotated);

    let report = sink.report();
    assert!(report.contains("blur(radius=1)"));
    assert!(report.contains("grayscale"));
    assert!(report.contains("3 operations, total 6.000ms"));

    let histogram = session.histogram();
    assert_eq!(histogram.total(), u64::from(rotated.width) * u64::from(rotated.height));

    session.reset();
    assert_eq!(session.current(), &checkerboard(8));
    assert_eq!(session.statistics().total_pixels, 64);
}

#[test]
fn telemetry_serializes_to_json() {
    let mut session = Session::new(checkerboard(4));
    let mut sink = MemorySink::new();
    session.apply(&Operation::Invert, &FixedClock, &mut sink).unwrap();

    let json = serde_json::to_value(&sink).unwrap();
    let record = &json["records"][0];
    assert_eq!(record["operation"]["operation"], "invert");
    assert_eq!(record["input"]["width"], 4);
    assert_eq!(record["duration"], serde_json::json!(0.002));
}

#[test]
fn sample_matrix_reads_around_center() {
    let session = Session::new(checkerboard(8));
    let matrix = sample_matrix(session.current(), DEFAULT_MATRIX_SIZE);
    assert_eq!(matrix.len(), 5);
    // Origin (2, 2) has an even coordinate sum.
    assert_eq!(matrix[0][0], [255, 255, 255, 255]);
    assert_eq!(matrix[0][1], [0, 0, 0, 255]);
}
