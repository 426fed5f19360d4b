//! Frame Geometry Benchmarks
//!
//! Measures the per-frame landmark math on the analysis hot path.
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package mockmate-vision --bench frame_geometry
//! ```
//!
//! # Metrics Measured
//! - Throughput (frames/second)
//! - Latency per frame
//! - Pose solver convergence cost

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mockmate_vision::landmarks::{
    self, Landmark, LandmarkFrame, LEFT_EYE_INNER, LEFT_EYE_LOWER_LID, LEFT_EYE_OUTER,
    LEFT_EYE_UPPER_LID, LEFT_IRIS, MESH_LANDMARK_COUNT, MOUTH_CORNER_LEFT, MOUTH_CORNER_RIGHT,
    RIGHT_EYE_INNER, RIGHT_EYE_OUTER, RIGHT_IRIS,
};
use mockmate_vision::{eye_ratios, head_pose_angles, mouth_opening, IterativePnpSolver, Session};

/// Create a synthetic landmark frame resembling a centered face.
fn create_test_frame() -> LandmarkFrame {
    // Scatter the filler points so mean-based measurements see realistic
    // spread rather than a single repeated coordinate.
    let mut points: Vec<Landmark> = (0..MESH_LANDMARK_COUNT)
        .map(|i| Landmark {
            x: 0.3 + ((i * 7) % 97) as f64 * 0.004,
            y: 0.2 + ((i * 11) % 89) as f64 * 0.006,
            z: -0.02 + ((i * 13) % 41) as f64 * 0.001,
        })
        .collect();

    let mut place = |index: usize, x: f64, y: f64, z: f64| {
        points[index] = Landmark { x, y, z };
    };

    place(LEFT_EYE_OUTER, 0.40, 0.50, -0.010);
    place(LEFT_EYE_INNER, 0.50, 0.50, -0.012);
    place(LEFT_IRIS, 0.45, 0.50, -0.015);
    place(RIGHT_EYE_OUTER, 0.60, 0.50, -0.010);
    place(RIGHT_EYE_INNER, 0.70, 0.50, -0.012);
    place(RIGHT_IRIS, 0.65, 0.50, -0.015);
    place(LEFT_EYE_UPPER_LID, 0.45, 0.46, -0.011);
    place(LEFT_EYE_LOWER_LID, 0.45, 0.54, -0.011);

    for &index in landmarks::UPPER_LIP {
        place(index, 0.50, 0.62, 0.005);
    }
    for &index in landmarks::LOWER_LIP {
        place(index, 0.50, 0.66, 0.005);
    }
    place(MOUTH_CORNER_LEFT, 0.45, 0.66, 0.0);
    place(MOUTH_CORNER_RIGHT, 0.55, 0.66, 0.0);

    // Nose and chin give the pose solver out-of-plane structure.
    place(1, 0.55, 0.56, 0.040);
    place(199, 0.54, 0.78, 0.012);

    LandmarkFrame::new(points)
}

/// Benchmark the gaze ratio computation.
fn bench_eye_ratios(c: &mut Criterion) {
    let mut group = c.benchmark_group("eye_ratios");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let resolutions = [(1920u32, 1080u32), (1280, 720), (640, 480)];
    let frame = create_test_frame();

    for (width, height) in resolutions {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("measure", format!("{}x{}", width, height)),
            &frame,
            |b, frame| {
                b.iter(|| {
                    let result = eye_ratios(black_box(frame), width, height);
                    black_box(result)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the mouth opening measurement (40 lip points averaged).
fn bench_mouth_opening(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouth_opening");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let frame = create_test_frame();

    group.throughput(Throughput::Elements(1));
    group.bench_function("measure_640x480", |b| {
        b.iter(|| {
            let result = mouth_opening(black_box(&frame), 640, 480);
            black_box(result)
        })
    });

    group.finish();
}

/// Benchmark the iterative pose solve from six reference landmarks.
fn bench_head_pose(c: &mut Criterion) {
    let mut group = c.benchmark_group("head_pose");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    let frame = create_test_frame();
    let solver = IterativePnpSolver::default();

    group.throughput(Throughput::Elements(1));
    group.bench_function("solve", |b| {
        b.iter(|| {
            let result = head_pose_angles(black_box(&frame), 640, 480, &solver);
            black_box(result)
        })
    });

    group.finish();
}

/// Benchmark a full calibrated per-frame pass through the session.
fn bench_session_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    let frame = create_test_frame();
    let now = Instant::now();
    let mut session = Session::new();

    // Exhaust calibration so the benchmark exercises the classification
    // path rather than baseline collection.
    for _ in 0..40 {
        session.process(&frame, 640, 480, now);
    }

    group.throughput(Throughput::Elements(1));
    group.bench_function("process_frame", |b| {
        b.iter(|| {
            let reply = session.process(black_box(&frame), 640, 480, now);
            black_box(reply)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_eye_ratios,
    bench_mouth_opening,
    bench_head_pose,
    bench_session_process,
);

criterion_main!(benches);
