// Copyright 2025 capture-recorder authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Inertial stream synchronizer tests
///
/// These tests verify gyro-referenced interpolation:
/// - Linear interpolation between bracketing accelerometer samples
/// - Verbatim reuse inside the resolution window
/// - Stale-data handling on both sides of the auxiliary window
///
use capture_recorder::{InertialSynchronizer, RawSample, SensorStream};

mod common;

const MS: i64 = 1_000_000;

fn accel(t_ms: i64) -> RawSample {
    // Encode the timestamp into the sample so interpolation is checkable.
    RawSample::new(t_ms * MS, vec![t_ms as f32, 2.0 * t_ms as f32, -(t_ms as f32)])
}

fn gyro(t_ms: i64) -> RawSample {
    RawSample::new(t_ms * MS, vec![0.01, 0.02, 0.03])
}

#[test]
fn emits_one_sample_per_gyro_event_at_gyro_timestamps() {
    let mut sync = InertialSynchronizer::new(500, false);

    for t in [0, 5, 15, 25] {
        assert!(sync.ingest(SensorStream::Accelerometer, accel(t)).is_none());
    }

    let mut emitted = Vec::new();
    for t in [0, 10, 20] {
        if let Some(sample) = sync.ingest(SensorStream::Gyroscope, gyro(t)) {
            emitted.push(sample);
        }
    }

    let timestamps: Vec<i64> = emitted.iter().map(|s| s.timestamp_ns).collect();
    assert_eq!(timestamps, vec![0, 10 * MS, 20 * MS]);

    // The 10 ms sample interpolates halfway between the 5 ms and 15 ms
    // accelerometer samples.
    assert_eq!(emitted[1].accel, vec![10.0, 20.0, -10.0]);
    // The gyro values pass through untouched.
    assert_eq!(emitted[1].gyro, vec![0.01, 0.02, 0.03]);
    // Magnetometer is not tracked in this configuration.
    assert!(emitted[1].mag.is_none());
}

#[test]
fn reuses_sample_verbatim_within_resolution_window() {
    let mut sync = InertialSynchronizer::new(500, false);
    sync.ingest(
        SensorStream::Accelerometer,
        RawSample::new(1_000_000, vec![1.25, 2.5, 5.0]),
    );
    sync.ingest(
        SensorStream::Accelerometer,
        RawSample::new(2_000_000, vec![100.0, 200.0, 400.0]),
    );

    // 300 ns after the left bracket: left values, no arithmetic applied.
    let left = sync
        .ingest(SensorStream::Gyroscope, RawSample::new(1_000_300, vec![0.0; 3]))
        .expect("bracketed");
    assert_eq!(left.accel, vec![1.25, 2.5, 5.0]);

    // 200 ns before the right bracket: right values verbatim.
    let right = sync
        .ingest(SensorStream::Gyroscope, RawSample::new(1_999_800, vec![0.0; 3]))
        .expect("bracketed");
    assert_eq!(right.accel, vec![100.0, 200.0, 400.0]);
}

#[test]
fn gyro_older_than_all_accel_is_dropped() {
    common::init_tracing();
    let mut sync = InertialSynchronizer::new(500, false);
    sync.ingest(SensorStream::Accelerometer, accel(10));
    sync.ingest(SensorStream::Accelerometer, accel(20));

    // Predates the accelerometer history: dropped, no emission, and the
    // accelerometer buffer is left untouched.
    assert!(sync.ingest(SensorStream::Gyroscope, gyro(5)).is_none());
    assert_eq!(sync.buffered(SensorStream::Gyroscope), 0);
    assert_eq!(sync.buffered(SensorStream::Accelerometer), 2);

    // A properly bracketed gyro event still works afterwards.
    let sample = sync
        .ingest(SensorStream::Gyroscope, gyro(15))
        .expect("bracketed");
    assert_eq!(sample.timestamp_ns, 15 * MS);
}

#[test]
fn gyro_ahead_of_accel_window_trims_to_newest() {
    common::init_tracing();
    let mut sync = InertialSynchronizer::new(500, false);
    sync.ingest(SensorStream::Accelerometer, accel(0));
    sync.ingest(SensorStream::Accelerometer, accel(5));

    // Gyro is newer than everything buffered: stale accel is discarded,
    // only the newest sample is kept as the future left bracket, and the
    // gyro sample stays queued.
    assert!(sync.ingest(SensorStream::Gyroscope, gyro(10)).is_none());
    assert_eq!(sync.buffered(SensorStream::Accelerometer), 1);
    assert_eq!(sync.buffered(SensorStream::Gyroscope), 1);

    // Once new accel data brackets it, the queued gyro sample resolves.
    sync.ingest(SensorStream::Accelerometer, accel(15));
    let sample = sync
        .ingest(SensorStream::Gyroscope, gyro(12))
        .expect("oldest gyro now bracketed");
    assert_eq!(sample.timestamp_ns, 10 * MS);
    // Halfway between the 5 ms and 15 ms samples.
    assert_eq!(sample.accel, vec![10.0, 20.0, -10.0]);
}

#[test]
fn no_emission_until_aux_buffers_have_two_samples() {
    let mut sync = InertialSynchronizer::new(500, false);
    assert!(sync.ingest(SensorStream::Gyroscope, gyro(0)).is_none());
    sync.ingest(SensorStream::Accelerometer, accel(0));
    assert!(sync.ingest(SensorStream::Gyroscope, gyro(1)).is_none());
    sync.ingest(SensorStream::Accelerometer, accel(5));

    let sample = sync
        .ingest(SensorStream::Gyroscope, gyro(2))
        .expect("two accel samples now bracket the oldest gyro");
    assert_eq!(sample.timestamp_ns, 0);
}

#[test]
fn tracked_magnetometer_must_resolve_in_same_invocation() {
    let mut sync = InertialSynchronizer::new(500, true);
    for t in [0, 10] {
        sync.ingest(SensorStream::Accelerometer, accel(t));
    }
    // Accel brackets the gyro but mag has no data: nothing is emitted and
    // the gyro sample stays queued.
    assert!(sync.ingest(SensorStream::Gyroscope, gyro(5)).is_none());
    assert_eq!(sync.buffered(SensorStream::Gyroscope), 1);

    sync.ingest(SensorStream::Magnetometer, RawSample::new(0, vec![30.0; 3]));
    sync.ingest(SensorStream::Magnetometer, RawSample::new(10 * MS, vec![50.0; 3]));

    let sample = sync
        .ingest(SensorStream::Gyroscope, gyro(6))
        .expect("all aux streams resolve");
    assert_eq!(sample.timestamp_ns, 5 * MS);
    assert_eq!(sample.mag, Some(vec![40.0; 3]));
}
