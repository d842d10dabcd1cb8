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

// Sensor frontend: the glue between the platform sensor callbacks and
// the recording sink.
//
// Runs entirely on the sensor-event thread. It owns the synchronizer,
// tracks per-stream accuracy and an estimated sampling rate, and turns
// synchronized samples into `ImuData` records. Synchronization keeps
// running while not recording so the buffers stay bounded; the sink
// discards whatever it is handed outside a session.

use std::sync::Arc;

use crate::config::SynchronizerConfig;
use crate::proto::{ImuData, ImuInfo, SensorAccuracy};
use crate::recorder::RecordingSink;
use crate::sample::{RawSample, SensorStream, SyncedSample};
use crate::sync::InertialSynchronizer;

/// Static description of one physical sensor, as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorDescriptor {
    pub info: String,
    pub resolution: f32,
}

/// Descriptors for the tracked inertial sensors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InertialDescriptors {
    pub gyro: SensorDescriptor,
    pub accel: SensorDescriptor,
    pub mag: Option<SensorDescriptor>,
}

pub struct SensorFrontend {
    synchronizer: InertialSynchronizer,
    sink: Arc<RecordingSink>,
    descriptors: InertialDescriptors,
    gyro_accuracy: SensorAccuracy,
    accel_accuracy: SensorAccuracy,
    mag_accuracy: SensorAccuracy,
    prev_accel_ns: i64,
    estimated_interval_ns: i64,
    placement: Option<[f32; 3]>,
}

impl SensorFrontend {
    pub fn new(
        sink: Arc<RecordingSink>,
        config: &SynchronizerConfig,
        descriptors: InertialDescriptors,
    ) -> Self {
        Self {
            synchronizer: InertialSynchronizer::from_config(config),
            sink,
            descriptors,
            gyro_accuracy: SensorAccuracy::Unreliable,
            accel_accuracy: SensorAccuracy::Unreliable,
            mag_accuracy: SensorAccuracy::Unreliable,
            prev_accel_ns: 0,
            estimated_interval_ns: 0,
            placement: None,
        }
    }

    /// Platform sensor callback entry point, one call per event.
    pub fn on_sample(&mut self, stream: SensorStream, sample: RawSample) {
        match stream {
            SensorStream::Gyroscope => self.gyro_accuracy = sample.accuracy,
            SensorStream::Accelerometer => {
                self.accel_accuracy = sample.accuracy;
                self.update_rate_estimate(sample.timestamp_ns);
            }
            SensorStream::Magnetometer => self.mag_accuracy = sample.accuracy,
        }

        if let Some(synced) = self.synchronizer.ingest(stream, sample) {
            self.sink.enqueue(self.to_imu_data(synced));
        }
    }

    /// Record the IMU placement in the device coordinate system. One-shot:
    /// later reports are ignored, matching the platform contract.
    pub fn set_placement(&mut self, translation: [f32; 3]) {
        if self.placement.is_none() {
            self.placement = Some(translation);
        }
    }

    /// Emit the session-level inertial descriptor. Call once per session,
    /// right after the sink has started.
    pub fn announce(&self) {
        let mut info = ImuInfo {
            gyro_info: self.descriptors.gyro.info.clone(),
            gyro_resolution: self.descriptors.gyro.resolution,
            accel_info: self.descriptors.accel.info.clone(),
            accel_resolution: self.descriptors.accel.resolution,
            sample_frequency: self.sample_frequency_hz(),
            ..Default::default()
        };
        if let Some(mag) = &self.descriptors.mag {
            info.mag_info = mag.info.clone();
            info.mag_resolution = mag.resolution;
        }
        if let Some(placement) = self.placement {
            info.placement = placement.to_vec();
        }
        self.sink.enqueue(info);
    }

    /// Estimated accelerometer sampling frequency in Hz, 0 until two
    /// samples have arrived.
    pub fn sample_frequency_hz(&self) -> f32 {
        if self.estimated_interval_ns <= 0 {
            0.0
        } else {
            1e9 / self.estimated_interval_ns as f32
        }
    }

    // Exponential smoothing with a 1/8 gain, cheap enough for the hot path.
    fn update_rate_estimate(&mut self, timestamp_ns: i64) {
        if self.prev_accel_ns != 0 {
            let diff = timestamp_ns - self.prev_accel_ns;
            self.estimated_interval_ns += (diff - self.estimated_interval_ns) >> 3;
        }
        self.prev_accel_ns = timestamp_ns;
    }

    fn to_imu_data(&self, synced: SyncedSample) -> ImuData {
        let (gyro, gyro_drift) = split_bias(synced.gyro);
        let (accel, accel_bias) = split_bias(synced.accel);
        let (mag, mag_bias) = match synced.mag {
            Some(values) => split_bias(values),
            None => (Vec::new(), Vec::new()),
        };
        ImuData {
            time_ns: synced.timestamp_ns,
            gyro,
            accel,
            mag,
            gyro_drift,
            accel_bias,
            mag_bias,
            gyro_accuracy: self.gyro_accuracy as i32,
            accel_accuracy: self.accel_accuracy as i32,
            mag_accuracy: self.mag_accuracy as i32,
        }
    }
}

// Uncalibrated sensors report [x, y, z, bx, by, bz]; calibrated ones just
// [x, y, z].
fn split_bias(mut values: Vec<f32>) -> (Vec<f32>, Vec<f32>) {
    if values.len() >= 6 {
        let bias = values.split_off(3);
        (values, bias)
    } else {
        (values, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontend() -> SensorFrontend {
        let config = SynchronizerConfig {
            track_magnetometer: false,
            ..Default::default()
        };
        SensorFrontend::new(
            Arc::new(RecordingSink::with_defaults()),
            &config,
            InertialDescriptors::default(),
        )
    }

    #[test]
    fn rate_estimate_converges_to_interval() {
        let mut fe = frontend();
        for i in 0..200 {
            fe.on_sample(
                SensorStream::Accelerometer,
                RawSample::new(i * 10_000_000, vec![0.0; 3]),
            );
        }
        let hz = fe.sample_frequency_hz();
        assert!((hz - 100.0).abs() < 1.0, "estimated {hz} Hz");
    }

    #[test]
    fn split_bias_handles_uncalibrated_samples() {
        let (values, bias) = split_bias(vec![1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(bias, vec![0.1, 0.2, 0.3]);

        let (values, bias) = split_bias(vec![1.0, 2.0, 3.0]);
        assert_eq!(values.len(), 3);
        assert!(bias.is_empty());
    }

    #[test]
    fn placement_is_one_shot() {
        let mut fe = frontend();
        fe.set_placement([0.1, 0.2, 0.3]);
        fe.set_placement([9.0, 9.0, 9.0]);
        assert_eq!(fe.placement, Some([0.1, 0.2, 0.3]));
    }
}
