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

// Timestamped sample types shared by the synchronizer and the sensor frontend.

use crate::proto::SensorAccuracy;

/// The three inertial streams the synchronizer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorStream {
    Gyroscope,
    Accelerometer,
    Magnetometer,
}

impl SensorStream {
    pub fn label(&self) -> &'static str {
        match self {
            SensorStream::Gyroscope => "gyro",
            SensorStream::Accelerometer => "accel",
            SensorStream::Magnetometer => "mag",
        }
    }
}

/// A single platform sensor event. Uncalibrated sensors deliver six
/// components (value + bias estimate per axis), calibrated ones three.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Monotonic sensor-clock timestamp.
    pub timestamp_ns: i64,
    pub values: Vec<f32>,
    pub accuracy: SensorAccuracy,
}

impl RawSample {
    pub fn new(timestamp_ns: i64, values: Vec<f32>) -> Self {
        Self {
            timestamp_ns,
            values,
            accuracy: SensorAccuracy::High,
        }
    }

    pub fn with_accuracy(timestamp_ns: i64, values: Vec<f32>, accuracy: SensorAccuracy) -> Self {
        Self {
            timestamp_ns,
            values,
            accuracy,
        }
    }
}

/// One inertial sample per accepted gyroscope event, with the auxiliary
/// streams interpolated onto the gyroscope timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedSample {
    /// Always the timestamp of the consumed gyroscope sample.
    pub timestamp_ns: i64,
    pub gyro: Vec<f32>,
    pub accel: Vec<f32>,
    /// Present only when the magnetometer stream is tracked.
    pub mag: Option<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_labels_are_stable() {
        // Log events key on these names; renaming them breaks downstream
        // log filters.
        assert_eq!(SensorStream::Gyroscope.label(), "gyro");
        assert_eq!(SensorStream::Accelerometer.label(), "accel");
        assert_eq!(SensorStream::Magnetometer.label(), "mag");
    }
}
