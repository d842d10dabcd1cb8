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

// Inertial stream synchronizer.
//
// The gyroscope is the reference clock: every accepted gyroscope event
// yields exactly one synchronized sample, with the accelerometer (and the
// magnetometer, when tracked) linearly interpolated onto its timestamp.
// All state is touched by the single sensor-event thread, so the type
// carries no internal synchronization.

use std::collections::VecDeque;

use tracing::warn;

use crate::config::SynchronizerConfig;
use crate::sample::{RawSample, SensorStream, SyncedSample};

pub struct InertialSynchronizer {
    /// Gyro timestamps within this distance of an auxiliary sample reuse
    /// that sample's values verbatim instead of interpolating.
    resolution_ns: i64,
    track_mag: bool,
    gyro: VecDeque<RawSample>,
    accel: VecDeque<RawSample>,
    mag: VecDeque<RawSample>,
}

impl InertialSynchronizer {
    pub fn new(resolution_ns: i64, track_mag: bool) -> Self {
        Self {
            resolution_ns,
            track_mag,
            gyro: VecDeque::new(),
            accel: VecDeque::new(),
            mag: VecDeque::new(),
        }
    }

    pub fn from_config(config: &SynchronizerConfig) -> Self {
        Self::new(
            config.interpolation_resolution_ns,
            config.track_magnetometer,
        )
    }

    /// Append `sample` to its stream buffer. Only gyroscope ingestion runs a
    /// matching attempt; auxiliary samples are buffered until a gyroscope
    /// event brackets them.
    ///
    /// Returns a synchronized sample when the oldest buffered gyroscope
    /// event resolves against every tracked auxiliary stream.
    pub fn ingest(&mut self, stream: SensorStream, sample: RawSample) -> Option<SyncedSample> {
        match stream {
            SensorStream::Accelerometer => {
                self.accel.push_back(sample);
                None
            }
            SensorStream::Magnetometer => {
                self.mag.push_back(sample);
                None
            }
            SensorStream::Gyroscope => {
                self.gyro.push_back(sample);
                self.try_sync()
            }
        }
    }

    /// Number of buffered samples for `stream`.
    pub fn buffered(&self, stream: SensorStream) -> usize {
        match stream {
            SensorStream::Gyroscope => self.gyro.len(),
            SensorStream::Accelerometer => self.accel.len(),
            SensorStream::Magnetometer => self.mag.len(),
        }
    }

    // One matching attempt against the oldest gyro sample. Insufficient
    // data is the normal steady state between bursts, not an error.
    fn try_sync(&mut self) -> Option<SyncedSample> {
        if self.gyro.is_empty()
            || self.accel.len() < 2
            || (self.track_mag && self.mag.len() < 2)
        {
            return None;
        }

        let gyro_ts = self.gyro.front()?.timestamp_ns;

        // Gyro sample predates all auxiliary history: it can never be
        // bracketed, so it is dropped.
        if gyro_ts < self.accel.front()?.timestamp_ns
            || (self.track_mag && gyro_ts < self.mag.front()?.timestamp_ns)
        {
            warn!(timestamp_ns = gyro_ts, "gyro sample predates auxiliary data, dropping it");
            self.gyro.pop_front();
            return None;
        }

        // Gyro sample is newer than an entire auxiliary window: everything
        // but the newest auxiliary sample is stale. Keep that one as the
        // future left bracket and wait for more data.
        if gyro_ts > self.accel.back()?.timestamp_ns {
            trim_stale(SensorStream::Accelerometer, &mut self.accel);
            return None;
        }
        if self.track_mag && gyro_ts > self.mag.back()?.timestamp_ns {
            trim_stale(SensorStream::Magnetometer, &mut self.mag);
            return None;
        }

        let accel = Self::resolve_at(&mut self.accel, gyro_ts, self.resolution_ns);
        let mag = if self.track_mag {
            Some(Self::resolve_at(&mut self.mag, gyro_ts, self.resolution_ns))
        } else {
            None
        };

        let gyro = self.gyro.pop_front()?;
        Some(SyncedSample {
            timestamp_ns: gyro.timestamp_ns,
            gyro: gyro.values,
            accel,
            mag,
        })
    }

    // Resolve the auxiliary value at `at_ns` and prune samples strictly
    // older than the left bracket. The caller guarantees
    // front().timestamp_ns <= at_ns <= back().timestamp_ns.
    fn resolve_at(buf: &mut VecDeque<RawSample>, at_ns: i64, resolution_ns: i64) -> Vec<f32> {
        let mut left = 0;
        let mut right = None;
        for (i, sample) in buf.iter().enumerate() {
            if sample.timestamp_ns <= at_ns {
                left = i;
            } else {
                right = Some(i);
                break;
            }
        }

        let left_ts = buf[left].timestamp_ns;
        let values = if at_ns - left_ts <= resolution_ns {
            buf[left].values.clone()
        } else {
            match right {
                Some(r) if buf[r].timestamp_ns - at_ns <= resolution_ns => buf[r].values.clone(),
                Some(r) => {
                    let right_ts = buf[r].timestamp_ns;
                    let ratio = (at_ns - left_ts) as f32 / (right_ts - left_ts) as f32;
                    buf[left]
                        .values
                        .iter()
                        .zip(&buf[r].values)
                        .map(|(l, r)| l + (r - l) * ratio)
                        .collect()
                }
                // at_ns == back().timestamp_ns is already handled by the
                // left-verbatim branch; nothing newer exists otherwise.
                None => buf[left].values.clone(),
            }
        };

        while buf.front().is_some_and(|s| s.timestamp_ns < left_ts) {
            buf.pop_front();
        }

        values
    }
}

// Drop everything but the newest sample; it becomes the left bracket once
// newer data arrives.
fn trim_stale(stream: SensorStream, buf: &mut VecDeque<RawSample>) {
    let dropped = buf.len() - 1;
    if let Some(newest) = buf.pop_back() {
        buf.clear();
        buf.push_back(newest);
    }
    warn!(
        stream = stream.label(),
        dropped, "gyro ahead of auxiliary window, dropping stale samples"
    );
}
