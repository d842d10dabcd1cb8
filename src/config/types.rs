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

// Configuration types for capture-recorder

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecorderConfig {
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub synchronizer: SynchronizerConfig,
    #[serde(default)]
    pub frame_matching: FrameMatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recording sink settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkConfig {
    /// Bounded queue capacity; a full queue blocks producers.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Inertial stream synchronizer settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynchronizerConfig {
    /// Gyro timestamps within this distance of an auxiliary sample skip
    /// interpolation and reuse the sample verbatim.
    #[serde(default = "default_interpolation_resolution_ns")]
    pub interpolation_resolution_ns: i64,

    /// Whether the magnetometer stream participates in synchronization.
    #[serde(default = "default_track_magnetometer")]
    pub track_magnetometer: bool,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            interpolation_resolution_ns: default_interpolation_resolution_ns(),
            track_magnetometer: default_track_magnetometer(),
        }
    }
}

/// Frame metadata joiner settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameMatchConfig {
    /// Metadata and encoder timestamps closer than this are the same frame.
    #[serde(default = "default_match_tolerance_ns")]
    pub tolerance_ns: i64,

    /// Bound on each pending queue under sustained mismatch.
    #[serde(default = "default_pending_capacity")]
    pub pending_capacity: usize,
}

impl Default for FrameMatchConfig {
    fn default() -> Self {
        Self {
            tolerance_ns: default_match_tolerance_ns(),
            pending_capacity: default_pending_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"

    #[serde(default = "default_log_format")]
    pub format: String, // "text", "json"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_queue_capacity() -> usize { 1000 }
fn default_interpolation_resolution_ns() -> i64 { 500 }
fn default_track_magnetometer() -> bool { true }
fn default_match_tolerance_ns() -> i64 { 10_000 }
fn default_pending_capacity() -> usize { 100 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "text".to_string() }
