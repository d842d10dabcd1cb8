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

// Synchronized video + IMU capture recorder
//
// This is the recording core for camera-IMU capture rigs. It:
// - Interpolates accelerometer/magnetometer samples onto gyroscope timestamps
// - Pairs per-frame capture metadata with encoder presentation timestamps
// - Funnels all records through one bounded queue into a single writer thread
// - Serializes to a self-delimiting protobuf stream readable without an index
//
// The surrounding application supplies the platform side: camera pipeline,
// encoder, sensor callbacks and the control plane issuing start/stop.

pub mod config;
pub mod error;
pub mod frame_merge;
pub mod proto;
pub mod recorder;
pub mod sample;
pub mod sensors;
pub mod sync;
pub mod writer;

// Re-export main types
pub use config::{load_config, load_config_with_env, RecorderConfig};
pub use error::RecorderError;
pub use frame_merge::FrameJoiner;
pub use recorder::{RecordingMessage, RecordingSink, RecordingState, WriterSummary};
pub use sample::{RawSample, SensorStream, SyncedSample};
pub use sensors::{InertialDescriptors, SensorDescriptor, SensorFrontend};
pub use sync::InertialSynchronizer;
pub use writer::{read_capture_file, CaptureFileWriter};
