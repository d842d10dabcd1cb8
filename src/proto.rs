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

// On-disk recording schema, hand-written with prost derive.
//
// `proto/recording.proto` documents the same schema for non-Rust readers;
// the structs here are the source of truth and must keep their tags stable.
// A recording file is a session-header `CaptureRecord` followed by one
// `CaptureRecord` per event, each with a single field populated, written
// back to back. Protobuf merge semantics on decode turn the concatenation
// into one `CaptureRecord` whose repeated fields preserve write order.

/// Platform-reported confidence for a sensor stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SensorAccuracy {
    Unreliable = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

/// Axis-aligned pixel rectangle on the camera sensor.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Rect {
    #[prost(int32, tag = "1")]
    pub left: i32,
    #[prost(int32, tag = "2")]
    pub top: i32,
    #[prost(int32, tag = "3")]
    pub width: i32,
    #[prost(int32, tag = "4")]
    pub height: i32,
}

/// One synchronized inertial sample, stamped with the source gyroscope
/// timestamp. Bias/drift fields are present only for uncalibrated sensors.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImuData {
    #[prost(int64, tag = "1")]
    pub time_ns: i64,
    #[prost(float, repeated, tag = "2")]
    pub gyro: Vec<f32>,
    #[prost(float, repeated, tag = "3")]
    pub accel: Vec<f32>,
    #[prost(float, repeated, tag = "4")]
    pub mag: Vec<f32>,
    #[prost(float, repeated, tag = "5")]
    pub gyro_drift: Vec<f32>,
    #[prost(float, repeated, tag = "6")]
    pub accel_bias: Vec<f32>,
    #[prost(float, repeated, tag = "7")]
    pub mag_bias: Vec<f32>,
    #[prost(enumeration = "SensorAccuracy", tag = "8")]
    pub gyro_accuracy: i32,
    #[prost(enumeration = "SensorAccuracy", tag = "9")]
    pub accel_accuracy: i32,
    #[prost(enumeration = "SensorAccuracy", tag = "10")]
    pub mag_accuracy: i32,
}

/// Session-level inertial sensor descriptor, written once per recording.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ImuInfo {
    #[prost(string, tag = "1")]
    pub gyro_info: String,
    #[prost(float, tag = "2")]
    pub gyro_resolution: f32,
    #[prost(string, tag = "3")]
    pub accel_info: String,
    #[prost(float, tag = "4")]
    pub accel_resolution: f32,
    #[prost(string, tag = "5")]
    pub mag_info: String,
    #[prost(float, tag = "6")]
    pub mag_resolution: f32,
    /// Estimated sampling frequency in Hz.
    #[prost(float, tag = "7")]
    pub sample_frequency: f32,
    /// IMU translation in the device coordinate system, if reported.
    #[prost(float, repeated, tag = "8")]
    pub placement: Vec<f32>,
}

/// Session-level camera descriptor, written once per recording.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CameraInfo {
    #[prost(bool, tag = "1")]
    pub optical_image_stabilization: bool,
    #[prost(bool, tag = "2")]
    pub video_stabilization: bool,
    #[prost(bool, tag = "3")]
    pub distortion_correction: bool,
    /// Clockwise rotation from device natural orientation, degrees.
    #[prost(int32, tag = "4")]
    pub sensor_orientation: i32,
    /// [fx, fy, cx, cy, s] as reported by the lens calibration.
    #[prost(float, repeated, tag = "5")]
    pub intrinsic_calibration: Vec<f32>,
    /// [k1, k2, k3, p1, p2] radial/tangential distortion.
    #[prost(float, repeated, tag = "6")]
    pub distortion_params: Vec<f32>,
    #[prost(float, repeated, tag = "7")]
    pub lens_pose_translation: Vec<f32>,
    #[prost(float, repeated, tag = "8")]
    pub lens_pose_rotation: Vec<f32>,
    #[prost(message, optional, tag = "9")]
    pub active_array: Option<Rect>,
    #[prost(message, optional, tag = "10")]
    pub pre_correction_active_array: Option<Rect>,
    #[prost(int32, tag = "11")]
    pub video_width: i32,
    #[prost(int32, tag = "12")]
    pub video_height: i32,
}

/// Lens-shift sample from the optical image stabilizer.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct OisSample {
    #[prost(int64, tag = "1")]
    pub time_ns: i64,
    #[prost(float, tag = "2")]
    pub x_shift: f32,
    #[prost(float, tag = "3")]
    pub y_shift: f32,
}

/// Per-frame capture metadata. `frame_number` is zero until the frame has
/// been paired with its encoder timestamp event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FrameMetadata {
    /// Start-of-exposure sensor timestamp.
    #[prost(int64, tag = "1")]
    pub time_ns: i64,
    #[prost(int64, tag = "2")]
    pub frame_number: i64,
    #[prost(int64, tag = "3")]
    pub exposure_time_ns: i64,
    #[prost(int64, tag = "4")]
    pub frame_duration_ns: i64,
    /// Rolling shutter readout time.
    #[prost(int64, tag = "5")]
    pub frame_readout_ns: i64,
    #[prost(int32, tag = "6")]
    pub iso: i32,
    #[prost(float, tag = "7")]
    pub focal_length_mm: f32,
    #[prost(float, tag = "8")]
    pub est_focal_length_pix: f32,
    #[prost(float, tag = "9")]
    pub focus_distance_diopters: f32,
    #[prost(message, optional, tag = "10")]
    pub crop_region: Option<Rect>,
    #[prost(message, repeated, tag = "11")]
    pub ois_samples: Vec<OisSample>,
}

/// Encoder-side frame number to presentation time mapping.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct FrameToTimestamp {
    #[prost(int64, tag = "1")]
    pub frame_number: i64,
    #[prost(int64, tag = "2")]
    pub time_us: i64,
}

/// Top-level container. The whole recording file decodes into one of these.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CaptureRecord {
    /// Wall-clock recording start time, set only in the session header.
    #[prost(message, optional, tag = "1")]
    pub time: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub imu_meta: Option<ImuInfo>,
    #[prost(message, optional, tag = "3")]
    pub camera_meta: Option<CameraInfo>,
    #[prost(message, repeated, tag = "4")]
    pub imu: Vec<ImuData>,
    #[prost(message, repeated, tag = "5")]
    pub video_meta: Vec<FrameMetadata>,
}
