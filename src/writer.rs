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

// Durable output file framing.
//
// The file opens with a session header carrying the wall-clock start
// time, then every record is appended as a `CaptureRecord` with exactly
// one field populated. Protobuf top-level concatenation is the framing:
// decoding the whole file merges the pieces back into one `CaptureRecord`
// with repeated fields in write order, so readers need no index.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use prost::Message;
use tracing::info;

use crate::error::RecorderError;
use crate::proto::{CameraInfo, CaptureRecord, FrameMetadata, ImuData, ImuInfo};

/// Append-only writer for one recording session. Owned exclusively by the
/// recording writer thread for the lifetime of the file.
#[derive(Debug)]
pub struct CaptureFileWriter {
    out: BufWriter<File>,
    path: PathBuf,
    records_written: u64,
    bytes_written: u64,
}

impl CaptureFileWriter {
    /// Create the output file and write the session header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, RecorderError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| RecorderError::storage(&path, e))?;
        let mut writer = Self {
            out: BufWriter::new(file),
            path,
            records_written: 0,
            bytes_written: 0,
        };
        writer.write_session_header()?;
        info!(path = %writer.path.display(), "recording file created");
        Ok(writer)
    }

    fn write_session_header(&mut self) -> Result<(), RecorderError> {
        let now = Utc::now();
        self.append(CaptureRecord {
            time: Some(prost_types::Timestamp {
                seconds: now.timestamp(),
                nanos: now.timestamp_subsec_nanos() as i32,
            }),
            ..Default::default()
        })
    }

    fn append(&mut self, record: CaptureRecord) -> Result<(), RecorderError> {
        let encoded = record.encode_to_vec();
        self.out
            .write_all(&encoded)
            .map_err(|e| RecorderError::storage(&self.path, e))?;
        self.bytes_written += encoded.len() as u64;
        Ok(())
    }

    pub fn append_imu(&mut self, data: ImuData) -> Result<(), RecorderError> {
        self.records_written += 1;
        self.append(CaptureRecord {
            imu: vec![data],
            ..Default::default()
        })
    }

    pub fn append_frame(&mut self, meta: FrameMetadata) -> Result<(), RecorderError> {
        self.records_written += 1;
        self.append(CaptureRecord {
            video_meta: vec![meta],
            ..Default::default()
        })
    }

    pub fn append_imu_meta(&mut self, info: ImuInfo) -> Result<(), RecorderError> {
        self.records_written += 1;
        self.append(CaptureRecord {
            imu_meta: Some(info),
            ..Default::default()
        })
    }

    pub fn append_camera_meta(&mut self, info: CameraInfo) -> Result<(), RecorderError> {
        self.records_written += 1;
        self.append(CaptureRecord {
            camera_meta: Some(info),
            ..Default::default()
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered records to disk and close the file.
    ///
    /// Returns (records written, bytes written), the session header
    /// excluded from the record count.
    pub fn finish(mut self) -> Result<(u64, u64), RecorderError> {
        self.out
            .flush()
            .map_err(|e| RecorderError::storage(&self.path, e))?;
        self.out
            .get_ref()
            .sync_all()
            .map_err(|e| RecorderError::storage(&self.path, e))?;
        info!(
            path = %self.path.display(),
            records = self.records_written,
            bytes = self.bytes_written,
            "recording file closed"
        );
        Ok((self.records_written, self.bytes_written))
    }
}

/// Decode a closed recording file back into a single merged record.
pub fn read_capture_file<P: AsRef<Path>>(path: P) -> Result<CaptureRecord, RecorderError> {
    let path = path.as_ref();
    let buf = std::fs::read(path).map_err(|e| RecorderError::storage(path, e))?;
    Ok(CaptureRecord::decode(buf.as_slice())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.capture");

        let mut writer = CaptureFileWriter::create(&path).unwrap();
        writer
            .append_imu(ImuData {
                time_ns: 123,
                gyro: vec![0.1, 0.2, 0.3],
                ..Default::default()
            })
            .unwrap();
        writer
            .append_frame(FrameMetadata {
                time_ns: 456,
                frame_number: 1,
                ..Default::default()
            })
            .unwrap();
        let (records, bytes) = writer.finish().unwrap();
        assert_eq!(records, 2);
        assert!(bytes > 0);

        let record = read_capture_file(&path).unwrap();
        assert!(record.time.is_some());
        assert_eq!(record.imu.len(), 1);
        assert_eq!(record.video_meta.len(), 1);
        assert_eq!(record.video_meta[0].frame_number, 1);
    }

    #[test]
    fn create_fails_in_missing_directory() {
        let err = CaptureFileWriter::create("/nonexistent-dir/session.capture").unwrap_err();
        assert!(matches!(err, RecorderError::Storage { .. }));
    }
}
