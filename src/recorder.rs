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

// Recording sink: single authoritative writer of the durable output.
//
// Producers on any thread enqueue tagged messages into one bounded
// channel; a dedicated writer thread is the sole consumer and the only
// code allowed to touch the output file. A full queue blocks the
// producer (backpressure) instead of dropping data. Shutdown is a
// sentinel message, so every record enqueued before `stop` reaches the
// file before it closes.

use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info, trace};

use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::frame_merge::FrameJoiner;
use crate::proto::{CameraInfo, FrameMetadata, FrameToTimestamp, ImuData, ImuInfo};
use crate::writer::CaptureFileWriter;

const IDLE: u8 = 0;
const RECORDING: u8 = 1;
const CLOSING: u8 = 2;
const FAILED: u8 = 3;

/// Sink lifecycle. `Failed` is entered by the writer thread on a storage
/// error and cleared when the control plane acknowledges it via `stop`
/// or `wait_idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
    Closing,
    Failed,
}

fn state_from(raw: u8) -> RecordingState {
    match raw {
        RECORDING => RecordingState::Recording,
        CLOSING => RecordingState::Closing,
        FAILED => RecordingState::Failed,
        _ => RecordingState::Idle,
    }
}

/// Unit of cross-thread transfer into the writer thread.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingMessage {
    ImuSample(ImuData),
    ImuDescriptor(ImuInfo),
    CameraDescriptor(CameraInfo),
    FrameMetadata(FrameMetadata),
    FrameTimestamp(FrameToTimestamp),
    /// Sentinel: flush and close the file, then terminate the writer.
    Shutdown,
}

impl From<ImuData> for RecordingMessage {
    fn from(data: ImuData) -> Self {
        Self::ImuSample(data)
    }
}

impl From<ImuInfo> for RecordingMessage {
    fn from(info: ImuInfo) -> Self {
        Self::ImuDescriptor(info)
    }
}

impl From<CameraInfo> for RecordingMessage {
    fn from(info: CameraInfo) -> Self {
        Self::CameraDescriptor(info)
    }
}

impl From<FrameMetadata> for RecordingMessage {
    fn from(meta: FrameMetadata) -> Self {
        Self::FrameMetadata(meta)
    }
}

impl From<FrameToTimestamp> for RecordingMessage {
    fn from(time: FrameToTimestamp) -> Self {
        Self::FrameTimestamp(time)
    }
}

/// Final accounting for a closed session.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterSummary {
    pub path: PathBuf,
    pub records_written: u64,
    pub bytes_written: u64,
    pub frames_merged: u64,
}

type WriterHandle = JoinHandle<Result<WriterSummary, RecorderError>>;

pub struct RecordingSink {
    config: RecorderConfig,
    state: Arc<AtomicU8>,
    tx: Mutex<Option<Sender<RecordingMessage>>>,
    writer: Mutex<Option<WriterHandle>>,
}

impl RecordingSink {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            state: Arc::new(AtomicU8::new(IDLE)),
            tx: Mutex::new(None),
            writer: Mutex::new(None),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RecorderConfig::default())
    }

    pub fn state(&self) -> RecordingState {
        state_from(self.state.load(Ordering::Acquire))
    }

    pub fn is_recording(&self) -> bool {
        self.state.load(Ordering::Acquire) == RECORDING
    }

    /// Open the output file, write the session header and spawn the writer
    /// thread. Only legal from `Idle`; calling it in any other state is a
    /// caller error.
    pub fn start<P: AsRef<Path>>(&self, path: P) -> Result<(), RecorderError> {
        if let Err(actual) =
            self.state
                .compare_exchange(IDLE, RECORDING, Ordering::AcqRel, Ordering::Acquire)
        {
            return Err(RecorderError::AlreadyRecording(state_from(actual)));
        }

        let file = match CaptureFileWriter::create(path.as_ref()) {
            Ok(file) => file,
            Err(e) => {
                self.state.store(IDLE, Ordering::Release);
                return Err(e);
            }
        };

        let (tx, rx) = bounded(self.config.sink.queue_capacity);
        let joiner = FrameJoiner::from_config(&self.config.frame_matching);
        let state = Arc::clone(&self.state);
        let handle = match thread::Builder::new()
            .name("recording-writer".into())
            .spawn(move || writer_loop(rx, file, joiner, state))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.state.store(IDLE, Ordering::Release);
                return Err(RecorderError::storage(path.as_ref(), e));
            }
        };

        *self.lock_tx() = Some(tx);
        *self.lock_writer() = Some(handle);
        info!(path = %path.as_ref().display(), "recording started");
        Ok(())
    }

    /// Hand a message to the writer thread.
    ///
    /// Blocks the calling producer while the queue is full. Outside of
    /// `Recording` the message is silently discarded; nothing is buffered
    /// between sessions.
    pub fn enqueue<M: Into<RecordingMessage>>(&self, message: M) {
        if self.state.load(Ordering::Acquire) != RECORDING {
            trace!("not recording, discarding message");
            return;
        }
        let sender = self.lock_tx().clone();
        let Some(sender) = sender else { return };
        if sender.send(message.into()).is_err() {
            // Receiver is gone: the writer aborted on a storage failure.
            debug!("recording queue disconnected, message dropped");
        }
    }

    /// Request shutdown: enqueue the sentinel and return immediately
    /// without waiting for the file to close (`wait_idle` provides the
    /// synchronous guarantee).
    ///
    /// If the writer already aborted on a storage failure, this joins it
    /// and surfaces the terminal error.
    pub fn stop(&self) -> Result<(), RecorderError> {
        match self
            .state
            .compare_exchange(RECORDING, CLOSING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                let sender = self.lock_tx().take();
                if let Some(sender) = sender {
                    // Blocks only while the queue is full, like any producer.
                    let _ = sender.send(RecordingMessage::Shutdown);
                }
                info!("recording stop requested");
                Ok(())
            }
            Err(FAILED) => {
                self.lock_tx().take();
                self.wait_idle().map(|_| ())
            }
            Err(_) => Err(RecorderError::NotRecording),
        }
    }

    /// `stop` plus a synchronous wait for the file to be flushed and
    /// closed.
    pub fn stop_and_wait(&self) -> Result<WriterSummary, RecorderError> {
        self.stop()?;
        self.wait_idle()
    }

    /// Join the writer thread and surface its terminal result. Valid after
    /// `stop`, or at any point to block until the current session ends.
    pub fn wait_idle(&self) -> Result<WriterSummary, RecorderError> {
        let handle = self.lock_writer().take();
        let Some(handle) = handle else {
            return Err(RecorderError::NotRecording);
        };
        let result = handle.join().map_err(|_| RecorderError::WriterPanicked);
        self.state.store(IDLE, Ordering::Release);
        self.lock_tx().take();
        result?
    }

    fn lock_tx(&self) -> std::sync::MutexGuard<'_, Option<Sender<RecordingMessage>>> {
        self.tx.lock().expect("sender mutex poisoned")
    }

    fn lock_writer(&self) -> std::sync::MutexGuard<'_, Option<WriterHandle>> {
        self.writer.lock().expect("writer mutex poisoned")
    }
}

fn writer_loop(
    rx: Receiver<RecordingMessage>,
    file: CaptureFileWriter,
    joiner: FrameJoiner,
    state: Arc<AtomicU8>,
) -> Result<WriterSummary, RecorderError> {
    debug!("recording writer thread running");
    let result = drain_queue(rx, file, joiner);
    match &result {
        Ok(summary) => {
            state.store(IDLE, Ordering::Release);
            info!(
                records = summary.records_written,
                bytes = summary.bytes_written,
                frames = summary.frames_merged,
                "recording closed"
            );
        }
        Err(e) => {
            state.store(FAILED, Ordering::Release);
            error!(error = %e, "recording aborted on storage failure");
        }
    }
    result
}

// Sole consumer of the queue and sole owner of the file. A storage error
// aborts the session: the file is dropped (closed) and the error travels
// back through the join handle.
fn drain_queue(
    rx: Receiver<RecordingMessage>,
    mut file: CaptureFileWriter,
    mut joiner: FrameJoiner,
) -> Result<WriterSummary, RecorderError> {
    loop {
        // A disconnect without a sentinel means the sink was dropped
        // mid-session; close the file cleanly either way.
        let message = rx.recv().unwrap_or(RecordingMessage::Shutdown);
        match message {
            RecordingMessage::Shutdown => break,
            RecordingMessage::ImuSample(data) => file.append_imu(data)?,
            RecordingMessage::ImuDescriptor(info) => file.append_imu_meta(info)?,
            RecordingMessage::CameraDescriptor(info) => file.append_camera_meta(info)?,
            RecordingMessage::FrameMetadata(meta) => {
                for merged in joiner.push_metadata(meta) {
                    file.append_frame(merged)?;
                }
            }
            RecordingMessage::FrameTimestamp(time) => {
                for merged in joiner.push_timestamp(time) {
                    file.append_frame(merged)?;
                }
            }
        }
    }

    let (pending_meta, pending_time) = joiner.pending();
    if pending_meta + pending_time > 0 {
        debug!(pending_meta, pending_time, "unmatched frame events at shutdown");
    }

    let frames_merged = joiner.merged_count();
    let path = file.path().to_path_buf();
    let (records_written, bytes_written) = file.finish()?;
    Ok(WriterSummary {
        path,
        records_written,
        bytes_written,
        frames_merged,
    })
}
