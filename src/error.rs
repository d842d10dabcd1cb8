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

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::recorder::RecordingState;

/// Errors surfaced to the control plane.
///
/// `AlreadyRecording` and `NotRecording` are caller precondition
/// violations; `Storage` is a terminal recording failure that aborts the
/// session and leaves the sink ready for a fresh `start`.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("recording already in progress (state: {0:?})")]
    AlreadyRecording(RecordingState),

    #[error("no recording in progress")]
    NotRecording,

    #[error("storage failure on '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed recording file: {0}")]
    MalformedFile(#[from] prost::DecodeError),

    #[error("recording writer thread panicked")]
    WriterPanicked,
}

impl RecorderError {
    pub(crate) fn storage(path: &Path, source: io::Error) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            source,
        }
    }
}
