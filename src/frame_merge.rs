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

// Frame metadata joiner.
//
// Capture metadata (camera clock, nanoseconds) and encoder frame
// timestamps (microseconds) for the same physical frame arrive on
// independent threads. Both streams are monotonically increasing per
// source, so once a queue head falls more than the tolerance behind the
// other queue's head it can never match anything and is discarded eagerly.
// The joiner runs entirely on the recording writer thread.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::config::FrameMatchConfig;
use crate::proto::{FrameMetadata, FrameToTimestamp};

pub struct FrameJoiner {
    tolerance_ns: i64,
    capacity: usize,
    pending_meta: VecDeque<FrameMetadata>,
    pending_time: VecDeque<FrameToTimestamp>,
    merged: u64,
}

impl FrameJoiner {
    pub fn new(tolerance_ns: i64, capacity: usize) -> Self {
        Self {
            tolerance_ns,
            capacity,
            pending_meta: VecDeque::new(),
            pending_time: VecDeque::new(),
            merged: 0,
        }
    }

    pub fn from_config(config: &FrameMatchConfig) -> Self {
        Self::new(config.tolerance_ns, config.pending_capacity)
    }

    /// Queue capture metadata and return every merged record it unlocks.
    pub fn push_metadata(&mut self, meta: FrameMetadata) -> Vec<FrameMetadata> {
        if self.pending_meta.len() == self.capacity {
            warn!(capacity = self.capacity, "pending frame metadata full, discarding oldest");
            self.pending_meta.pop_front();
        }
        self.pending_meta.push_back(meta);
        self.try_match()
    }

    /// Queue an encoder frame timestamp and return every merged record it
    /// unlocks.
    pub fn push_timestamp(&mut self, time: FrameToTimestamp) -> Vec<FrameMetadata> {
        if self.pending_time.len() == self.capacity {
            warn!(capacity = self.capacity, "pending frame timestamps full, discarding oldest");
            self.pending_time.pop_front();
        }
        self.pending_time.push_back(time);
        self.try_match()
    }

    /// (pending metadata, pending timestamps) still waiting for a partner.
    pub fn pending(&self) -> (usize, usize) {
        (self.pending_meta.len(), self.pending_time.len())
    }

    /// Total merged records emitted so far.
    pub fn merged_count(&self) -> u64 {
        self.merged
    }

    fn try_match(&mut self) -> Vec<FrameMetadata> {
        let mut out = Vec::new();
        loop {
            let (meta_ns, time_ns) = match (self.pending_meta.front(), self.pending_time.front()) {
                (Some(meta), Some(time)) => (meta.time_ns, time.time_us * 1000),
                _ => break,
            };

            let diff_ns = time_ns - meta_ns;
            if diff_ns.abs() <= self.tolerance_ns {
                // Same physical frame: attach the encoder frame number to
                // the metadata and consume both entries.
                let time = self.pending_time.pop_front();
                let meta = self.pending_meta.pop_front();
                if let (Some(mut meta), Some(time)) = (meta, time) {
                    meta.frame_number = time.frame_number;
                    self.merged += 1;
                    out.push(meta);
                }
            } else if diff_ns > self.tolerance_ns {
                debug!(time_ns = meta_ns, diff_ns, "frame metadata too old to match, skipping");
                self.pending_meta.pop_front();
            } else {
                debug!(time_ns, diff_ns, "frame timestamp too old to match, skipping");
                self.pending_time.pop_front();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(time_ns: i64) -> FrameMetadata {
        FrameMetadata {
            time_ns,
            iso: 400,
            ..Default::default()
        }
    }

    fn time(frame_number: i64, time_us: i64) -> FrameToTimestamp {
        FrameToTimestamp {
            frame_number,
            time_us,
        }
    }

    #[test]
    fn matches_within_tolerance() {
        let mut joiner = FrameJoiner::new(10_000, 100);
        assert!(joiner.push_metadata(meta(100_000)).is_empty());
        let merged = joiner.push_timestamp(time(7, 105));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].frame_number, 7);
        assert_eq!(merged[0].time_ns, 100_000);
        assert_eq!(joiner.pending(), (0, 0));
    }

    #[test]
    fn unit_conversion_is_exact() {
        let mut joiner = FrameJoiner::new(10_000, 100);
        joiner.push_metadata(meta(2_000_000));
        // 2000 us == 2_000_000 ns, diff is zero.
        let merged = joiner.push_timestamp(time(1, 2_000));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn capacity_drops_oldest_entry() {
        let mut joiner = FrameJoiner::new(10_000, 3);
        for i in 0..5 {
            joiner.push_metadata(meta(i * 1_000_000));
        }
        assert_eq!(joiner.pending(), (3, 0));
    }
}
