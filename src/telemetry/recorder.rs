use std::collections::VecDeque;

use super::event::OpsEvent;
use super::metrics::{compute_snapshot, OpsSnapshot};

const MAX_EVENTS: usize = 10_000;

/// Bounded ring of operational events. Old events fall off the front;
/// snapshots are computed over whatever is retained.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<OpsEvent>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, event: OpsEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> OpsSnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
