//! Progress reporting for transfers
//!
//! The engine never writes to the console. It emits events into a sink, and
//! the caller decides whether they become a progress bar, log lines, or test
//! assertions.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Direction of a byte transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upload,
    Download,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Upload => f.write_str("upload"),
            Direction::Download => f.write_str("download"),
        }
    }
}

/// Emitted after each chunk is moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub direction: Direction,

    /// Size of the chunk just moved
    pub chunk: u64,

    /// Position in the file after this chunk (includes any resume offset)
    pub position: u64,

    /// Total size, when known
    pub total: Option<u64>,
}

impl ProgressEvent {
    /// Completion percentage, when the total is known
    pub fn percent(&self) -> Option<u8> {
        match self.total {
            Some(0) => Some(100),
            Some(total) => Some(((self.position.min(total) * 100) / total) as u8),
            None => None,
        }
    }
}

/// Capability consuming `(bytes so far, total)` events
pub trait ProgressSink: Send + Sync {
    /// Transfer is about to stream, starting at `position`
    fn started(&self, _direction: Direction, _position: u64, _total: Option<u64>) {}

    /// One chunk was moved
    fn advanced(&self, event: ProgressEvent);

    /// Streaming ended, successfully or not
    fn finished(&self) {}
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advanced(&self, _event: ProgressEvent) {}
}

/// Sink that keeps every event, for callers that report progress afterwards
#[derive(Debug, Default)]
pub struct RecordedProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Sizes of the chunks reported so far
    pub fn chunks(&self) -> Vec<u64> {
        self.events().iter().map(|e| e.chunk).collect()
    }
}

impl ProgressSink for RecordedProgress {
    fn advanced(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(position: u64, total: Option<u64>) -> ProgressEvent {
        ProgressEvent {
            direction: Direction::Download,
            chunk: 1,
            position,
            total,
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(event(50, Some(200)).percent(), Some(25));
        assert_eq!(event(200, Some(200)).percent(), Some(100));
        assert_eq!(event(0, Some(0)).percent(), Some(100));
        assert_eq!(event(10, None).percent(), None);
    }

    #[test]
    fn test_recorded_progress_keeps_order() {
        let sink = RecordedProgress::new();
        sink.advanced(ProgressEvent {
            direction: Direction::Upload,
            chunk: 4096,
            position: 4096,
            total: Some(5000),
        });
        sink.advanced(ProgressEvent {
            direction: Direction::Upload,
            chunk: 904,
            position: 5000,
            total: Some(5000),
        });
        assert_eq!(sink.chunks(), vec![4096, 904]);
        assert_eq!(sink.events()[1].percent(), Some(100));
    }
}
