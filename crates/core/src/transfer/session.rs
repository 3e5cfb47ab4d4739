//! Per-transfer bookkeeping
//!
//! A session lives exactly as long as one transfer. Nothing in it is
//! persisted: for downloads the partial local file is the only checkpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::{Error, Result};
use crate::progress::Direction;

use super::{TransferOutcome, TransferReport};

/// Lifecycle of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Negotiating,
    Resuming,
    FreshStart,
    Streaming,
    Verifying,
    Done,
    Failed,
}

impl Phase {
    /// Bytes may have moved; failures from here on are transfer failures
    fn is_streaming(self) -> bool {
        matches!(self, Phase::Streaming | Phase::Verifying)
    }
}

/// Byte and chunk counters shared with the streaming body
#[derive(Debug, Default)]
pub(crate) struct Meter {
    bytes: AtomicU64,
    chunks: AtomicU64,
    offset: AtomicU64,
}

impl Meter {
    /// Record one chunk and return the resulting file position
    pub(crate) fn record(&self, len: u64) -> u64 {
        self.chunks.fetch_add(1, Ordering::Relaxed);
        let bytes = self.bytes.fetch_add(len, Ordering::Relaxed) + len;
        self.offset.load(Ordering::Relaxed) + bytes
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub(crate) fn chunks(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    pub(crate) fn set_offset(&self, offset: u64) {
        self.offset.store(offset, Ordering::Relaxed);
    }
}

/// State of one in-flight transfer
#[derive(Debug)]
pub(crate) struct TransferSession {
    pub(crate) phase: Phase,
    pub(crate) meter: Arc<Meter>,
    pub(crate) report: TransferReport,
}

impl TransferSession {
    pub(crate) fn new(direction: Direction, source: String, destination: String) -> Self {
        Self {
            phase: Phase::Idle,
            meter: Arc::new(Meter::default()),
            report: TransferReport {
                direction,
                source,
                destination,
                bytes_transferred: 0,
                total_bytes: None,
                start_offset: 0,
                chunks: 0,
                chunk_size: 0,
                resumed: false,
                already_complete: false,
                public_url: None,
                warnings: Vec::new(),
            },
        }
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        debug!(
            direction = %self.report.direction,
            from = ?self.phase,
            to = ?phase,
            "transfer phase"
        );
        self.phase = phase;
    }

    pub(crate) fn start_at(&mut self, offset: u64) {
        self.report.start_offset = offset;
        self.report.resumed = offset > 0;
        self.meter.set_offset(offset);
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(direction = %self.report.direction, "{message}");
        self.report.warnings.push(message);
    }

    /// Close the session, turning mid-stream failures into transfer errors
    pub(crate) fn conclude(mut self, outcome: Result<()>) -> TransferOutcome {
        self.report.bytes_transferred = self.meter.bytes();
        self.report.chunks = self.meter.chunks();
        let warnings = std::mem::take(&mut self.report.warnings);

        let result = match outcome {
            Ok(()) => {
                self.enter(Phase::Done);
                Ok(self.report)
            }
            Err(err) => {
                let streaming = self.phase.is_streaming();
                self.enter(Phase::Failed);
                match err {
                    Error::Transfer { message, .. } => {
                        Err(Error::transfer(message, self.report.bytes_transferred))
                    }
                    other if streaming => Err(Error::transfer(
                        other.to_string(),
                        self.report.bytes_transferred,
                    )),
                    other => Err(other),
                }
            }
        };
        TransferOutcome { result, warnings }
    }
}
