//! Chunked, resumable transfer engine
//!
//! Every transfer runs the same two-step protocol: negotiate a short-lived
//! URL through [`DiskApi`], then stream bytes against it through
//! [`ByteTransport`] in fixed-size chunks. Downloads resume from the length
//! of the partial local file; there is no other checkpoint.

mod chunk;
mod download;
mod session;
mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::path::DiskPath;
use crate::progress::{Direction, NoProgress, ProgressSink};
use crate::traits::{ByteTransport, DiskApi, DownloadSource};

pub use chunk::{default_chunk_size, resolve_chunk_size};
pub use session::Phase;

/// Per-transfer options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Explicit chunk size; adaptive when None
    pub chunk_size: Option<usize>,

    /// Continue a partial local file (downloads only)
    pub resume: bool,

    /// Replace an existing destination
    pub overwrite: bool,

    /// Forward progress events to the caller's sink
    pub show_progress: bool,
}

/// Where upload bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    File(PathBuf),
    Url(url::Url),
}

impl std::fmt::Display for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadSource::File(path) => write!(f, "{}", path.display()),
            UploadSource::Url(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub token: String,
    pub source: UploadSource,
    pub destination: DiskPath,
    pub options: TransferOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source: DownloadSource,
    pub destination: PathBuf,
    pub options: TransferOptions,
}

/// A transfer in either direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    Upload(UploadRequest),
    Download(DownloadRequest),
}

impl TransferRequest {
    pub fn direction(&self) -> Direction {
        match self {
            TransferRequest::Upload(_) => Direction::Upload,
            TransferRequest::Download(_) => Direction::Download,
        }
    }

    pub fn options(&self) -> &TransferOptions {
        match self {
            TransferRequest::Upload(request) => &request.options,
            TransferRequest::Download(request) => &request.options,
        }
    }
}

/// Outcome of a successful transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub direction: Direction,
    pub source: String,
    pub destination: String,

    /// Bytes moved by this invocation (excludes a resume offset)
    pub bytes_transferred: u64,

    /// Full size of the resource, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,

    /// Offset the transfer started from
    pub start_offset: u64,

    pub chunks: u64,
    pub chunk_size: usize,
    pub resumed: bool,

    /// The destination was already complete; nothing was fetched
    pub already_complete: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    /// Non-fatal notes raised along the way
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Everything a finished transfer attempt produced
///
/// Warnings raised before a failure are kept here so callers can report them
/// alongside the error.
#[derive(Debug)]
pub struct TransferOutcome {
    pub result: Result<TransferReport>,
    pub warnings: Vec<String>,
}

impl TransferOutcome {
    /// Collapse into a plain result; warnings of a successful attempt go back
    /// into the report, those of a failed one are dropped
    pub fn into_result(self) -> Result<TransferReport> {
        let mut report = self.result?;
        report.warnings = self.warnings;
        Ok(report)
    }
}

/// Runs transfers against a disk service
#[derive(Debug)]
pub struct TransferEngine<A, T> {
    api: Arc<A>,
    transport: Arc<T>,
}

impl<A, T> Clone for TransferEngine<A, T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<A: DiskApi, T: ByteTransport> TransferEngine<A, T> {
    pub fn new(api: Arc<A>, transport: Arc<T>) -> Self {
        Self { api, transport }
    }

    /// Run a transfer in whichever direction the request names
    pub async fn run(
        &self,
        request: &TransferRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransferReport> {
        match request {
            TransferRequest::Upload(request) => self.upload(request, progress).await,
            TransferRequest::Download(request) => self.download(request, progress).await,
        }
    }
}

fn sink_for(options: &TransferOptions, progress: Arc<dyn ProgressSink>) -> Arc<dyn ProgressSink> {
    if options.show_progress {
        progress
    } else {
        Arc::new(NoProgress)
    }
}
