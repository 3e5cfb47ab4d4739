//! Capability traits for the remote disk
//!
//! The storage service never moves bytes through its metadata endpoints: it
//! hands out a short-lived transfer URL, and a second request streams the
//! bytes. The two steps are separate capabilities so each can be stubbed on
//! its own:
//!
//! - [`DiskApi`]: metadata calls (targets, move, delete, list)
//! - [`ByteTransport`]: streaming GET/PUT against a transfer URL

use async_trait::async_trait;
use futures::stream::BoxStream;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::DiskPath;

/// Kind of remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(alias = "dir")]
    Directory,
}

/// Metadata for a file or directory on the disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Full disk path
    pub path: String,

    /// Last path component
    pub name: String,

    /// File or directory
    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Size in bytes (None for directories)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,

    /// MIME type as detected by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl RemoteEntry {
    /// Create a new RemoteEntry for a file
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        Self {
            name: last_component(&path),
            path,
            kind: EntryKind::File,
            size: Some(size),
            modified: None,
            mime_type: None,
        }
    }

    /// Create a new RemoteEntry for a directory
    pub fn dir(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: last_component(&path),
            path,
            kind: EntryKind::Directory,
            size: None,
            modified: None,
            mime_type: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Human-readable size
    pub fn size_human(&self) -> Option<String> {
        self.size
            .map(|size| humansize::format_size(size, humansize::BINARY))
    }
}

fn last_component(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// One page of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    /// Listed directory
    pub path: String,

    /// Entries in service order
    pub items: Vec<RemoteEntry>,

    /// Page size requested
    pub limit: u32,

    /// Zero-based index of the first entry
    pub offset: u64,

    /// Total entries in the directory, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// A short-lived URL for the byte-level request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTarget {
    /// URL to stream bytes to or from
    pub href: String,

    /// Remote size in bytes, when the service reports it
    pub size: Option<u64>,
}

/// How a download addresses its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    /// Authenticated access to a path on the owner's disk
    Private { token: String, path: DiskPath },
    /// Unauthenticated access to a published resource
    Public {
        key: String,
        path: Option<String>,
    },
}

impl DownloadSource {
    /// Resolve the addressing mode; exactly one mode must be supplied
    pub fn from_parts(
        token: Option<&str>,
        disk_path: Option<&str>,
        public_key: Option<&str>,
        public_path: Option<&str>,
    ) -> Result<Self> {
        let disk_path = disk_path.map(str::trim).filter(|p| !p.is_empty());
        let public_key = public_key.map(str::trim).filter(|k| !k.is_empty());

        match (disk_path, public_key) {
            (Some(_), Some(_)) => Err(Error::InvalidArguments(
                "download takes either a disk path or a public key, not both".into(),
            )),
            (None, None) => Err(Error::InvalidArguments(
                "download requires a disk path (with token) or a public key".into(),
            )),
            (Some(path), None) => {
                let token = token.ok_or_else(|| {
                    Error::InvalidArguments("private download requires an oauth token".into())
                })?;
                Ok(Self::Private {
                    token: crate::validation::validate_token(token)?.to_string(),
                    path: DiskPath::parse(path)?,
                })
            }
            (None, Some(key)) => Ok(Self::Public {
                key: key.to_string(),
                path: public_path
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            }),
        }
    }

    /// Name to use when the local destination is a directory
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Private { path, .. } => path.file_name(),
            Self::Public { path, .. } => path
                .as_deref()
                .and_then(|p| p.trim_end_matches('/').rsplit('/').next())
                .filter(|name| !name.is_empty()),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public { .. })
    }
}

impl std::fmt::Display for DownloadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Private { path, .. } => write!(f, "{path}"),
            Self::Public { key, path: None } => write!(f, "{key}"),
            Self::Public {
                key,
                path: Some(path),
            } => write!(f, "{key}:{path}"),
        }
    }
}

/// Trait for the storage service's metadata endpoints
///
/// Every call is single-shot and stateless; nothing is retried internally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiskApi: Send + Sync {
    /// Get metadata for a single resource
    async fn resource(&self, token: &str, path: &DiskPath) -> Result<RemoteEntry>;

    /// Negotiate an upload URL for `path`
    async fn upload_target(
        &self,
        token: &str,
        path: &DiskPath,
        overwrite: bool,
    ) -> Result<TransferTarget>;

    /// Negotiate a download URL and report the remote size
    async fn download_target(&self, source: &DownloadSource) -> Result<TransferTarget>;

    /// Move (rename) a resource
    async fn move_resource(
        &self,
        token: &str,
        from: &DiskPath,
        to: &DiskPath,
        overwrite: bool,
    ) -> Result<()>;

    /// Delete a resource
    async fn delete(&self, token: &str, path: &DiskPath, permanently: bool) -> Result<()>;

    /// List one page of a directory
    async fn list(
        &self,
        token: &str,
        path: &DiskPath,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage>;

    /// Publish a resource and return its public URL
    async fn publish(&self, token: &str, path: &DiskPath) -> Result<String>;
}

/// Body chunks as they arrive from or leave for the network
pub type ByteStream = BoxStream<'static, std::io::Result<Vec<u8>>>;

/// Byte range `[start, end)`; an open end reads to the end of the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Value for the HTTP `Range` header
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) if end > self.start => format!("bytes={}-{}", self.start, end - 1),
            _ => format!("bytes={}-", self.start),
        }
    }
}

/// A response body being streamed from a transfer URL
pub struct IncomingBody {
    pub stream: ByteStream,

    /// Content-Length of this response
    pub content_length: Option<u64>,

    /// Content-Type of this response
    pub content_type: Option<String>,

    /// Whether the server honored a range request (206)
    pub partial: bool,
}

impl std::fmt::Debug for IncomingBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingBody")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .field("partial", &self.partial)
            .finish_non_exhaustive()
    }
}

/// Trait for the byte-level requests against a transfer URL
///
/// Timeouts are the implementor's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ByteTransport: Send + Sync {
    /// GET the URL, optionally restricted to a byte range
    async fn fetch(&self, url: &str, range: Option<ByteRange>) -> Result<IncomingBody>;

    /// PUT a streamed body to the URL; success means the service stored it
    async fn send(&self, url: &str, body: ByteStream, length: Option<u64>) -> Result<()>;
}
