//! ydg-core: Core library for the ydg disk gateway
//!
//! This crate provides the core functionality for ydg, including:
//! - Configuration management
//! - Disk path parsing and input validation
//! - DiskApi and ByteTransport traits for the storage service
//! - The chunked, resumable transfer engine
//! - The operation dispatcher
//!
//! This crate is designed to be independent of any specific HTTP client,
//! allowing the engine and dispatcher to be tested against in-memory fakes.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod path;
pub mod progress;
pub mod traits;
pub mod transfer;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ConfigManager};
pub use dispatch::{
    Action, ActionRequest, Dispatcher, DispatcherConfig, ErrorReport, OperationResult, ResultData,
};
pub use error::{Error, ErrorKind, Result};
pub use path::DiskPath;
pub use progress::{Direction, NoProgress, ProgressEvent, ProgressSink};
pub use traits::{
    ByteRange, ByteStream, ByteTransport, DiskApi, DownloadSource, EntryKind, IncomingBody,
    ListPage, RemoteEntry, TransferTarget,
};
pub use transfer::{
    DownloadRequest, TransferEngine, TransferOptions, TransferOutcome, TransferReport,
    TransferRequest, UploadRequest, UploadSource,
};
