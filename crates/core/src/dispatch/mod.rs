//! Operation dispatcher
//!
//! Validates an [`ActionRequest`], routes it to the transfer engine or the
//! metadata API, and folds the outcome into an [`OperationResult`].
//! Validation happens before any remote work, so a malformed request never
//! costs a network call.

mod active;
mod request;
mod result;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::path::DiskPath;
use crate::progress::ProgressSink;
use crate::traits::{ByteTransport, DiskApi, DownloadSource};
use crate::transfer::{
    DownloadRequest, TransferEngine, TransferOptions, UploadRequest, UploadSource,
};
use crate::validation::{validate_chunk_size, validate_source_url, validate_token};

pub use active::{ActiveTransfers, TransferClaim};
pub use request::{Action, ActionRequest};
pub use result::{ErrorReport, OperationResult, ResultData};

use request::present;

/// Page size used when a list request names none
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Settings a dispatcher applies to every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Used when a request carries no token
    pub token: Option<String>,

    /// Used when a request names no chunk size; adaptive when None
    pub chunk_size: Option<u64>,

    pub list_limit: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            token: None,
            chunk_size: None,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl From<&Config> for DispatcherConfig {
    fn from(config: &Config) -> Self {
        Self {
            token: config.api.token.clone(),
            chunk_size: config.defaults.chunk_size,
            list_limit: config.defaults.list_limit,
        }
    }
}

/// Routes action requests to the engine and the metadata API
#[derive(Debug)]
pub struct Dispatcher<A, T> {
    api: Arc<A>,
    engine: TransferEngine<A, T>,
    config: DispatcherConfig,
    active: ActiveTransfers,
}

impl<A: DiskApi, T: ByteTransport> Dispatcher<A, T> {
    pub fn new(api: Arc<A>, transport: Arc<T>, config: DispatcherConfig) -> Self {
        Self {
            engine: TransferEngine::new(Arc::clone(&api), transport),
            api,
            config,
            active: ActiveTransfers::new(),
        }
    }

    /// Local paths currently being written
    pub fn active_transfers(&self) -> &ActiveTransfers {
        &self.active
    }

    /// Run one request; failures are reported in the result, never raised
    pub async fn dispatch(
        &self,
        request: &ActionRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> OperationResult {
        let mut warnings = Vec::new();
        debug!(action = %request.action, "dispatching");

        let outcome = match request.action {
            Action::Upload => self.upload(request, progress, &mut warnings).await,
            Action::Download => self.download(request, progress, &mut warnings).await,
            Action::Rename => self.rename(request).await,
            Action::Delete => self.delete(request).await,
            Action::List => self.list(request, &mut warnings).await,
        };

        match outcome {
            Ok(data) => OperationResult::success(request.action, data, warnings),
            Err(err) => {
                warn!(action = %request.action, error = %err, "operation failed");
                OperationResult::failure(request.action, &err, warnings)
            }
        }
    }

    fn token(&self, request: &ActionRequest) -> Result<String> {
        let token = present(&request.oauth_token)
            .or(self.config.token.as_deref())
            .ok_or_else(|| Error::InvalidArguments("oauth token is required".into()))?;
        Ok(validate_token(token)?.to_string())
    }

    fn chunk_size(&self, request: &ActionRequest) -> Result<Option<usize>> {
        request
            .chunk_size
            .or(self.config.chunk_size)
            .map(validate_chunk_size)
            .transpose()
    }

    fn options(&self, request: &ActionRequest) -> Result<TransferOptions> {
        Ok(TransferOptions {
            chunk_size: self.chunk_size(request)?,
            resume: request.resume,
            overwrite: request.overwrite,
            show_progress: request.show_progress,
        })
    }

    /// Validate an upload request without touching the network
    pub fn plan_upload(&self, request: &ActionRequest) -> Result<UploadRequest> {
        let token = self.token(request)?;
        let destination = DiskPath::parse(required(&request.disk_path, "disk_path")?)?;

        let source = match (present(&request.local_path), present(&request.file_url)) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidArguments(
                    "upload takes either local_path or file_url, not both".into(),
                ));
            }
            (None, None) => {
                return Err(Error::InvalidArguments(
                    "upload requires local_path or file_url".into(),
                ));
            }
            (Some(local), None) => UploadSource::File(PathBuf::from(local)),
            (None, Some(url)) => UploadSource::Url(validate_source_url(url)?),
        };

        let destination = if destination.is_dir_like() {
            match &source {
                UploadSource::File(path) => {
                    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                        Error::InvalidArguments(format!("{} has no file name", path.display()))
                    })?;
                    destination.join(name)?
                }
                UploadSource::Url(_) => {
                    return Err(Error::InvalidArguments(
                        "upload from a url needs a full destination path".into(),
                    ));
                }
            }
        } else {
            destination
        };

        Ok(UploadRequest {
            token,
            source,
            destination,
            options: self.options(request)?,
        })
    }

    /// Validate a download request without touching the network
    pub async fn plan_download(&self, request: &ActionRequest) -> Result<DownloadRequest> {
        let local = required(&request.local_path, "local_path")?;
        let token = match present(&request.oauth_token).or(self.config.token.as_deref()) {
            Some(token) if present(&request.disk_path).is_some() => Some(token),
            _ => None,
        };
        let source = DownloadSource::from_parts(
            token,
            request.disk_path.as_deref(),
            request.public_key.as_deref(),
            request.public_path.as_deref(),
        )?;

        let destination = resolve_local_destination(Path::new(local), &source).await?;
        Ok(DownloadRequest {
            source,
            destination,
            options: self.options(request)?,
        })
    }

    async fn upload(
        &self,
        request: &ActionRequest,
        progress: Arc<dyn ProgressSink>,
        warnings: &mut Vec<String>,
    ) -> Result<ResultData> {
        let plan = self.plan_upload(request)?;
        let outcome = self.engine.attempt_upload(&plan, progress).await;
        warnings.extend(outcome.warnings);
        let mut report = outcome.result?;

        if request.publish {
            match self.api.publish(&plan.token, &plan.destination).await {
                Ok(url) => report.public_url = Some(url),
                Err(err) => {
                    warn!(path = %plan.destination, error = %err, "publish failed");
                    warnings.push(format!("uploaded but could not publish: {err}"));
                }
            }
        }
        Ok(ResultData::Transfer(report))
    }

    async fn download(
        &self,
        request: &ActionRequest,
        progress: Arc<dyn ProgressSink>,
        warnings: &mut Vec<String>,
    ) -> Result<ResultData> {
        let plan = self.plan_download(request).await?;
        let _claim = self.active.claim(&plan.destination)?;
        let outcome = self.engine.attempt_download(&plan, progress).await;
        warnings.extend(outcome.warnings);
        Ok(ResultData::Transfer(outcome.result?))
    }

    async fn rename(&self, request: &ActionRequest) -> Result<ResultData> {
        let token = self.token(request)?;
        let from = DiskPath::parse(required(&request.disk_path, "disk_path")?)?;
        if from.is_root() {
            return Err(Error::InvalidArguments(
                "the disk root cannot be renamed".into(),
            ));
        }

        let to = match (
            present(&request.destination_path),
            request.new_name.as_deref().map(str::trim),
        ) {
            (Some(_), Some(name)) if !name.is_empty() => {
                return Err(Error::InvalidArguments(
                    "rename takes either destination_path or new_name, not both".into(),
                ));
            }
            (Some(destination), _) => DiskPath::parse(destination)?,
            (None, Some(name)) => from.with_name(name)?,
            (None, None) => {
                return Err(Error::InvalidArguments(
                    "rename requires destination_path or new_name".into(),
                ));
            }
        };
        if to == from {
            return Err(Error::InvalidArguments(format!(
                "{from} is already named that way"
            )));
        }

        self.api
            .move_resource(&token, &from, &to, request.overwrite)
            .await?;
        Ok(ResultData::Moved { from, to })
    }

    async fn delete(&self, request: &ActionRequest) -> Result<ResultData> {
        let token = self.token(request)?;
        let path = DiskPath::parse(required(&request.disk_path, "disk_path")?)?;
        if path.is_root() {
            return Err(Error::InvalidArguments(
                "refusing to delete the disk root".into(),
            ));
        }
        let permanently = request.permanently.unwrap_or(true);

        self.api.delete(&token, &path, permanently).await?;
        Ok(ResultData::Deleted { path, permanently })
    }

    async fn list(
        &self,
        request: &ActionRequest,
        warnings: &mut Vec<String>,
    ) -> Result<ResultData> {
        let token = self.token(request)?;
        let path = DiskPath::parse(required(&request.disk_path, "disk_path")?)?;

        let limit = match request.limit {
            Some(0) => {
                warnings.push(format!(
                    "limit 0 is not a page size; using {}",
                    self.config.list_limit
                ));
                self.config.list_limit
            }
            Some(limit) => limit,
            None => self.config.list_limit,
        };
        let offset = request.offset.unwrap_or(0);

        let page = self.api.list(&token, &path, limit, offset).await?;
        Ok(ResultData::Listing(page))
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    present(value).ok_or_else(|| Error::InvalidArguments(format!("{field} is required")))
}

/// An existing local directory receives the remote file under its own name
async fn resolve_local_destination(local: &Path, source: &DownloadSource) -> Result<PathBuf> {
    let is_dir = tokio::fs::metadata(local)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Ok(local.to_path_buf());
    }
    let name = source.file_name().ok_or_else(|| {
        Error::InvalidArguments(format!(
            "{} is a directory and the source has no file name",
            local.display()
        ))
    })?;
    Ok(local.join(name))
}
