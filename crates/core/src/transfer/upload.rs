use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::progress::{Direction, ProgressSink};
use crate::traits::{ByteTransport, DiskApi};

use super::chunk::{file_chunks, metered, regroup, resolve_chunk_size};
use super::session::{Phase, TransferSession};
use super::{
    TransferEngine, TransferOutcome, TransferReport, UploadRequest, UploadSource, sink_for,
};

impl<A: DiskApi, T: ByteTransport> TransferEngine<A, T> {
    /// Upload a local file or a remote URL to the disk
    ///
    /// Nothing is written remotely until the transport confirms the whole
    /// body, so a failed upload leaves no partial remote object to resume.
    pub async fn upload(
        &self,
        request: &UploadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransferReport> {
        self.attempt_upload(request, progress).await.into_result()
    }

    /// Like [`Self::upload`], keeping warnings when the transfer fails
    pub async fn attempt_upload(
        &self,
        request: &UploadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> TransferOutcome {
        let progress = sink_for(&request.options, progress);
        let mut session = TransferSession::new(
            Direction::Upload,
            request.source.to_string(),
            request.destination.to_string(),
        );

        let outcome = self
            .upload_in_session(request, &mut session, Arc::clone(&progress))
            .await;
        if session.phase == Phase::Streaming || session.phase == Phase::Verifying {
            progress.finished();
        }
        session.conclude(outcome)
    }

    async fn upload_in_session(
        &self,
        request: &UploadRequest,
        session: &mut TransferSession,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<()> {
        if request.options.resume {
            session.warn("resume applies to downloads only and was ignored");
        }

        // Local size is known before any remote call
        let local_size = match &request.source {
            UploadSource::File(path) => {
                let metadata = tokio::fs::metadata(path).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::not_found(format!("local file {}", path.display()))
                    } else {
                        Error::Io(e)
                    }
                })?;
                if !metadata.is_file() {
                    return Err(Error::InvalidArguments(format!(
                        "{} is not a regular file",
                        path.display()
                    )));
                }
                Some(metadata.len())
            }
            UploadSource::Url(_) => None,
        };
        if request.options.chunk_size == Some(0) {
            return Err(Error::InvalidArguments(
                "chunk size must be greater than zero".into(),
            ));
        }

        session.enter(Phase::Negotiating);
        let target = self
            .api
            .upload_target(&request.token, &request.destination, request.options.overwrite)
            .await?;
        debug!(destination = %request.destination, "upload target negotiated");

        let (body, total) = match &request.source {
            UploadSource::File(path) => {
                let chunk_size = resolve_chunk_size(request.options.chunk_size, local_size)?;
                session.report.chunk_size = chunk_size;
                let file = tokio::fs::File::open(path).await?;
                (file_chunks(file, chunk_size), local_size)
            }
            UploadSource::Url(url) => {
                let incoming = self.transport.fetch(url.as_str(), None).await?;
                if incoming
                    .content_type
                    .as_deref()
                    .is_some_and(|ct| ct.starts_with("text/html"))
                {
                    return Err(Error::InvalidArguments(format!(
                        "{url} returned an HTML page instead of a file"
                    )));
                }
                let chunk_size =
                    resolve_chunk_size(request.options.chunk_size, incoming.content_length)?;
                session.report.chunk_size = chunk_size;
                (regroup(incoming.stream, chunk_size), incoming.content_length)
            }
        };

        session.report.total_bytes = total;
        session.start_at(0);
        session.enter(Phase::Streaming);
        progress.started(Direction::Upload, 0, total);

        let body = metered(body, session.meter.clone(), Direction::Upload, total, progress);
        self.transport.send(&target.href, body, total).await?;

        session.enter(Phase::Verifying);
        let transferred = session.meter.bytes();
        if let Some(total) = total.filter(|&total| total != transferred) {
            session.warn(format!(
                "sent {transferred} bytes but the source reported {total}"
            ));
        }

        info!(
            destination = %request.destination,
            bytes = transferred,
            "upload complete"
        );
        Ok(())
    }
}
