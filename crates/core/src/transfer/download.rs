use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::progress::{Direction, ProgressEvent, ProgressSink};
use crate::traits::{ByteRange, ByteTransport, DiskApi};

use super::chunk::{regroup, resolve_chunk_size};
use super::session::{Phase, TransferSession};
use super::{DownloadRequest, TransferEngine, TransferOutcome, TransferReport, sink_for};

/// Length of the local destination, if it exists
async fn local_length(path: &Path) -> Result<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Err(Error::InvalidArguments(format!(
            "{} is a directory",
            path.display()
        ))),
        Ok(metadata) => Ok(Some(metadata.len())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn open_destination(path: &Path, offset: u64) -> Result<tokio::fs::File> {
    if offset > 0 {
        let file = tokio::fs::OpenOptions::new().append(true).open(path).await?;
        return Ok(file);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(tokio::fs::File::create(path).await?)
}

impl<A: DiskApi, T: ByteTransport> TransferEngine<A, T> {
    /// Download a resource to a local file, resuming a partial file on request
    ///
    /// A partial local file is never deleted on failure; it is the resume
    /// point for the next attempt.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TransferReport> {
        self.attempt_download(request, progress).await.into_result()
    }

    /// Like [`Self::download`], keeping warnings when the transfer fails
    pub async fn attempt_download(
        &self,
        request: &DownloadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> TransferOutcome {
        let progress = sink_for(&request.options, progress);
        let mut session = TransferSession::new(
            Direction::Download,
            request.source.to_string(),
            request.destination.display().to_string(),
        );

        let outcome = self
            .download_in_session(request, &mut session, progress.as_ref())
            .await;
        if session.phase == Phase::Streaming {
            progress.finished();
        }
        session.conclude(outcome)
    }

    async fn download_in_session(
        &self,
        request: &DownloadRequest,
        session: &mut TransferSession,
        progress: &dyn ProgressSink,
    ) -> Result<()> {
        let options = &request.options;
        let destination = &request.destination;

        if options.chunk_size == Some(0) {
            return Err(Error::InvalidArguments(
                "chunk size must be greater than zero".into(),
            ));
        }

        // Refuse before touching the network
        let existing = local_length(destination).await?;
        if existing.is_some() && !options.overwrite && !options.resume {
            return Err(Error::conflict(format!(
                "{} already exists; pass overwrite or resume",
                destination.display()
            )));
        }

        session.enter(Phase::Negotiating);
        let target = self.api.download_target(&request.source).await?;
        let remote_size = target.size;
        session.report.total_bytes = remote_size;
        debug!(source = %request.source, size = ?remote_size, "download target negotiated");

        let mut offset = match existing {
            None => 0,
            Some(_) if options.overwrite => {
                if options.resume {
                    session.warn("overwrite and resume both set; overwriting from the start");
                }
                0
            }
            Some(local) => match remote_size {
                None => {
                    session.warn(
                        "remote size is unknown so the partial file cannot be resumed; restarting",
                    );
                    0
                }
                Some(size) if local >= size => {
                    if local > size {
                        session.warn(format!(
                            "local file has {local} bytes, more than the remote {size}; left untouched"
                        ));
                    }
                    session.start_at(local);
                    session.report.resumed = false;
                    session.report.already_complete = true;
                    info!(destination = %destination.display(), "download already complete");
                    return Ok(());
                }
                Some(_) => local,
            },
        };

        let chunk_size = resolve_chunk_size(options.chunk_size, remote_size)?;
        session.report.chunk_size = chunk_size;

        let range = if offset > 0 {
            session.enter(Phase::Resuming);
            Some(ByteRange {
                start: offset,
                end: remote_size,
            })
        } else {
            session.enter(Phase::FreshStart);
            None
        };

        session.enter(Phase::Streaming);
        let incoming = self.transport.fetch(&target.href, range).await?;
        if offset > 0 && !incoming.partial {
            session.warn("server ignored the range request; restarting from the beginning");
            offset = 0;
        }
        session.start_at(offset);

        let total = remote_size.or(incoming.content_length.map(|len| len + offset));
        session.report.total_bytes = total;

        // Opened only after the transport answered, so a refused request
        // leaves the local file as it was
        let mut file = open_destination(destination, offset).await?;
        progress.started(Direction::Download, offset, total);

        let mut stream = regroup(incoming.stream, chunk_size);
        let mut failure = None;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                failure = Some(e);
                break;
            }
            let position = session.meter.record(chunk.len() as u64);
            progress.advanced(ProgressEvent {
                direction: Direction::Download,
                chunk: chunk.len() as u64,
                position,
                total,
            });
        }

        // The partial file is the resume point: every counted byte must be
        // on disk before a failure is reported
        file.flush().await?;
        file.sync_all().await?;
        if let Some(e) = failure {
            return Err(Error::transfer(e.to_string(), session.meter.bytes()));
        }

        let written = offset + session.meter.bytes();
        if let Some(size) = remote_size.filter(|&size| written < size) {
            return Err(Error::transfer(
                format!("stream ended at {written} of {size} bytes"),
                session.meter.bytes(),
            ));
        }

        info!(
            destination = %destination.display(),
            bytes = session.meter.bytes(),
            resumed = offset > 0,
            "download complete"
        );
        Ok(())
    }
}
