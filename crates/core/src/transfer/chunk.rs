//! Chunk sizing and chunked streams

use std::sync::Arc;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};
use crate::progress::{Direction, ProgressEvent, ProgressSink};
use crate::traits::ByteStream;

use super::session::Meter;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Pick a chunk size when the caller did not ask for one
pub fn default_chunk_size(total: Option<u64>) -> usize {
    let size = match total {
        None => 512 * KIB,
        Some(total) if total <= 10 * MIB => 512 * KIB,
        Some(total) if total <= 100 * MIB => MIB,
        Some(total) if total <= GIB => 2 * MIB,
        Some(_) => 4 * MIB,
    };
    size as usize
}

/// Resolve the effective chunk size; an explicit size must be positive
pub fn resolve_chunk_size(requested: Option<usize>, total: Option<u64>) -> Result<usize> {
    match requested {
        Some(0) => Err(Error::InvalidArguments(
            "chunk size must be greater than zero".into(),
        )),
        Some(size) => Ok(size),
        None => Ok(default_chunk_size(total)),
    }
}

/// Read a local file as a stream of `chunk_size` pieces (the last may be short)
pub(crate) fn file_chunks(file: File, chunk_size: usize) -> ByteStream {
    futures::stream::unfold(Some(file), move |file| async move {
        let mut file = file?;
        let mut buf = vec![0u8; chunk_size];
        let mut filled = 0;
        while filled < chunk_size {
            match file.read(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => return Some((Err(e), None)),
            }
        }
        if filled == 0 {
            return None;
        }
        buf.truncate(filled);
        Some((Ok(buf), Some(file)))
    })
    .boxed()
}

struct Regroup {
    inner: ByteStream,
    buf: Vec<u8>,
    chunk_size: usize,
    finished: bool,
    error: Option<std::io::Error>,
}

/// Regroup arbitrarily sized network pieces into `chunk_size` chunks
///
/// Buffered bytes are yielded before an upstream error, so a failing
/// download still persists everything received in full before the failure.
pub(crate) fn regroup(inner: ByteStream, chunk_size: usize) -> ByteStream {
    let state = Regroup {
        inner,
        buf: Vec::with_capacity(chunk_size),
        chunk_size,
        finished: false,
        error: None,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if state.buf.len() >= state.chunk_size {
                let rest = state.buf.split_off(state.chunk_size);
                let chunk = std::mem::replace(&mut state.buf, rest);
                return Some((Ok(chunk), state));
            }

            if state.finished {
                if !state.buf.is_empty() {
                    let chunk = std::mem::take(&mut state.buf);
                    return Some((Ok(chunk), state));
                }
                return state.error.take().map(|e| (Err(e), state));
            }

            match state.inner.next().await {
                Some(Ok(piece)) => state.buf.extend_from_slice(&piece),
                Some(Err(e)) => {
                    state.error = Some(e);
                    state.finished = true;
                }
                None => state.finished = true,
            }
        }
    })
    .boxed()
}

/// Count every chunk as the body stream yields it and report it
///
/// For uploads the event fires when the chunk enters the streamed request
/// body, not once the server has received it.
pub(crate) fn metered(
    inner: ByteStream,
    meter: Arc<Meter>,
    direction: Direction,
    total: Option<u64>,
    progress: Arc<dyn ProgressSink>,
) -> ByteStream {
    inner
        .inspect(move |chunk| {
            if let Ok(chunk) = chunk {
                let position = meter.record(chunk.len() as u64);
                progress.advanced(ProgressEvent {
                    direction,
                    chunk: chunk.len() as u64,
                    position,
                    total,
                });
            }
        })
        .boxed()
}
