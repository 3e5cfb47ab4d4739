//! In-memory disk service for unit tests

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use crate::error::{Error, Result};
use crate::path::{DISK_PREFIX, DiskPath};
use crate::traits::{
    ByteRange, ByteStream, ByteTransport, DiskApi, DownloadSource, IncomingBody, ListPage,
    RemoteEntry, TransferTarget,
};

pub(crate) const TOKEN: &str = "AQAAAAAvalidtoken";

const UPLOAD_HREF: &str = "mem://upload/";
const DOWNLOAD_HREF: &str = "mem://download/";

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    pub public: HashMap<String, String>,
    pub sources: HashMap<String, (Vec<u8>, String)>,
    pub fetches: Vec<(String, Option<ByteRange>)>,
    pub api_calls: usize,
    pub sends: usize,
    /// Leave the size out of download targets
    pub hide_size: bool,
    /// Answer range requests with the whole body (200)
    pub ignore_ranges: bool,
    /// Break fetched streams after this many bytes
    pub fail_fetch_after: Option<usize>,
    /// Break uploads after this many bytes
    pub fail_send_after: Option<usize>,
    /// Network piece size for fetched bodies
    pub piece_size: usize,
}

/// Fake disk service implementing both capabilities
#[derive(Debug)]
pub(crate) struct MemoryDisk {
    state: Mutex<MemoryState>,
}

impl MemoryDisk {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                piece_size: 1000,
                ..Default::default()
            }),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn put_file(&self, path: &str, data: Vec<u8>) {
        self.with(|s| s.files.insert(path.to_string(), data));
    }

    pub fn mkdir(&self, path: &str) {
        self.with(|s| s.dirs.insert(path.to_string()));
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.with(|s| s.files.get(path).cloned())
    }

    pub fn publish_key(&self, key: &str, path: &str) {
        self.with(|s| s.public.insert(key.to_string(), path.to_string()));
    }

    pub fn serve_source(&self, url: &str, data: Vec<u8>, content_type: &str) {
        self.with(|s| {
            s.sources
                .insert(url.to_string(), (data, content_type.to_string()))
        });
    }

    pub fn fetches(&self) -> Vec<(String, Option<ByteRange>)> {
        self.with(|s| s.fetches.clone())
    }

    pub fn api_calls(&self) -> usize {
        self.with(|s| s.api_calls)
    }

    fn check_token(&self, token: &str) -> Result<()> {
        self.with(|s| s.api_calls += 1);
        if token == TOKEN {
            Ok(())
        } else {
            Err(Error::Auth {
                status: Some(401),
                message: "Unauthorized".into(),
            })
        }
    }

    fn parent_exists(state: &MemoryState, path: &DiskPath) -> bool {
        match path.parent() {
            Some(parent) if !parent.is_root() => state.dirs.contains(parent.as_str()),
            _ => true,
        }
    }
}

fn pieces(data: Vec<u8>, piece_size: usize, fail_after: Option<usize>) -> ByteStream {
    let mut items: Vec<std::io::Result<Vec<u8>>> = Vec::new();
    let limit = fail_after.unwrap_or(data.len()).min(data.len());
    for piece in data[..limit].chunks(piece_size.max(1)) {
        items.push(Ok(piece.to_vec()));
    }
    if fail_after.is_some_and(|n| n < data.len()) {
        items.push(Err(std::io::Error::other("connection reset by peer")));
    }
    futures::stream::iter(items).boxed()
}

#[async_trait]
impl DiskApi for MemoryDisk {
    async fn resource(&self, token: &str, path: &DiskPath) -> Result<RemoteEntry> {
        self.check_token(token)?;
        self.with(|s| {
            if let Some(data) = s.files.get(path.as_str()) {
                Ok(RemoteEntry::file(path.as_str(), data.len() as u64))
            } else if s.dirs.contains(path.as_str()) || path.is_root() {
                Ok(RemoteEntry::dir(path.as_str()))
            } else {
                Err(Error::not_found(path.to_string()))
            }
        })
    }

    async fn upload_target(
        &self,
        token: &str,
        path: &DiskPath,
        overwrite: bool,
    ) -> Result<TransferTarget> {
        self.check_token(token)?;
        self.with(|s| {
            if !Self::parent_exists(s, path) {
                return Err(Error::not_found(format!("parent of {path}")));
            }
            if s.files.contains_key(path.as_str()) && !overwrite {
                return Err(Error::Conflict {
                    status: Some(409),
                    message: format!("{path} already exists"),
                });
            }
            Ok(TransferTarget {
                href: format!("{UPLOAD_HREF}{}", path.as_str()),
                size: None,
            })
        })
    }

    async fn download_target(&self, source: &DownloadSource) -> Result<TransferTarget> {
        let (path, public) = match source {
            DownloadSource::Private { token, path } => {
                self.check_token(token)?;
                (path.to_string(), false)
            }
            DownloadSource::Public { key, path } => {
                self.with(|s| s.api_calls += 1);
                let root = self
                    .with(|s| s.public.get(key).cloned())
                    .ok_or_else(|| Error::not_found(key.clone()))?;
                let path = match path {
                    Some(inner) => format!("{}/{}", root, inner.trim_start_matches('/')),
                    None => root,
                };
                (path, true)
            }
        };
        self.with(|s| {
            let data = s
                .files
                .get(&path)
                .ok_or_else(|| Error::not_found(path.clone()))?;
            let size = (!public && !s.hide_size).then_some(data.len() as u64);
            Ok(TransferTarget {
                href: format!("{DOWNLOAD_HREF}{path}"),
                size,
            })
        })
    }

    async fn move_resource(
        &self,
        token: &str,
        from: &DiskPath,
        to: &DiskPath,
        overwrite: bool,
    ) -> Result<()> {
        self.check_token(token)?;
        self.with(|s| {
            if s.files.contains_key(to.as_str()) && !overwrite {
                return Err(Error::Conflict {
                    status: Some(409),
                    message: format!("{to} already exists"),
                });
            }
            let data = s
                .files
                .remove(from.as_str())
                .ok_or_else(|| Error::not_found(from.to_string()))?;
            s.files.insert(to.to_string(), data);
            Ok(())
        })
    }

    async fn delete(&self, token: &str, path: &DiskPath, _permanently: bool) -> Result<()> {
        self.check_token(token)?;
        self.with(|s| {
            if s.files.remove(path.as_str()).is_some() || s.dirs.remove(path.as_str()) {
                Ok(())
            } else {
                Err(Error::not_found(path.to_string()))
            }
        })
    }

    async fn list(
        &self,
        token: &str,
        path: &DiskPath,
        limit: u32,
        offset: u64,
    ) -> Result<ListPage> {
        self.check_token(token)?;
        self.with(|s| {
            let dir = if path.is_root() {
                DISK_PREFIX.to_string()
            } else {
                path.as_str().trim_end_matches('/').to_string()
            };
            if !path.is_root() && !s.dirs.contains(&dir) {
                return Err(Error::not_found(path.to_string()));
            }
            let is_child = |candidate: &str| {
                DiskPath::parse(candidate)
                    .ok()
                    .and_then(|p| p.parent())
                    .is_some_and(|parent| parent.as_str() == dir)
            };

            let mut entries: Vec<RemoteEntry> = s
                .dirs
                .iter()
                .filter(|d| is_child(d))
                .map(|d| RemoteEntry::dir(d.as_str()))
                .chain(
                    s.files
                        .iter()
                        .filter(|(f, _)| is_child(f))
                        .map(|(f, data)| RemoteEntry::file(f.as_str(), data.len() as u64)),
                )
                .collect();
            entries.sort_by(|a, b| a.path.cmp(&b.path));

            let total = entries.len() as u64;
            let items = entries
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
            Ok(ListPage {
                path: path.to_string(),
                items,
                limit,
                offset,
                total: Some(total),
            })
        })
    }

    async fn publish(&self, token: &str, path: &DiskPath) -> Result<String> {
        self.check_token(token)?;
        self.with(|s| {
            if s.files.contains_key(path.as_str()) {
                Ok(format!(
                    "https://disk.example/d/{}",
                    path.file_name().unwrap_or_default()
                ))
            } else {
                Err(Error::not_found(path.to_string()))
            }
        })
    }
}

#[async_trait]
impl ByteTransport for MemoryDisk {
    async fn fetch(&self, url: &str, range: Option<ByteRange>) -> Result<IncomingBody> {
        self.with(|s| {
            s.fetches.push((url.to_string(), range));

            if let Some((data, content_type)) = s.sources.get(url) {
                return Ok(IncomingBody {
                    content_length: Some(data.len() as u64),
                    stream: pieces(data.clone(), s.piece_size, s.fail_fetch_after),
                    content_type: Some(content_type.clone()),
                    partial: false,
                });
            }

            let path = url.strip_prefix(DOWNLOAD_HREF).ok_or(Error::Remote {
                status: 404,
                message: format!("unknown url {url}"),
            })?;
            let data = s.files.get(path).cloned().ok_or(Error::Remote {
                status: 404,
                message: format!("unknown url {url}"),
            })?;

            let (body, partial) = match range {
                Some(range) if !s.ignore_ranges => {
                    let start = (range.start as usize).min(data.len());
                    let end = range.end.map_or(data.len(), |e| (e as usize).min(data.len()));
                    (data[start..end].to_vec(), true)
                }
                _ => (data, false),
            };

            Ok(IncomingBody {
                content_length: (!s.hide_size).then_some(body.len() as u64),
                stream: pieces(body, s.piece_size, s.fail_fetch_after),
                content_type: Some("application/octet-stream".into()),
                partial,
            })
        })
    }

    async fn send(&self, url: &str, mut body: ByteStream, _length: Option<u64>) -> Result<()> {
        let path = url
            .strip_prefix(UPLOAD_HREF)
            .ok_or_else(|| Error::Network(format!("unknown url {url}")))?
            .to_string();
        let fail_after = self.with(|s| {
            s.sends += 1;
            s.fail_send_after
        });

        let mut received = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            received.extend_from_slice(&chunk);
            if fail_after.is_some_and(|n| received.len() >= n) {
                return Err(Error::Network("connection reset by peer".into()));
            }
        }
        self.with(|s| s.files.insert(path, received));
        Ok(())
    }
}
