//! download command - Fetch a disk file or a published resource
//!
//! A source that is an http(s) link, or any source given with `--public`, is
//! treated as a public key and fetched without a token.

use clap::Args;
use ydg_core::{Action, ActionRequest};

use super::is_web_url;

/// Download a file
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Disk path, or a public link / key
    pub source: String,

    /// Local file or existing directory
    pub destination: String,

    /// Treat the source as a public key even if it is not a link
    #[arg(long)]
    pub public: bool,

    /// File inside a published folder
    #[arg(long, value_name = "PATH")]
    pub public_path: Option<String>,

    /// Continue from the bytes already in the local file
    #[arg(short, long)]
    pub resume: bool,

    /// Replace the local file (wins over --resume)
    #[arg(long)]
    pub overwrite: bool,

    /// Bytes per chunk (1 KiB to 10 MiB; adaptive by default)
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,
}

impl DownloadArgs {
    pub fn into_request(self) -> ActionRequest {
        let mut request = ActionRequest::new(Action::Download);
        if self.public || is_web_url(&self.source) {
            request.public_key = Some(self.source);
            request.public_path = self.public_path;
        } else {
            request.disk_path = Some(self.source);
        }
        request.local_path = Some(self.destination);
        request.resume = self.resume;
        request.overwrite = self.overwrite;
        request.chunk_size = self.chunk_size;
        request
    }
}
