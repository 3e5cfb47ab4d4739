//! upload command - Send a local file or a web resource to the disk

use clap::Args;
use ydg_core::{Action, ActionRequest};

use super::is_web_url;

/// Upload a file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file, or an http(s) URL the disk should receive
    pub source: String,

    /// Destination on the disk (a trailing / keeps the local file name)
    pub destination: String,

    /// Replace an existing file at the destination
    #[arg(long)]
    pub overwrite: bool,

    /// Bytes per chunk (1 KiB to 10 MiB; adaptive by default)
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,

    /// Publish the file after upload and print its public URL
    #[arg(long)]
    pub publish: bool,
}

impl UploadArgs {
    pub fn into_request(self) -> ActionRequest {
        let mut request = ActionRequest::new(Action::Upload);
        if is_web_url(&self.source) {
            request.file_url = Some(self.source);
        } else {
            request.local_path = Some(self.source);
        }
        request.disk_path = Some(self.destination);
        request.overwrite = self.overwrite;
        request.chunk_size = self.chunk_size;
        request.publish = self.publish;
        request
    }
}
