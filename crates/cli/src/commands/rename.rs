//! rename command - Rename or move a resource on the disk

use clap::Args;
use ydg_core::{Action, ActionRequest};

/// Rename or move a resource
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Resource to rename
    pub source: String,

    /// New name in the same folder, or a full destination path
    pub target: String,

    /// Replace an existing resource at the destination
    #[arg(long)]
    pub overwrite: bool,
}

impl RenameArgs {
    pub fn into_request(self) -> ActionRequest {
        let mut request = ActionRequest::new(Action::Rename);
        request.disk_path = Some(self.source);
        if is_full_path(&self.target) {
            request.destination_path = Some(self.target);
        } else {
            request.new_name = Some(self.target);
        }
        request.overwrite = self.overwrite;
        request
    }
}

/// A bare name cannot contain '/', so anything with one is a path
fn is_full_path(target: &str) -> bool {
    target.starts_with("disk:") || target.contains('/')
}
