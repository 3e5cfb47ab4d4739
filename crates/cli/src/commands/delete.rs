//! delete command - Remove a resource from the disk

use clap::Args;
use ydg_core::{Action, ActionRequest};

/// Delete a resource
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Resource to delete
    pub path: String,

    /// Move to the trash instead of deleting permanently
    #[arg(long)]
    pub trash: bool,
}

impl DeleteArgs {
    pub fn into_request(self) -> ActionRequest {
        let mut request = ActionRequest::new(Action::Delete);
        request.disk_path = Some(self.path);
        request.permanently = self.trash.then_some(false);
        request
    }
}
