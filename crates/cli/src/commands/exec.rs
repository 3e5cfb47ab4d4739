//! exec command - Run an action described by a JSON parameter object
//!
//! The object is the same one scripts send to the dispatcher directly, e.g.
//! `{"action": "list", "disk_path": "disk:/Docs", "limit": 20}`. The result
//! is always printed as JSON.

use std::io::Read;

use clap::Args;
use ydg_core::{ActionRequest, Result};

/// Run an action from JSON
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Parameter object, or - to read it from stdin
    pub request: String,
}

/// Parse the request argument, reading stdin for `-`
pub fn read_request(args: &ExecArgs) -> Result<ActionRequest> {
    if args.request.trim() == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return ActionRequest::from_json(&input);
    }
    ActionRequest::from_json(&args.request)
}
