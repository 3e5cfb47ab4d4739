//! Action requests as they arrive from a caller

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Operations the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Upload,
    Download,
    Rename,
    Delete,
    List,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Upload,
        Action::Download,
        Action::Rename,
        Action::Delete,
        Action::List,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::Download => "download",
            Action::Rename => "rename",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::InvalidArguments(format!(
                    "unknown action '{s}'; expected one of upload, download, rename, delete, list"
                ))
            })
    }
}

/// One request to the dispatcher
///
/// Fields irrelevant to the action are ignored. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRequest {
    pub action: Action,

    /// Falls back to the configured token when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,

    /// Upload source on the web instead of a local file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// Published resource key or URL, for public downloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Path inside a published folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    /// Rename target as a full path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_path: Option<String>,

    /// Rename target as a bare name next to the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,

    #[serde(default)]
    pub resume: bool,

    #[serde(default)]
    pub overwrite: bool,

    #[serde(default)]
    pub show_progress: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    /// Delete without moving to the trash; defaults to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanently: Option<bool>,

    /// Publish the uploaded file and report its public URL
    #[serde(default)]
    pub publish: bool,
}

impl ActionRequest {
    /// Empty request for `action`, to be filled in by the caller
    pub fn new(action: Action) -> Self {
        Self {
            action,
            oauth_token: None,
            disk_path: None,
            local_path: None,
            file_url: None,
            public_key: None,
            public_path: None,
            destination_path: None,
            new_name: None,
            resume: false,
            overwrite: false,
            show_progress: false,
            chunk_size: None,
            limit: None,
            offset: None,
            permanently: None,
            publish: false,
        }
    }

    /// Parse a request from its JSON form
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidArguments(format!("malformed request: {e}")))
    }
}

/// Non-blank value of an optional text field
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
