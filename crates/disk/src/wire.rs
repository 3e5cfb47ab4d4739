//! JSON bodies exchanged with the REST API

use jiff::Timestamp;
use reqwest::StatusCode;
use serde::Deserialize;

use ydg_core::{EntryKind, Error, RemoteEntry};

/// Link returned by the target-negotiation and async-operation endpoints
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Link {
    pub href: String,
}

/// A file or directory as the API describes it
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Resource {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified: Option<Timestamp>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<ResourceList>,
}

/// Directory contents embedded in a resource
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub items: Vec<Resource>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Error body: `{"message": ..., "description": ..., "error": "DiskNotFoundError"}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<Resource> for RemoteEntry {
    fn from(resource: Resource) -> Self {
        let size = match resource.kind {
            EntryKind::File => resource.size,
            EntryKind::Directory => None,
        };
        RemoteEntry {
            path: resource.path,
            name: resource.name,
            kind: resource.kind,
            size,
            modified: resource.modified,
            mime_type: resource.mime_type,
        }
    }
}

/// Map a non-2xx response to an error kind
///
/// The service's error code wins over the status where they disagree: a
/// missing parent directory comes back as 409 but is a not-found condition.
pub(crate) fn api_error(status: StatusCode, body: &str) -> Error {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.error.unwrap_or_default();
    let message = parsed
        .description
        .or(parsed.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    let code_status = status.as_u16();
    let status = Some(code_status);

    match (code_status, code.as_str()) {
        (401 | 403, _) | (_, "UnauthorizedError") => Error::Auth { status, message },
        (_, "DiskPathDoesntExistsError" | "DiskNotFoundError") | (404, _) => {
            Error::NotFound { status, message }
        }
        (_, "DiskResourceAlreadyExistsError") | (409 | 412, _) => {
            Error::Conflict { status, message }
        }
        (status, _) => Error::Remote { status, message },
    }
}

pub(crate) fn network_error(err: reqwest::Error) -> Error {
    Error::Network(err.without_url().to_string())
}
