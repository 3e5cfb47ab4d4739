//! Uniform operation results

use serde::Serialize;

use crate::error::{Error, ErrorKind};
use crate::path::DiskPath;
use crate::traits::ListPage;
use crate::transfer::TransferReport;

use super::request::Action;

/// Action-specific payload of a successful operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultData {
    Transfer(TransferReport),
    Listing(ListPage),
    Moved { from: DiskPath, to: DiskPath },
    Deleted { path: DiskPath, permanently: bool },
}

/// Failure details of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_transferred: Option<u64>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            status: err.status(),
            bytes_transferred: err.bytes_transferred(),
        }
    }
}

/// Result of one dispatched action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub ok: bool,
    pub action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(skip)]
    exit_code: i32,
}

impl OperationResult {
    pub fn success(action: Action, data: ResultData, warnings: Vec<String>) -> Self {
        Self {
            ok: true,
            action,
            data: Some(data),
            error: None,
            warnings,
            exit_code: 0,
        }
    }

    pub fn failure(action: Action, err: &Error, warnings: Vec<String>) -> Self {
        Self {
            ok: false,
            action,
            data: None,
            error: Some(ErrorReport::from(err)),
            warnings,
            exit_code: err.exit_code(),
        }
    }

    /// Process exit code matching this result
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn transfer(&self) -> Option<&TransferReport> {
        match &self.data {
            Some(ResultData::Transfer(report)) => Some(report),
            _ => None,
        }
    }

    pub fn listing(&self) -> Option<&ListPage> {
        match &self.data {
            Some(ResultData::Listing(page)) => Some(page),
            _ => None,
        }
    }
}
