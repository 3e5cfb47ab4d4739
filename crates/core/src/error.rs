//! Error types for ydg-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes
//! and to the error kind reported in an operation result.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for ydg-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ydg-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or contradictory parameters, detected before any network call
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Invalid or expired token
    #[error("Authentication failed: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Remote path (or local source) absent
    #[error("Not found: {message}")]
    NotFound {
        status: Option<u16>,
        message: String,
    },

    /// Destination exists and policy forbids replacing it
    #[error("Conflict: {message}")]
    Conflict {
        status: Option<u16>,
        message: String,
    },

    /// I/O or transport failure in the middle of a byte transfer
    #[error("Transfer failed after {bytes_transferred} bytes: {message}")]
    Transfer {
        message: String,
        bytes_transferred: u64,
    },

    /// Non-2xx response without a more specific mapping
    #[error("HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// Network error on a metadata call
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Error category surfaced in operation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArguments,
    Auth,
    NotFound,
    Conflict,
    Transfer,
    Remote,
    Local,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            status: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            status: None,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict {
            status: None,
            message: message.into(),
        }
    }

    pub fn transfer(message: impl Into<String>, bytes_transferred: u64) -> Self {
        Error::Transfer {
            message: message.into(),
            bytes_transferred,
        }
    }

    /// Classify the error for structured reporting
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Transfer { .. } => ErrorKind::Transfer,
            Error::Remote { .. } | Error::Network(_) | Error::Json(_) => ErrorKind::Remote,
            Error::Config(_)
            | Error::Io(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::InvalidUrl(_) => ErrorKind::Local,
        }
    }

    /// HTTP status that produced this error, if any
    pub const fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. }
            | Error::NotFound { status, .. }
            | Error::Conflict { status, .. } => *status,
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Bytes moved before the failure; only transfers report partial progress
    pub const fn bytes_transferred(&self) -> Option<u64> {
        match self {
            Error::Transfer {
                bytes_transferred, ..
            } => Some(*bytes_transferred),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArguments(_) => 2,                   // UsageError
            Error::Config(_) => 2,                             // UsageError
            Error::Network(_) | Error::Transfer { .. } => 3,   // NetworkError
            Error::Remote { status, .. } if *status >= 500 => 3,
            Error::Auth { .. } => 4,                           // AuthError
            Error::NotFound { .. } => 5,                       // NotFound
            Error::Conflict { .. } => 6,                       // Conflict
            _ => 1,                                            // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidArguments("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::transfer("reset", 10).exit_code(), 3);
        assert_eq!(Error::auth("test").exit_code(), 4);
        assert_eq!(Error::not_found("test").exit_code(), 5);
        assert_eq!(Error::conflict("test").exit_code(), 6);
        assert_eq!(
            Error::Remote {
                status: 503,
                message: "busy".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            Error::Remote {
                status: 400,
                message: "bad".into()
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_error_kind_and_status() {
        let err = Error::Conflict {
            status: Some(409),
            message: "exists".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.bytes_transferred(), None);

        let err = Error::transfer("connection reset", 4096);
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert_eq!(err.bytes_transferred(), Some(4096));

        let err = Error::Io(std::io::Error::other("disk full"));
        assert_eq!(err.kind(), ErrorKind::Local);
    }

    #[test]
    fn test_error_display() {
        let err = Error::not_found("disk:/missing.txt");
        assert_eq!(err.to_string(), "Not found: disk:/missing.txt");

        let err = Error::Remote {
            status: 507,
            message: "Insufficient storage".into(),
        };
        assert_eq!(err.to_string(), "HTTP 507: Insufficient storage");

        let err = Error::transfer("connection reset", 8192);
        assert_eq!(
            err.to_string(),
            "Transfer failed after 8192 bytes: connection reset"
        );
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidArguments).unwrap();
        assert_eq!(json, "\"invalid_arguments\"");
    }
}
