//! Input checks applied before any remote work

use crate::error::{Error, Result};

/// Minimum accepted OAuth token length
pub const MIN_TOKEN_LEN: usize = 10;

/// Maximum accepted source URL length
pub const MAX_URL_LEN: usize = 2048;

/// Lower bound for an explicit chunk size: 1 KiB
pub const MIN_CHUNK_SIZE: u64 = 1024;

/// Upper bound for an explicit chunk size: 10 MiB
pub const MAX_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

const TOKEN_FORBIDDEN: [char; 8] = ['<', '>', '"', '\'', '&', '\0', '\n', '\r'];
const URL_FORBIDDEN: [char; 7] = ['<', '>', '"', '\'', '\0', '\n', '\r'];

/// Validate an OAuth token and return it trimmed
pub fn validate_token(token: &str) -> Result<&str> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::InvalidArguments("oauth token is required".into()));
    }
    if token.len() < MIN_TOKEN_LEN {
        return Err(Error::InvalidArguments("oauth token is too short".into()));
    }
    if token.chars().any(|c| TOKEN_FORBIDDEN.contains(&c)) {
        return Err(Error::InvalidArguments(
            "oauth token contains forbidden characters".into(),
        ));
    }
    Ok(token)
}

/// Validate a source URL for upload-from-URL
pub fn validate_source_url(url: &str) -> Result<url::Url> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::InvalidArguments(
            "file url must start with http:// or https://".into(),
        ));
    }
    if url.len() > MAX_URL_LEN {
        return Err(Error::InvalidArguments(format!(
            "file url is longer than {MAX_URL_LEN} characters"
        )));
    }
    if url.chars().any(|c| URL_FORBIDDEN.contains(&c)) {
        return Err(Error::InvalidArguments(
            "file url contains forbidden characters".into(),
        ));
    }
    Ok(url::Url::parse(url)?)
}

/// Validate an explicitly requested chunk size
pub fn validate_chunk_size(size: u64) -> Result<usize> {
    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&size) {
        return Err(Error::InvalidArguments(format!(
            "chunk size must be between {MIN_CHUNK_SIZE} and {MAX_CHUNK_SIZE} bytes, got {size}"
        )));
    }
    usize::try_from(size)
        .map_err(|_| Error::InvalidArguments(format!("chunk size {size} does not fit in memory")))
}
