//! Byte-level requests against transfer URLs

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use tracing::debug;

use ydg_core::config::TransportConfig;
use ydg_core::{ByteRange, ByteStream, ByteTransport, Error, IncomingBody, Result};

use crate::client::http_client;
use crate::wire::{api_error, network_error};

/// Streams bodies to and from transfer URLs
///
/// Transfer URLs are pre-signed; no credentials are attached.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        Ok(Self::with_http(http_client(config)?))
    }

    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ByteTransport for HttpTransport {
    async fn fetch(&self, url: &str, range: Option<ByteRange>) -> Result<IncomingBody> {
        let mut request = self.http.get(url);
        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let partial = range.is_some() && status == StatusCode::PARTIAL_CONTENT;
        let content_length = response.content_length();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(
            status = status.as_u16(),
            partial,
            length = ?content_length,
            "transfer body opened"
        );

        let stream = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| std::io::Error::other(e.without_url()))
            })
            .boxed();

        Ok(IncomingBody {
            stream,
            content_length,
            content_type,
            partial,
        })
    }

    async fn send(&self, url: &str, body: ByteStream, length: Option<u64>) -> Result<()> {
        let mut request = self.http.put(url).body(reqwest::Body::wrap_stream(body));
        if let Some(length) = length {
            request = request.header(CONTENT_LENGTH, length);
        }

        let response = request.send().await.map_err(network_error)?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "upload body accepted");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }
}
